//! Identifier newtype generators.
//!
//! Invoking crates must depend on `serde` with the `derive` feature.

/// Declare a row-index identifier for one entity table.
///
/// The generated type wraps a `u64`, is `Copy`, orders numerically and is transparent on the
/// wire (`{"fk_course_id": 12}`).
#[macro_export]
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl ::std::convert::From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Declare a free-text identifier issued by an external system (for example an OIS course ID).
///
/// The generated type wraps [`NonEmptyText`](crate::NonEmptyText), so blank identifiers are
/// rejected at construction and on deserialisation.
#[macro_export]
macro_rules! text_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($crate::NonEmptyText);

        impl $name {
            pub fn new(value: impl AsRef<str>) -> Result<Self, $crate::TextError> {
                $crate::NonEmptyText::new(value).map(Self)
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::row_id!(
        /// Test row id.
        SampleId
    );
    crate::text_id!(SampleCode);

    #[test]
    fn row_id_is_transparent() {
        let id = SampleId::new(42);
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
        let back: SampleId = serde_json::from_str("42").expect("deserialize");
        assert_eq!(back, id);
        assert_eq!(back.get(), 42);
    }

    #[test]
    fn row_id_rejects_negative_values() {
        assert!(serde_json::from_str::<SampleId>("-1").is_err());
    }

    #[test]
    fn text_id_rejects_blank() {
        assert!(SampleCode::new(" ").is_err());
        assert!(serde_json::from_str::<SampleCode>("\"  \"").is_err());
        let code = SampleCode::new("C1").expect("valid");
        assert_eq!(code.to_string(), "C1");
    }
}
