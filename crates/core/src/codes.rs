//! Closed value sets.
//!
//! Wire values are reproduced exactly as the registry receives them, including spelling quirks
//! such as `TIdligere bruker`. Each list exposes `VALUES` (code, label) for the documentation.

use serde::{Deserialize, Serialize};

macro_rules! code_list {
    (@label $code:literal) => { $code };
    (@label $code:literal $label:literal) => { $label };
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $code:literal $(: $label:literal)?),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const VALUES: &'static [(&'static str, &'static str)] =
                &[$(($code, code_list!(@label $code $($label)?))),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

macro_rules! int_code_list {
    (
        $(#[$meta:meta])*
        $name:ident ($what:literal) {
            $($variant:ident = $code:literal : $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const VALUES: &'static [(&'static str, &'static str)] =
                &[$((stringify!($code), $label)),+];

            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl ::std::convert::TryFrom<u8> for $name {
            type Error = String;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} code {}, expected one of {}",
                        $what,
                        other,
                        [$(stringify!($code)),+].join(", ")
                    )),
                }
            }
        }

        impl ::std::convert::From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}: {}", self.code(), self.label())
            }
        }
    };
}

code_list!(
    /// The registries that share this data model. Not every KREST registry is formalised yet.
    RegistryName {
        Norpreg => "NORPREG": "Norsk proton- og stråleterapiregister",
        KrestUnn => "KREST-UNN": "Kvalitetsregister for stråleterapi Universitetssykehuset Nord-Norge",
        KrestNlsh => "KREST-NLSH": "Kvalitetsregister for stråleterapi Nordlandssykehuset",
        KrestSoh => "KREST-SOH": "Kvalitetsregister for stråleterapi St. Olavs hospital",
        KrestAal => "KREST-AAL": "Kvalitetsregister for stråleterapi Ålesund sjukehus",
        KrestHus => "KREST-HUS": "Kvalitetsregister for stråleterapi Haukeland universitetssykehus",
        KrestSus => "KREST-SUS": "Kvalitetsregister for stråleterapi Stavanger universitetssykehus",
        KrestSshf => "KREST-SSHF": "Kvalitetsregister for stråleterapi Sørlandet sykehus",
        KrestSig => "KREST-SIG": "Kvalitetsregister for stråleterapi Sykehuset innlandet",
        KrestOus => "KREST-OUS": "Kvalitetsregister for stråleterapi Oslo universitetssykehus (formalisert 2025-01)",
    }
);

code_list!(
    /// Kind of national identifier.
    IdType {
        Fnr => "FNR": "Fødselsnummer",
        Dnr => "DNR": "D-nummer",
        Fhnr => "FHNR": "Felles hjelpenummer",
        Hnr => "HNR": "Hjelpenummer",
    }
);

code_list!(
    ExportMechanism {
        Dicom => "DICOM",
        Filsluse => "Filsluse",
        Usb => "USB",
        Annet => "Annet",
    }
);

code_list!(
    Sex {
        Mann => "mann": "Mann",
        Kvinne => "kvinne": "Kvinne",
    }
);

code_list!(
    LivingArrangement {
        Single => "Ikke i parforhold",
        Cohabiting => "Samboer/lever i parforhold",
        LivingApart => "Parforhold, lever ikke sammen / særbo",
        Unknown => "Ukjent",
    }
);

code_list!(
    SmokingStatus {
        Never => "Aldri røykt",
        Current => "Røyker",
        Former => "Tidligere røyker",
    }
);

code_list!(
    TobaccoStatus {
        Never => "Aldri brukt",
        Current => "Nåværende bruker",
        Former => "Tidligere bruker",
    }
);

code_list!(
    /// Alcohol use. `TIdligere bruker` is the value sources send.
    AlcoholUse {
        Current => "Nåværende bruker",
        Former => "TIdligere bruker",
        Never => "Aldri brukt",
    }
);

code_list!(
    /// TNM classification prefix: clinical, pathological, unknown, post-therapy.
    TnmType {
        C => "C",
        P => "P",
        U => "U",
        YC => "yC",
        YP => "yP",
    }
);

code_list!(
    SurgeryTarget {
        PrimaryTumour => "Primærtumor",
        LocalRelapseAndPrimary => "Lokalt residiv og primærtumor",
        Metastasis => "Metastase",
    }
);

code_list!(
    SystemicCategory {
        Chemotherapy => "Kjemoterapi",
        Immunotherapy => "Immunterapi",
        Hormonal => "Hormonell behandling",
        Targeted => "Målrettet terapi / small molecules",
    }
);

code_list!(
    TherapeuticIntent {
        Preoperative => "Preoperativt",
        Postoperative => "Postoperativt",
    }
);

code_list!(
    TreatmentIntention {
        Curative => "Kurativt",
        LifeProlonging => "Ikke kurativt (livsforlengende)",
        Palliative => "Ikke kurativt (symptomlindrende)",
        LocalControl => "Ikke kurativt (lokalkontroll)",
    }
);

code_list!(
    TreatmentType {
        Neoadjuvant => "Neoadjuvant",
        Concomitant => "Konkomitant",
        Adjuvant => "Adjuvant",
        NeoadjuvantConcomitant => "Neoadjuvant + konkomitant",
        NeoadjuvantAdjuvant => "Neoadjuvant + adjuvant",
        ConcomitantAdjuvant => "Konkomitant + adjuvant",
        NeoadjuvantConcomitantAdjuvant => "Neoadjuvant + konkomitant + adjuvant",
    }
);

code_list!(
    SampleType {
        Cytology => "Celler (cytologi)",
        Tissue => "Vev",
        Other => "Annet materiale",
    }
);

code_list!(
    BiomarkerResult {
        Positive => "Positiv",
        Negative => "Negativ",
        NotExamined => "Ikke undersøkt",
    }
);

code_list!(
    ProgressionType {
        Progression => "Progresjon",
        Relapse => "Residiv",
    }
);

code_list!(
    ProgressionIdentification {
        Histology => "Histologi",
        Radiology => "Radiologi",
        Clinical => "Klinikk",
        Biochemical => "Biokjemisk",
        Unknown => "Ukjent",
    }
);

code_list!(
    ProgressionGrade {
        Local => "Lokal progresjon",
        Regional => "Regional progresjon",
        Distant => "Fjernmetastase",
    }
);

int_code_list!(
    /// Highest completed education level (`no.utdanningsnivaa`).
    EducationLevel("education level") {
        NoEducation = 0: "Ingen utdanning",
        Primary = 1: "Grunnskole",
        Secondary = 2: "Videregående",
        HigherShort = 3: "Universitet / høyskole < 4 år",
        HigherLong = 4: "Universitet / høyskole >= 4 år",
        Unknown = 9: "Ukjent",
    }
);

int_code_list!(
    /// Marital status (`no.samlivsstatus`).
    MaritalStatus("marital status") {
        Unmarried = 1: "Ugift",
        Married = 2: "Gift / Registrert partner",
        Widowed = 3: "Enke / enkemann / gjenlevende partner",
        Divorced = 4: "Skilt / Separert",
        Unknown = 9: "Ukjent",
    }
);

int_code_list!(
    /// Work status (`no.arbeidsstatus`).
    WorkStatus("work status") {
        Working = 1: "I arbeid",
        NotWorking = 2: "Ikke i arbeid",
        Retired = 3: "Alderspensjonist",
        Student = 4: "Under utdanning / studerer",
        Unknown = 9: "Ukjent",
    }
);

int_code_list!(
    /// ECOG performance status.
    EcogGrade("ECOG grade") {
        Grade0 = 0: "Asymptomatisk i stand til å utføre enhver normal aktivitet uten begrensning",
        Grade1 = 1: "Symptomatisk, fullt oppegående Ikke i stand til fysisk krevende aktivitet, men oppegående og i stand til å utføre lett arbeid",
        Grade2 = 2: "Symptomatisk, sengeliggende <50 % av våken tid Oppegående og i stand til all egenpleie, men ikke i stand til noe arbeid; oppe og i bevegelse mer enn 50% av våken tid",
        Grade3 = 3: "Symptomatisk, sengeliggende > 50 % av våken tid Bare i stand til begrenset egenpleie, bundet til seng eller stol > 50 % av våken tid",
        Grade4 = 4: "Helt sengeliggende Helt hjelpetrengende; klarer ikke noen egenpleie; helt bundet til seng eller stol",
        Grade5 = 5: "Pasienten er død",
    }
);

int_code_list!(
    /// CTCAE adverse event grade.
    CtcaeGrade("CTCAE grade") {
        Grade0 = 0: "Ingen",
        Grade1 = 1: "Mild",
        Grade2 = 2: "Moderat",
        Grade3 = 3: "Alvorlig",
        Grade4 = 4: "Livstruende",
        Grade5 = 5: "Død",
    }
);
