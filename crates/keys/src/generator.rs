//! Random key allocation.

use crate::{ExportPseudoKey, KeyError, KeyResult, PatientKey};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::collections::HashSet;

/// Draws new pseudonymised keys from a random source.
///
/// The default generator uses the thread-local CSPRNG. Tests can inject a seeded RNG with
/// [`KeyGenerator::with_rng`].
#[derive(Debug)]
pub struct KeyGenerator<R = ThreadRng> {
    rng: R,
    max_attempts: usize,
}

const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

impl Default for KeyGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl<R: Rng> KeyGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Limit how many draws the `*_avoiding` methods make before giving up.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Draws a fresh patient key. Collisions are possible; see [`Self::patient_key_avoiding`].
    pub fn patient_key(&mut self) -> PatientKey {
        PatientKey::from_value(self.rng.gen_range(0..PatientKey::SPACE))
    }

    /// Draws a fresh per-release pseudonym.
    pub fn export_pseudo_key(&mut self) -> ExportPseudoKey {
        ExportPseudoKey::from_value(self.rng.gen_range(0..ExportPseudoKey::SPACE))
    }

    /// Draws a patient key that is not in `issued`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Exhausted`] if every draw within the attempt budget collided.
    pub fn patient_key_avoiding(&mut self, issued: &HashSet<PatientKey>) -> KeyResult<PatientKey> {
        for _ in 0..self.max_attempts {
            let key = self.patient_key();
            if !issued.contains(&key) {
                return Ok(key);
            }
        }
        Err(KeyError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// Draws an export pseudonym that is not in `issued`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Exhausted`] if every draw within the attempt budget collided.
    pub fn export_pseudo_key_avoiding(
        &mut self,
        issued: &HashSet<ExportPseudoKey>,
    ) -> KeyResult<ExportPseudoKey> {
        for _ in 0..self.max_attempts {
            let key = self.export_pseudo_key();
            if !issued.contains(&key) {
                return Ok(key);
            }
        }
        Err(KeyError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_keys_are_canonical() {
        let mut generator = KeyGenerator::new();
        for _ in 0..100 {
            let key = generator.patient_key();
            assert!(PatientKey::is_canonical(key.as_str()), "{key}");
            let pseudo = generator.export_pseudo_key();
            assert!(ExportPseudoKey::is_canonical(pseudo.as_str()), "{pseudo}");
        }
    }

    #[test]
    fn seeded_generator_is_deterministic() {
        let mut a = KeyGenerator::with_rng(StdRng::seed_from_u64(7));
        let mut b = KeyGenerator::with_rng(StdRng::seed_from_u64(7));
        assert_eq!(a.patient_key(), b.patient_key());
        assert_eq!(a.export_pseudo_key(), b.export_pseudo_key());
    }

    #[test]
    fn avoiding_skips_issued_keys() {
        let mut reference = KeyGenerator::with_rng(StdRng::seed_from_u64(11));
        let first = reference.patient_key();

        let mut generator = KeyGenerator::with_rng(StdRng::seed_from_u64(11));
        let issued: HashSet<PatientKey> = [first.clone()].into_iter().collect();
        let key = generator.patient_key_avoiding(&issued).expect("free key");
        assert_ne!(key, first);
    }

    #[test]
    fn avoiding_reports_exhaustion() {
        let mut reference = KeyGenerator::with_rng(StdRng::seed_from_u64(3));
        let first = reference.export_pseudo_key();

        let mut generator = KeyGenerator::with_rng(StdRng::seed_from_u64(3)).max_attempts(1);
        let issued: HashSet<ExportPseudoKey> = [first].into_iter().collect();
        let err = generator
            .export_pseudo_key_avoiding(&issued)
            .expect_err("single attempt collides");
        assert!(matches!(err, KeyError::Exhausted { attempts: 1 }));
    }
}
