//! External identifier generation.
//!
//! Ids are 21 characters drawn from a 64-symbol URL-safe alphabet, giving 126
//! bits of entropy from the OS random source. Uniqueness is still enforced by
//! the store; a collision surfaces as a conflict, never an overwrite.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::types::ExternalId;

/// The URL-safe alphabet ids are drawn from. Exactly 64 symbols.
pub const ID_ALPHABET: &[u8; 64] =
    b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Number of characters in a generated id.
pub const ID_LENGTH: usize = 21;

/// Source of fresh external ids.
pub trait IdGenerator: Send + Sync {
    /// Produce a new id.
    fn next_id(&self) -> ExternalId;
}

/// Generates ids from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> ExternalId {
        let mut bytes = [0u8; ID_LENGTH];
        OsRng.fill_bytes(&mut bytes);

        // 64 divides 256, so masking to 6 bits keeps the distribution uniform.
        let id: String = bytes
            .iter()
            .map(|b| ID_ALPHABET[(b & 63) as usize] as char)
            .collect();

        ExternalId::from_trusted(id)
    }
}

/// Whether `c` belongs to the id alphabet.
pub(crate) fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_is_url_safe_and_distinct() {
        let unique: HashSet<u8> = ID_ALPHABET.iter().copied().collect();
        assert_eq!(unique.len(), 64);
        assert!(ID_ALPHABET.iter().all(|b| is_id_char(*b as char)));
    }

    #[test]
    fn test_generated_ids_parse() {
        let generator = RandomIdGenerator::new();
        for _ in 0..100 {
            let id = generator.next_id();
            assert_eq!(id.as_str().len(), ID_LENGTH);
            assert_eq!(ExternalId::parse(id.as_str()).unwrap(), id);
        }
    }

    #[test]
    fn test_generated_ids_distinct() {
        let generator = RandomIdGenerator::new();
        let ids: HashSet<ExternalId> = (0..10_000).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
