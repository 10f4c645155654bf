//! Generation of public identifiers.
//!
//! A public id is `<prefix>_<10 base62 characters>`, e.g. `conn_Xk2l9QvA0b`.
//! Randomness comes from a v4 UUID, skipping its version and variant bytes.

use crate::error_handling::types::DbError;
use uuid::Uuid;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_LEN: usize = 10;
const UUID_VERSION_BYTE: usize = 6;
const UUID_VARIANT_BYTE: usize = 8;

pub fn new_public_id(prefix: &str) -> Result<String, DbError> {
    if prefix.is_empty() {
        return Err(DbError::invalid("missing public id prefix"));
    }
    let bytes = Uuid::new_v4().into_bytes();
    let suffix: String = bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != UUID_VERSION_BYTE && *i != UUID_VARIANT_BYTE)
        .take(ID_LEN)
        .map(|(_, b)| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect();
    Ok(format!("{}_{}", prefix, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_new_public_id_format() {
        let id = new_public_id("conn").unwrap();
        let re = Regex::new(r"^conn_[0-9a-zA-Z]{10}$").unwrap();
        assert!(re.is_match(&id), "unexpected id {}", id);
    }

    #[test]
    fn test_new_public_id_empty_prefix() {
        let err = new_public_id("").unwrap_err();
        assert!(matches!(err, DbError::InvalidParameter(_)));
    }

    #[test]
    fn test_new_public_id_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_public_id("s").unwrap()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
