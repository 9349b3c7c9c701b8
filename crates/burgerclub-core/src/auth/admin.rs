use sha2::{Digest, Sha256};

use crate::error::ClubError;

/// Digest of "password", used until an admin sets their own.
pub const DEFAULT_ADMIN_HASH: &str =
    "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

pub const MIN_PASSWORD_CHARS: usize = 4;

/// Lower-case hex SHA-256 of the password.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub fn verify_password(password: &str, expected_hash: &str) -> bool {
    hash_password(password).eq_ignore_ascii_case(expected_hash.trim())
}

/// Check a new password and its confirmation, returning the digest to store.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<String, ClubError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ClubError::PasswordTooShort(MIN_PASSWORD_CHARS));
    }
    if password != confirmation {
        return Err(ClubError::PasswordMismatch);
    }
    Ok(hash_password(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_of_password() {
        assert_eq!(hash_password("password"), DEFAULT_ADMIN_HASH);
        assert_eq!(hash_password("password").len(), 64);
    }

    #[test]
    fn test_verify_password() {
        assert!(verify_password("password", DEFAULT_ADMIN_HASH));
        assert!(verify_password("password", &DEFAULT_ADMIN_HASH.to_uppercase()));
        assert!(!verify_password("Password", DEFAULT_ADMIN_HASH));
        assert!(!verify_password("", DEFAULT_ADMIN_HASH));
    }

    #[test]
    fn test_validate_new_password() {
        assert_eq!(
            validate_new_password("abc", "abc"),
            Err(ClubError::PasswordTooShort(4))
        );
        assert_eq!(
            validate_new_password("abcd", "abce"),
            Err(ClubError::PasswordMismatch)
        );
        assert_eq!(validate_new_password("abcd", "abcd"), Ok(hash_password("abcd")));
    }
}
