//! Password hashing and verification.
//!
//! Credentials are self-describing tokens of the form
//! `pbkdf2$<iterations>$<salt-hex>$<key-hex>`. Stored values that do not
//! carry the `pbkdf2$` tag are legacy plain-text entries and verify by byte
//! equality; everything written today goes through [`hash_password`].

use pbkdf2::pbkdf2_hmac;
use rand::prelude::RngExt;
use rand::rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const ALGORITHM_TAG: &str = "pbkdf2";
const DEFAULT_ITERATIONS: u32 = 310_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Hash a password into a self-describing credential token.
pub fn hash_password(plain: &str) -> String {
    hash_password_with_iterations(plain, DEFAULT_ITERATIONS)
}

/// Hash with an explicit iteration count (tests use a cheap count).
pub fn hash_password_with_iterations(plain: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rng().fill(&mut salt);
    let salt_hex = hex::encode(salt);

    // The hex-encoded salt string itself is the PBKDF2 salt input; stored
    // tokens were derived that way and must keep verifying.
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(plain.as_bytes(), salt_hex.as_bytes(), iterations, &mut key);

    format!("{ALGORITHM_TAG}${iterations}${salt_hex}${}", hex::encode(key))
}

/// Verify a password against a stored credential.
///
/// Fails closed: malformed tokens return `false`, never an error. The final
/// derived-key comparison is constant-time; branch selection between the
/// legacy and modern paths is not.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    if stored.is_empty() {
        return false;
    }

    // Legacy plain-text entries predate hashing
    if !stored.starts_with("pbkdf2$") {
        return stored.as_bytes() == plain.as_bytes();
    }

    let parts: Vec<&str> = stored.split('$').collect();
    // pbkdf2$<iterations>$<salt>$<key>
    if parts.len() != 4 {
        return false;
    }

    let iterations: u32 = match parts[1].parse() {
        Ok(0) | Err(_) => return false,
        Ok(n) => n,
    };
    let salt = parts[2];
    let expected = match hex::decode(parts[3]) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => return false,
    };
    if salt.is_empty() {
        return false;
    }

    let mut derived = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(plain.as_bytes(), salt.as_bytes(), iterations, &mut derived);

    derived.ct_eq(&expected).into()
}
