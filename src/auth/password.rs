use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub struct HashedPassword {
    pub hash: String,
    pub salt: String,
}

fn hasher() -> Result<Argon2<'static>, String> {
    let params = Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id (19MB memory, 2 iterations, parallelism 1)
/// with a fresh random salt.
pub fn hash(password: &str) -> Result<HashedPassword, String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))?;

    Ok(HashedPassword {
        hash,
        salt: salt.as_str().to_string(),
    })
}

/// Verify a password against a stored hash and the salt it was created with.
pub fn verify(password: &str, hash: &str, salt: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid hash: {e}"))?;
    if parsed.salt.map(|s| s.as_str()) != Some(salt) {
        return Ok(false);
    }
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("correct horse").unwrap();
        assert!(hashed.hash.starts_with("$argon2id$"));
        assert!(verify("correct horse", &hashed.hash, &hashed.salt).unwrap());
        assert!(!verify("wrong horse", &hashed.hash, &hashed.salt).unwrap());
    }

    #[test]
    fn salts_are_unique() {
        let a = hash("same").unwrap();
        let b = hash("same").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn mismatched_salt_is_rejected() {
        let a = hash("secret-pass").unwrap();
        let b = hash("secret-pass").unwrap();
        assert!(!verify("secret-pass", &a.hash, &b.salt).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify("anything", "not-a-phc-string", "salt").is_err());
    }
}
