use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::errors::{Error, Result};

pub fn hash(password: &[u8]) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2.hash_password(password, &salt)?.to_string())
}

pub fn validate(password: &[u8], hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)?;
    let argon2 = Argon2::default();

    match argon2.verify_password(password, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Argon2Error(e)),
    }
}

/// Login check: a wrong password and an unusable stored hash look the same to the caller.
pub fn verify_login(password: &[u8], hash: &str) -> Result<()> {
    match validate(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::InvalidLoginDetails),
        Err(e) => {
            tracing::error!("Stored password hash is unusable: {e}");
            Err(Error::InvalidLoginDetails)
        }
    }
}
