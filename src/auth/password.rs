use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// bcrypt-backed credential hashing.
///
/// Output is a self-describing `$2b$<cost>$<salt><hash>` string, safe to store as-is.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: bcrypt::DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Malformed stored hashes verify as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }
}
