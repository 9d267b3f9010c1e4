use std::sync::Arc;

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

use crate::error::{AppError, Result};

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;
/// The salt length in bytes.
const SALT_LEN: usize = 16;

/// Salted, one-way Argon2id password hashing.
///
/// The salt and parameters are embedded in the PHC string output, so no
/// separate salt storage is needed and verification works across parameter
/// changes.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Creates a hasher with the production Argon2id parameters.
    pub fn new() -> Result<Self> {
        Self::with_params(ARGON2_MEMORY_MB * 1024, ARGON2_ITERATIONS, ARGON2_PARALLELISM)
    }

    /// Creates a hasher with explicit Argon2id parameters.
    ///
    /// # Arguments
    ///
    /// * `m_cost_kib` - Memory cost in KiB.
    /// * `t_cost` - Number of iterations.
    /// * `p_cost` - Degree of parallelism.
    pub fn with_params(m_cost_kib: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = ParamsBuilder::new()
            .m_cost(m_cost_kib)
            .t_cost(t_cost)
            .p_cost(p_cost)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?;

        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = Arc::from(hasher.hash("not-a-real-password")?);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password using Argon2id with a fresh random salt.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to hash.
    ///
    /// # Returns
    ///
    /// A `Result` containing the PHC-formatted hash.
    pub fn hash(&self, password: &str) -> Result<String> {
        let mut password_bytes = password.as_bytes().to_vec();

        let mut salt_bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt_bytes);

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

        let result = self
            .argon2()
            .hash_password(&password_bytes, &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)));

        password_bytes.zeroize();
        salt_bytes.zeroize();
        result
    }

    /// Verifies a password against a hash.
    ///
    /// A mismatch is `Ok(false)`, never an error. Only a hash that cannot be
    /// parsed fails, with `AppError::InvalidHashFormat`.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to verify.
    /// * `hash` - The PHC-formatted hash to verify against.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Stored password hash is malformed: {}", e);
            AppError::InvalidHashFormat
        })?;

        let mut password_bytes = password.as_bytes().to_vec();
        let result = match self.argon2().verify_password(&password_bytes, &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Stored password hash is unusable: {}", e);
                Err(AppError::InvalidHashFormat)
            }
        };

        password_bytes.zeroize();
        result
    }

    /// Burns the same amount of work as a real verification and always fails.
    ///
    /// Used when the user does not exist so that response timing does not
    /// reveal whether a username is registered.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }
}
