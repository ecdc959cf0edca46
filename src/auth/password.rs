use once_cell::sync::Lazy;

use crate::error::AppError;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
// Minimum bcrypt cost under test.
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Stand-in hash checked when no coach matches, so an unknown email costs
/// one verification like a known one.
static UNKNOWN_ACCOUNT_HASH: Lazy<Option<String>> =
    Lazy::new(|| bcrypt::hash("unknown-account", HASH_COST).ok());

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}

pub(crate) fn unknown_account_hash() -> Option<&'static str> {
    UNKNOWN_ACCOUNT_HASH.as_deref()
}

/// Runs a verification that always fails. Always returns `false`.
pub fn verify_unknown_account(password: &str) -> bool {
    if let Some(hash) = unknown_account_hash() {
        let _ = bcrypt::verify(password, hash);
    }
    false
}
