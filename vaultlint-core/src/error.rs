// vaultlint-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultlintError {
    // --- DOMAIN (assertion evaluation, result shaping) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (IO, parsing, templating, bridge store) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATIVE ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementations to keep `?` ergonomic without duplicate variants
impl From<std::io::Error> for VaultlintError {
    fn from(err: std::io::Error) -> Self {
        VaultlintError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_json::Error> for VaultlintError {
    fn from(err: serde_json::Error) -> Self {
        VaultlintError::Infrastructure(InfrastructureError::StoreParse(err))
    }
}
