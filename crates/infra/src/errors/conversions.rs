//! Conversions from external infrastructure errors into domain errors.

use lalingua_common::CredentialStoreError;
use lalingua_domain::LaLinguaError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LaLinguaError);

impl From<InfraError> for LaLinguaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LaLinguaError> for InfraError {
    fn from(value: LaLinguaError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLaLinguaError {
    fn into_lalingua(self) -> LaLinguaError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LaLinguaError */
/* -------------------------------------------------------------------------- */

impl IntoLaLinguaError for HttpError {
    fn into_lalingua(self) -> LaLinguaError {
        if self.is_timeout() {
            return LaLinguaError::Timeout("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return LaLinguaError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return LaLinguaError::Config(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => LaLinguaError::Auth(message),
                404 => LaLinguaError::NotFound(message),
                400..=499 => LaLinguaError::InvalidInput(message),
                _ => LaLinguaError::Network(message),
            };
        }

        LaLinguaError::Network(format!("HTTP transport error: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_lalingua())
    }
}

/* -------------------------------------------------------------------------- */
/* config parsing → LaLinguaError */
/* -------------------------------------------------------------------------- */

impl IntoLaLinguaError for serde_json::Error {
    fn into_lalingua(self) -> LaLinguaError {
        LaLinguaError::Config(format!("invalid JSON configuration: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_lalingua())
    }
}

impl IntoLaLinguaError for toml::de::Error {
    fn into_lalingua(self) -> LaLinguaError {
        LaLinguaError::Config(format!("invalid TOML configuration: {}", self.message()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_lalingua())
    }
}

/* -------------------------------------------------------------------------- */
/* CredentialStoreError → LaLinguaError */
/* -------------------------------------------------------------------------- */

impl IntoLaLinguaError for CredentialStoreError {
    fn into_lalingua(self) -> LaLinguaError {
        match self {
            CredentialStoreError::Missing(role) => {
                LaLinguaError::Auth(format!("no credentials stored for {role}"))
            }
            CredentialStoreError::Backend(message) => LaLinguaError::Internal(message),
        }
    }
}

impl From<CredentialStoreError> for InfraError {
    fn from(value: CredentialStoreError) -> Self {
        InfraError(value.into_lalingua())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
