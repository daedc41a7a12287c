use crate::models::{CredentialPair, SessionIdentity};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Reasons a credential pair could not be validated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Credentials were rejected")]
    Rejected,

    #[error("Validation request failed: {0}")]
    Transport(String),

    #[error("Validation timed out after {0:?}")]
    Timeout(Duration),
}

/// Checks a credential pair against the remote account service.
///
/// Implementations must be safe to call repeatedly with the same pair. The
/// controller bounds each call with its own timeout.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate_session(
        &self,
        credentials: &CredentialPair,
    ) -> Result<SessionIdentity, ValidationError>;
}

/// Reply shape of the backend `validate_session` command: `{ "user": ... }`,
/// with `user` absent or null when the cookies are not accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationResponse {
    #[serde(default)]
    pub user: Option<String>,
}

impl ValidationResponse {
    pub fn into_identity(self) -> Result<SessionIdentity, ValidationError> {
        match self.user {
            Some(user) if !user.is_empty() => Ok(SessionIdentity::new(user)),
            _ => Err(ValidationError::Rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_user() {
        let response: ValidationResponse = serde_json::from_str(r#"{"user":"tester"}"#).unwrap();
        assert_eq!(response.into_identity(), Ok(SessionIdentity::new("tester")));
    }

    #[test]
    fn test_response_without_user_is_rejection() {
        for raw in [r#"{}"#, r#"{"user":null}"#, r#"{"user":""}"#] {
            let response: ValidationResponse = serde_json::from_str(raw).unwrap();
            assert_eq!(response.into_identity(), Err(ValidationError::Rejected));
        }
    }
}
