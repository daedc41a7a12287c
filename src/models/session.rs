use serde::{Deserialize, Serialize};
use std::fmt;

/// The two session cookies that identify a logged-in account.
///
/// Both tokens are required and non-empty; a pair is never built from only
/// one of them. Stored as `{"sid": ..., "sls": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub sid: String,
    pub sls: String,
}

impl CredentialPair {
    /// Build a pair, or `None` if either token is empty.
    pub fn new(sid: impl Into<String>, sls: impl Into<String>) -> Option<Self> {
        let sid = sid.into();
        let sls = sls.into();

        if sid.is_empty() || sls.is_empty() {
            return None;
        }

        Some(Self { sid, sls })
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("sid", &"<redacted>")
            .field("sls", &"<redacted>")
            .finish()
    }
}

/// Stored form of the credential pair. Either field may be missing in
/// hand-edited or legacy storage, in which case the pair counts as absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StoredCredentials {
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    sls: Option<String>,
}

impl StoredCredentials {
    pub(crate) fn into_pair(self) -> Option<CredentialPair> {
        CredentialPair::new(self.sid?, self.sls?)
    }
}

/// Account name returned by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation state of the stored or submitted credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Validating,
    Authenticated(SessionIdentity),
    /// Last validation failed. Advisory only, never blocks a new submission.
    Invalid,
}

impl SessionStatus {
    pub fn is_validating(&self) -> bool {
        matches!(self, Self::Validating)
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Snapshot of everything a credentials panel displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub status: SessionStatus,

    /// A valid pair is currently stored
    pub has_credentials: bool,

    /// The inline "incorrect credentials" message should be shown
    pub show_validation_error: bool,
}

impl SessionView {
    /// Whether a save with these inputs would be accepted and is meaningful.
    pub fn can_submit(&self, sid: &str, sls: &str) -> bool {
        !self.has_credentials && !self.status.is_validating() && !sid.is_empty() && !sls.is_empty()
    }

    /// Whether there is a stored pair to clear.
    pub fn can_clear(&self) -> bool {
        self.has_credentials
    }
}
