//! Internal deployment identifiers
//!
//! Log and output artifacts are named after a SHA-1 digest of the repository,
//! environment and numeric deployment id so that the raw id never appears in
//! a public URL. The digest is stable across restarts, which lets a superseded
//! deployment's log be referenced long after it ran.

use std::fmt;

use sha1::{Digest, Sha1};

/// Hex-encoded SHA-1 of `repository ++ environment ++ id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InternalDeploymentId(String);

impl InternalDeploymentId {
    /// Derive the identifier for a deployment
    pub fn derive(repository: &str, environment: &str, deployment_id: u64) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(repository.as_bytes());
        hasher.update(environment.as_bytes());
        hasher.update(deployment_id.to_string().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalDeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InternalDeploymentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
