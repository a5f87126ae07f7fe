use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Opaque credential material kept on the account record.
///
/// The ledger never interprets it; it only stores the digest produced here and
/// compares digests on verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    /// SHA-256 of the password, hex encoded.
    pub fn from_password(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        CredentialDigest(hex::encode(digest))
    }

    /// Wrap a digest that was produced elsewhere (e.g. read back from storage).
    pub fn from_stored(digest: impl Into<String>) -> Self {
        CredentialDigest(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn verify(&self, password: &str) -> bool {
        *self == CredentialDigest::from_password(password)
    }
}
