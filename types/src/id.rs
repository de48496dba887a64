//! Case and user identifiers.

use blake2::digest::consts::U16;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::time::Timestamp;

type Blake2b128 = Blake2b<U16>;

/// A 16-byte case identifier, rendered as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId([u8; 16]);

impl CaseId {
    pub const LEN: usize = 16;

    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Derive a fresh id from the submission's identifying fields.
    ///
    /// `nonce` disambiguates submissions that share owner, title and second.
    pub fn derive(owner: &UserId, title: &str, created_at: Timestamp, nonce: u64) -> Self {
        let mut hasher = Blake2b128::new();
        hasher.update(owner.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(title.as_bytes());
        hasher.update(created_at.as_secs().to_be_bytes());
        hasher.update(nonce.to_be_bytes());
        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaseId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for CaseId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| TypeError::InvalidCaseId(s.to_string()))?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidCaseId(s.to_string()))?;
        Ok(Self(arr))
    }
}

/// An authenticated user's identifier, issued by the external identity provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Maximum accepted length of a user id.
    pub const MAX_LEN: usize = 64;

    /// Create a user id from a trusted string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse an untrusted user id (non-empty, at most [`Self::MAX_LEN`] bytes,
    /// no whitespace or control characters).
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && !raw.chars().any(|c| c.is_whitespace() || c.is_control());
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(TypeError::InvalidUserId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
