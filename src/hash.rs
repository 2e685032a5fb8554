use std::fmt;

use sha1::{Digest, Sha1};

/// Fixed-width fingerprint of one raw page observation.
///
/// Two inputs compare equal exactly when every byte matches; even a
/// whitespace-only edit produces a different digest. Digests are rebuilt in
/// memory each process start and never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; Self::LEN]);

impl ContentDigest {
    /// Digest width in bytes.
    pub const LEN: usize = 20;

    /// Fingerprint the raw text of a page.
    pub fn of_text(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Fingerprint an already-encoded buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}
