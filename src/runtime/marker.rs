use std::hash::Hasher;

use ahash::AHasher;

/// Opaque changed/unchanged token, advanced on every accepted write.
///
/// Consumers compare markers to detect "something changed" without diffing
/// full state. Tokens are hash-chained from the previous token plus a write
/// counter, so consecutive accepted writes always produce distinct markers;
/// nothing beyond equality is meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeMarker {
    token: u64,
    writes: u64,
}

impl ChangeMarker {
    pub(crate) fn advance(&mut self) {
        self.writes += 1;
        let mut hasher = AHasher::default();
        hasher.write_u64(self.token);
        hasher.write_u64(self.writes);
        self.token = hasher.finish();
    }

    /// Raw token, for logging only.
    pub fn token(&self) -> u64 {
        self.token
    }
}
