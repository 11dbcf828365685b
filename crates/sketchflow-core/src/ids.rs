//! Identifier, seed and timestamp generation.

use std::collections::HashSet;

use rand::Rng;

/// Largest value a 31-bit seed can take.
pub const MAX_SEED: u32 = 0x7fff_ffff;

/// A random positive 31-bit integer, used for `seed` and `versionNonce`.
pub fn random_seed() -> u32 {
    rand::rng().random_range(1..=MAX_SEED)
}

/// A fresh element id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Hands out ids that are unique within one normalization or finalization pass.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Claims `preferred` when it is non-empty and unused, otherwise a freshly generated id.
    pub fn claim(&mut self, preferred: Option<&str>) -> String {
        if let Some(id) = preferred.map(str::trim).filter(|id| !id.is_empty()) {
            if self.used.insert(id.to_string()) {
                return id.to_string();
            }
            tracing::debug!(id, "duplicate element id; assigning a new one");
        }
        self.fresh()
    }

    /// Claims `base`, or the first free `base-2`, `base-3`, ...
    pub fn claim_derived(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}-{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Reserves an id without returning a new one; returns false if it was already taken.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.used.insert(id.to_string())
    }

    fn fresh(&mut self) -> String {
        loop {
            let id = generate_id();
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }
}
