//! Identity interning: maps client-supplied identity strings to stable
//! numeric player IDs.
//!
//! A player's identity outlives any single connection — it is what lets
//! the server recognize a returning client and reattach it to its seat.
//! Clients present an opaque identity string during the handshake; the
//! registry interns it so the rest of the server can work with a cheap
//! `Copy` id instead of passing strings around.

use std::collections::HashMap;

use wordsiege_protocol::PlayerId;

/// Interns identity strings into [`PlayerId`]s.
///
/// The same identity string always resolves to the same id for the
/// lifetime of the server process. Ids are never reused.
#[derive(Default)]
pub struct IdentityRegistry {
    ids: HashMap<String, PlayerId>,
    next: u64,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an identity string to its player id, allocating a fresh
    /// id on first sight.
    pub fn resolve(&mut self, identity: &str) -> PlayerId {
        if let Some(&id) = self.ids.get(identity) {
            return id;
        }
        self.next += 1;
        let id = PlayerId(self.next);
        self.ids.insert(identity.to_owned(), id);
        tracing::debug!(%id, "identity registered");
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_stable_per_identity() {
        let mut registry = IdentityRegistry::new();
        let a = registry.resolve("client-a");
        let b = registry.resolve("client-b");
        assert_ne!(a, b);
        // Presenting the same identity again yields the same id.
        assert_eq!(registry.resolve("client-a"), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ids_are_never_zero() {
        let mut registry = IdentityRegistry::new();
        assert_ne!(registry.resolve("x"), PlayerId(0));
    }
}
