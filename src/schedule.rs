//! Animation-frame scheduling.
//!
//! [`FrameScheduler`] plays the role of `requestAnimationFrame` /
//! `cancelAnimationFrame`: owners request a callback for the next frame,
//! may cancel it by token, and the host drains everything requested so far
//! once per display refresh. Each owner has at most one pending request.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Identifies one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

/// Pending frame requests keyed by owner.
#[derive(Debug)]
pub struct FrameScheduler<K> {
    next: u64,
    pending: BTreeMap<FrameToken, K>,
    by_owner: HashMap<K, FrameToken>,
}

impl<K: Copy + Eq + Hash> FrameScheduler<K> {
    pub fn new() -> Self {
        Self {
            next: 1,
            pending: BTreeMap::new(),
            by_owner: HashMap::new(),
        }
    }

    /// Request a frame for `owner`. If one is already pending, its token is
    /// returned and nothing new is queued.
    pub fn request(&mut self, owner: K) -> FrameToken {
        if let Some(&token) = self.by_owner.get(&owner) {
            return token;
        }
        let token = FrameToken(self.next);
        self.next += 1;
        self.pending.insert(token, owner);
        self.by_owner.insert(owner, token);
        token
    }

    /// Cancel a request. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, token: FrameToken) -> bool {
        match self.pending.remove(&token) {
            Some(owner) => {
                self.by_owner.remove(&owner);
                true
            }
            None => false,
        }
    }

    /// Cancel whatever `owner` has pending.
    pub fn cancel_owner(&mut self, owner: K) -> bool {
        match self.by_owner.remove(&owner) {
            Some(token) => {
                self.pending.remove(&token);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, owner: K) -> bool {
        self.by_owner.contains_key(&owner)
    }

    /// The token `owner` is waiting on, if any.
    pub fn token_for(&self, owner: K) -> Option<FrameToken> {
        self.by_owner.get(&owner).copied()
    }

    /// Take every pending request, oldest first. Requests made while the
    /// caller works through the result wait for the next drain.
    pub fn drain(&mut self) -> Vec<(FrameToken, K)> {
        self.by_owner.clear();
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Copy + Eq + Hash> Default for FrameScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
