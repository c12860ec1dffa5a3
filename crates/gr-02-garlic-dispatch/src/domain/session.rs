//! Per-peer session state with single-owner checkout.
//!
//! The key and tag set for a peer live in a [`SessionSlot`]. A build job
//! checks the material out, uses it, and releases it. While it is checked
//! out, further build jobs for the same peer are parked inside the slot and
//! handed back, one per release, to be resubmitted.

use gr_01_job_queue::Job;
use parking_lot::Mutex;
use shared_crypto::{SessionKey, SessionTag};
use shared_types::Hash;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Session key plus the tags shared with one peer.
#[derive(Clone)]
pub struct SessionKeyMaterial {
    pub key: SessionKey,
    pub tags: BTreeSet<SessionTag>,
}

impl SessionKeyMaterial {
    pub fn new(key: SessionKey, tags: impl IntoIterator<Item = SessionTag>) -> Self {
        Self {
            key,
            tags: tags.into_iter().collect(),
        }
    }

    /// Fresh random key with `tag_count` random tags.
    pub fn generate(tag_count: usize) -> Self {
        Self::new(
            SessionKey::generate(),
            (0..tag_count).map(|_| SessionTag::generate()),
        )
    }
}

impl fmt::Debug for SessionKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeyMaterial")
            .field("tags", &self.tags.len())
            .finish()
    }
}

#[derive(Default)]
struct SlotState {
    material: Option<SessionKeyMaterial>,
    waiters: VecDeque<Box<dyn Job>>,
}

/// Shared handle to one peer's session material.
#[derive(Clone)]
pub struct SessionSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl SessionSlot {
    pub fn new(material: SessionKeyMaterial) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotState {
                material: Some(material),
                waiters: VecDeque::new(),
            })),
        }
    }

    /// Take the material if nobody holds it.
    pub fn checkout(&self) -> Option<SessionKeyMaterial> {
        self.inner.lock().material.take()
    }

    /// Take the material, or park `job` until the holder releases it.
    ///
    /// On success the job is handed back alongside the material.
    pub fn checkout_or_park<J: Job>(&self, job: Box<J>) -> Option<(SessionKeyMaterial, Box<J>)> {
        let mut state = self.inner.lock();
        match state.material.take() {
            Some(material) => Some((material, job)),
            None => {
                state.waiters.push_back(job);
                None
            }
        }
    }

    /// Return the material. Yields the next parked job, if any, which the
    /// caller must resubmit.
    pub fn release(&self, material: SessionKeyMaterial) -> Option<Box<dyn Job>> {
        let mut state = self.inner.lock();
        state.material = Some(material);
        state.waiters.pop_front()
    }

    pub fn is_checked_out(&self) -> bool {
        self.inner.lock().material.is_none()
    }

    pub fn waiting(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Number of tags held while not checked out.
    pub fn tag_count(&self) -> Option<usize> {
        self.inner.lock().material.as_ref().map(|m| m.tags.len())
    }
}

impl fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("SessionSlot")
            .field("checked_out", &state.material.is_none())
            .field("waiting", &state.waiters.len())
            .finish()
    }
}

/// One [`SessionSlot`] per peer.
pub struct SessionStore {
    slots: Mutex<HashMap<Hash, SessionSlot>>,
    initial_tags: usize,
}

impl SessionStore {
    pub fn new(initial_tags: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            initial_tags,
        }
    }

    /// Slot for `peer`, created with fresh material on first use.
    pub fn slot_for(&self, peer: &Hash) -> SessionSlot {
        self.slots
            .lock()
            .entry(*peer)
            .or_insert_with(|| SessionSlot::new(SessionKeyMaterial::generate(self.initial_tags)))
            .clone()
    }

    /// Replace a peer's session, e.g. after a new key exchange.
    pub fn insert(&self, peer: Hash, material: SessionKeyMaterial) -> SessionSlot {
        let slot = SessionSlot::new(material);
        self.slots.lock().insert(peer, slot.clone());
        slot
    }

    pub fn remove(&self, peer: &Hash) -> bool {
        self.slots.lock().remove(peer).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gr_01_job_queue::{JobContext, JobError};

    struct Noop(&'static str);

    impl Job for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
            Ok(())
        }
    }

    #[test]
    fn test_checkout_is_exclusive() {
        let slot = SessionSlot::new(SessionKeyMaterial::generate(4));
        let held = slot.checkout().unwrap();
        assert!(slot.checkout().is_none());
        assert!(slot.is_checked_out());

        assert!(slot.release(held).is_none());
        assert!(!slot.is_checked_out());
        assert_eq!(slot.tag_count(), Some(4));
    }

    #[test]
    fn test_parked_jobs_released_in_order() {
        let slot = SessionSlot::new(SessionKeyMaterial::generate(1));
        let held = slot.checkout().unwrap();

        assert!(slot.checkout_or_park(Box::new(Noop("first"))).is_none());
        assert!(slot.checkout_or_park(Box::new(Noop("second"))).is_none());
        assert_eq!(slot.waiting(), 2);

        let next = slot.release(held).unwrap();
        assert_eq!(next.name(), "first");
        assert_eq!(slot.waiting(), 1);

        let (material, job) = slot.checkout_or_park(Box::new(Noop("third"))).unwrap();
        assert_eq!(job.name(), "third");
        assert_eq!(slot.release(material).unwrap().name(), "second");
    }

    #[test]
    fn test_store_reuses_slot_per_peer() {
        let store = SessionStore::new(8);
        let peer = [7u8; 32];

        let a = store.slot_for(&peer);
        let material = a.checkout().unwrap();
        let b = store.slot_for(&peer);
        assert!(b.is_checked_out());
        a.release(material);

        store.slot_for(&[9u8; 32]);
        assert_eq!(store.len(), 2);
        assert!(store.remove(&peer));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_material_debug_hides_key() {
        let material = SessionKeyMaterial::generate(3);
        assert_eq!(format!("{material:?}"), "SessionKeyMaterial { tags: 3 }");
    }
}
