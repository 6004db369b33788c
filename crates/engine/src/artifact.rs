//! In-memory artifact handles.
//!
//! The store plays the role of an object-URL registry: it turns a response
//! body into an addressable [`ArtifactHandle`] and guarantees that at most
//! one handle resolves at any time.

use std::sync::Arc;

use arffsplit_types::ArtifactHandle;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ArtifactStore {
    next_id: u64,
    live: Option<(ArtifactHandle, Arc<[u8]>)>,
    released: u64,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize `bytes` behind a fresh handle. Any handle still live is
    /// released first, so the previous handle never resolves again.
    pub fn create(&mut self, bytes: Vec<u8>) -> ArtifactHandle {
        self.release_all();
        self.next_id += 1;
        let handle = ArtifactHandle::from_raw(self.next_id);
        debug!(url = %handle.url(), size = bytes.len(), "artifact created");
        self.live = Some((handle, Arc::from(bytes)));
        handle
    }

    /// Release `handle` if it is the live one. Returns whether anything was released.
    pub fn release(&mut self, handle: ArtifactHandle) -> bool {
        match &self.live {
            Some((live, _)) if *live == handle => {
                self.live = None;
                self.released += 1;
                debug!(url = %handle.url(), "artifact released");
                true
            }
            _ => false,
        }
    }

    /// Release whatever handle is live.
    pub fn release_all(&mut self) {
        if let Some((handle, _)) = &self.live {
            let handle = *handle;
            self.release(handle);
        }
    }

    /// Bytes behind `handle`, if it is still live.
    pub fn get(&self, handle: ArtifactHandle) -> Option<Arc<[u8]>> {
        self.live
            .as_ref()
            .filter(|(live, _)| *live == handle)
            .map(|(_, bytes)| Arc::clone(bytes))
    }

    pub fn live_handle(&self) -> Option<ArtifactHandle> {
        self.live.as_ref().map(|(handle, _)| *handle)
    }

    /// Number of live handles; never more than one.
    pub fn live_count(&self) -> usize {
        usize::from(self.live.is_some())
    }

    /// Handles issued over the store's lifetime.
    pub fn created_count(&self) -> u64 {
        self.next_id
    }

    /// Handles released over the store's lifetime.
    pub fn released_count(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creating_releases_the_previous_handle() {
        let mut store = ArtifactStore::new();
        let first = store.create(vec![1, 2, 3]);
        let second = store.create(vec![4]);

        assert_ne!(first, second);
        assert!(store.get(first).is_none());
        assert_eq!(store.get(second).as_deref(), Some(&[4u8][..]));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.released_count(), 1);
    }

    #[test]
    fn releasing_a_stale_handle_is_a_no_op() {
        let mut store = ArtifactStore::new();
        let first = store.create(vec![1]);
        let second = store.create(vec![2]);

        assert!(!store.release(first));
        assert_eq!(store.live_handle(), Some(second));
        assert!(store.release(second));
        assert_eq!(store.live_count(), 0);
        store.release_all();
        assert_eq!(store.released_count(), 2);
    }
}
