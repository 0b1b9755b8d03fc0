//! The authoritative in-memory list of tracked photos, newest first.

use crate::models::{PhotoStatus, TrackedPhoto};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared ordered collection keyed by photo id. Cloning is cheap and every
/// clone sees the same list.
///
/// Mutation goes through `insert`, `update_status`, and `remove` only; each
/// holds the lock for its whole duration, so a concurrently running poller
/// can never observe a half-applied change.
#[derive(Debug, Clone, Default)]
pub struct CollectionStore {
    inner: Arc<Mutex<Vec<TrackedPhoto>>>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TrackedPhoto>> {
        // A poisoned lock only means a panic elsewhere; the list itself is
        // still whole.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Prepends the photo. An existing entry with the same id is replaced in
    /// place instead of duplicated, keeping ids unique.
    pub fn insert(&self, photo: TrackedPhoto) {
        let mut photos = self.lock();
        if let Some(existing) = photos.iter_mut().find(|p| p.photo_id == photo.photo_id) {
            *existing = photo;
            return;
        }
        photos.insert(0, photo);
    }

    /// Merges a status change into the entry with this id, touching nothing
    /// else. A missing id is a silent no-op so a late poll result can never
    /// resurrect a removed entry.
    pub fn update_status(&self, photo_id: &str, status: PhotoStatus) {
        if let Some(photo) = self.lock().iter_mut().find(|p| p.photo_id == photo_id) {
            photo.status = status;
        }
    }

    /// Removes the entry with this id if present. Idempotent.
    pub fn remove(&self, photo_id: &str) {
        self.lock().retain(|p| p.photo_id != photo_id);
    }

    pub fn get(&self, photo_id: &str) -> Option<TrackedPhoto> {
        self.lock().iter().find(|p| p.photo_id == photo_id).cloned()
    }

    pub fn snapshot(&self) -> Vec<TrackedPhoto> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
