//! Process-wide in-memory session maps.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{
    Artifact, CanvasStore, LoeSession, SessionError, SolutionSession, SowSession, StructuringSession,
    VisualsSession,
};

/// Generate a new session id (UUID v4, simple form).
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Concurrent map of session documents of one kind.
///
/// Each mutation closure runs under the write lock, so it is atomic with
/// respect to other requests touching the same map.
#[derive(Debug)]
pub struct SessionMap<T> {
    inner: RwLock<HashMap<String, T>>,
}

impl<T> Default for SessionMap<T> {
    fn default() -> Self {
        Self { inner: RwLock::new(HashMap::new()) }
    }
}

impl<T: Artifact> SessionMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh document and return its id together with a copy.
    pub fn create(&self) -> (String, T) {
        let document = T::default();
        let id = self.insert(document.clone());
        (id, document)
    }

    /// Store an existing document under a new id.
    pub fn insert(&self, document: T) -> String {
        let id = new_session_id();
        self.inner.write().insert(id.clone(), document);
        tracing::debug!(kind = %T::KIND, session_id = %id, "Session created");
        id
    }

    /// Clone the document stored under `id`.
    pub fn get(&self, id: &str) -> Result<T, SessionError> {
        self.inner.read().get(id).cloned().ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Mutate the document stored under `id`.
    pub fn update<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut T) -> Result<R, SessionError>,
    ) -> Result<R, SessionError> {
        let mut guard = self.inner.write();
        let document = guard.get_mut(id).ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        f(document)
    }

    pub fn remove(&self, id: &str) -> Result<T, SessionError> {
        self.inner.write().remove(id).ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().len()
    }
}

/// One session map per artifact kind.
#[derive(Debug, Default)]
pub struct SessionStore {
    pub solutioning: SessionMap<SolutionSession>,
    pub structuring: SessionMap<StructuringSession>,
    pub sow: SessionMap<SowSession>,
    pub loe: SessionMap<LoeSession>,
    pub visuals: SessionMap<VisualsSession>,
    /// Document-editing chat threads
    pub canvas: CanvasStore,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of live sessions across all kinds.
    pub fn total(&self) -> usize {
        self.solutioning.len()
            + self.structuring.len()
            + self.sow.len()
            + self.loe.len()
            + self.visuals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SolutionBasic;

    #[test]
    fn test_session_ids_are_unique_simple_uuids() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
    }

    #[test]
    fn test_create_get_update() {
        let map: SessionMap<SolutionSession> = SessionMap::new();
        let (id, created) = map.create();
        assert_eq!(created.count(), 1);

        map.update(&id, |s| {
            s.save_basic(SolutionBasic { title: "Data Platform".into(), ..Default::default() });
            Ok(())
        })
        .unwrap();
        assert_eq!(map.get(&id).unwrap().basic.title, "Data Platform");
    }

    #[test]
    fn test_failed_update_propagates_error() {
        let map: SessionMap<SolutionSession> = SessionMap::new();
        let (id, _) = map.create();
        let result = map.update(&id, |s| s.delete(1));
        assert!(matches!(result, Err(SessionError::LastSolution)));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let map: SessionMap<SowSession> = SessionMap::new();
        assert!(matches!(map.get("missing"), Err(SessionError::NotFound(_))));
        assert!(map.update("missing", |_| Ok(())).is_err());
        assert!(map.remove("missing").is_err());
    }

    #[test]
    fn test_store_total() {
        let store = SessionStore::new();
        store.sow.create();
        store.loe.create();
        store.loe.create();
        assert_eq!(store.total(), 3);
        assert_eq!(store.visuals.len(), 0);
    }
}
