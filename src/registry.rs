//! Process-wide registry of live sessions.
//!
//! Hosts that cannot hold Rust references (FFI, scripting bridges) refer to
//! sessions through opaque [`SessionHandle`]s. Handles are
//! generation-checked: a handle to a destroyed session never resolves,
//! even after its slot is reused.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::session::Session;
use crate::settings::ImportSettings;

new_key_type! {
    /// Opaque handle to a registered session.
    pub struct SessionHandle;
}

/// Shared session cell. Sampling locks only the session, never the registry.
pub type SharedSession = Arc<Mutex<Session>>;

/// Owning container of sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<SlotMap<SessionHandle, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unloaded session and return its handle.
    pub fn create(&self, settings: ImportSettings) -> SessionHandle {
        self.insert(Session::new(settings))
    }

    /// Register an existing session.
    pub fn insert(&self, session: Session) -> SessionHandle {
        let handle = self.sessions.lock().insert(Arc::new(Mutex::new(session)));
        tracing::debug!(?handle, "session created");
        handle
    }

    /// Resolve a handle. Returns `None` for destroyed sessions.
    pub fn get(&self, handle: SessionHandle) -> Option<SharedSession> {
        self.sessions.lock().get(handle).cloned()
    }

    /// Remove a session. Returns `false` when the handle was already dead.
    ///
    /// The session itself is dropped once the last outstanding
    /// [`SharedSession`] clone goes away.
    pub fn destroy(&self, handle: SessionHandle) -> bool {
        let removed = self.sessions.lock().remove(handle).is_some();
        if removed {
            tracing::debug!(?handle, "session destroyed");
        }
        removed
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry shared by the whole process.
pub fn global() -> &'static SessionRegistry {
    static REGISTRY: OnceLock<SessionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(SessionRegistry::new)
}
