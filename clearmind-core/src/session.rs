//! Session context: bearer token and persisted UI flags.
//!
//! One `Session` is built at startup and handed to the API client and to any
//! view that needs to read or clear the credential. Clones share state.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{ClearMindError, Result};

/// Everything the client persists between runs, under fixed key names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "sidebarCollapsed", default)]
    pub sidebar_collapsed: bool,
}

/// Durable backing for `PersistedState`.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<PersistedState>;
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// JSON file store. A missing file reads as the empty state.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<PersistedState> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedState::default())
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(PersistedState::default());
        }
        serde_json::from_str(&raw).map_err(|e| {
            ClearMindError::StateFile(format!("{}: {}", self.path.display(), e))
        })
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(state)
            .map_err(|e| ClearMindError::StateFile(e.to_string()))?;
        // Write-then-rename so a crash never leaves a half-written token file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<PersistedState>,
}

impl MemoryStateStore {
    pub fn new(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<PersistedState> {
        Ok(self
            .state
            .lock()
            .map_err(|_| ClearMindError::StateFile("state lock poisoned".to_string()))?
            .clone())
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        *self
            .state
            .lock()
            .map_err(|_| ClearMindError::StateFile("state lock poisoned".to_string()))? =
            state.clone();
        Ok(())
    }
}

struct SessionInner {
    store: Box<dyn StateStore>,
    state: RwLock<PersistedState>,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("sidebar_collapsed", &self.sidebar_collapsed())
            .finish()
    }
}

impl Session {
    /// Load the persisted state once; later reads are served from memory.
    pub fn open(store: impl StateStore + 'static) -> Result<Self> {
        let state = store.load()?;
        Ok(Self {
            inner: Arc::new(SessionInner {
                store: Box::new(store),
                state: RwLock::new(state),
            }),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: Box::new(MemoryStateStore::default()),
                state: RwLock::new(PersistedState::default()),
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read(|s| s.token.clone())
    }

    /// Token presence is the only "logged in" signal; expiry is the backend's call.
    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.token.as_deref().is_some_and(|t| !t.is_empty()))
    }

    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.update(|s| s.token = Some(token))?;
        tracing::info!("Session token stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.update(|s| s.token = None)?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.read(|s| s.sidebar_collapsed)
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<()> {
        self.update(|s| s.sidebar_collapsed = collapsed)
    }

    pub fn snapshot(&self) -> PersistedState {
        self.read(Clone::clone)
    }

    fn read<T>(&self, f: impl FnOnce(&PersistedState) -> T) -> T {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn update(&self, f: impl FnOnce(&mut PersistedState)) -> Result<()> {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = guard.clone();
        f(&mut next);
        self.inner.store.save(&next)?;
        *guard = next;
        Ok(())
    }
}
