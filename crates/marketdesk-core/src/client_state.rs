//! Persisted client state: theme preference and a capped access log.
//!
//! Stored as one JSON document, independent of the query cache. A store
//! without a path keeps everything in memory.

use crate::error::{Error, ErrorCode, ErrorOrigin};
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// ClientStateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ClientStateError {
    #[error("client state at {path} could not be accessed: {message}")]
    Io { path: PathBuf, message: String },

    #[error("client state at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl From<ClientStateError> for Error {
    fn from(err: ClientStateError) -> Self {
        Self::new(
            ErrorCode::ClientStateError,
            ErrorOrigin::ClientState,
            "Não foi possível salvar suas preferências.",
        )
        .with_details(err.to_string())
    }
}

///
/// AccessLogEntry
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AccessLogEntry {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    /// RFC 3339, UTC.
    pub timestamp: String,
}

///
/// ClientState
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClientState {
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,

    pub access_logs: VecDeque<AccessLogEntry>,
}

///
/// ClientStateStore
///

pub struct ClientStateStore {
    path: Option<PathBuf>,
    max_access_logs: usize,
    state: Mutex<ClientState>,
}

impl ClientStateStore {
    /// Load from `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>, max_access_logs: usize) -> Result<Self, ClientStateError> {
        let path = path.into();
        let mut state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                ClientStateError::Corrupt {
                    path: path.clone(),
                    message: err.to_string(),
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => ClientState::default(),
            Err(err) => return Err(io_error(&path, &err)),
        };
        trim(&mut state.access_logs, max_access_logs);

        tracing::debug!(path = %path.display(), entries = state.access_logs.len(), "client_state.open");

        Ok(Self {
            path: Some(path),
            max_access_logs,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn in_memory(max_access_logs: usize) -> Self {
        Self {
            path: None,
            max_access_logs,
            state: Mutex::new(ClientState::default()),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.lock().dark_mode
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), ClientStateError> {
        self.update(|state| state.dark_mode = enabled)
    }

    /// Flip the theme and return the new value.
    pub fn toggle_dark_mode(&self) -> Result<bool, ClientStateError> {
        self.update(|state| {
            state.dark_mode = !state.dark_mode;
            state.dark_mode
        })
    }

    /// Append an access; the oldest entries are evicted past the cap.
    pub fn record_access(
        &self,
        path: &str,
        user_email: Option<&str>,
    ) -> Result<(), ClientStateError> {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let entry = AccessLogEntry {
            path: path.to_string(),
            user_email: user_email.map(str::to_string),
            timestamp,
        };

        self.update(|state| {
            state.access_logs.push_back(entry);
            trim(&mut state.access_logs, self.max_access_logs);
        })
    }

    /// Oldest first.
    #[must_use]
    pub fn access_logs(&self) -> Vec<AccessLogEntry> {
        self.lock().access_logs.iter().cloned().collect()
    }

    pub fn clear_access_logs(&self) -> Result<(), ClientStateError> {
        self.update(|state| state.access_logs.clear())
    }

    #[must_use]
    pub fn snapshot(&self) -> ClientState {
        self.lock().clone()
    }

    // Changes are applied to a copy and only committed once the copy is
    // saved, so a failed write leaves memory matching the file.
    fn update<R>(&self, apply: impl FnOnce(&mut ClientState) -> R) -> Result<R, ClientStateError> {
        let mut state = self.lock();
        let mut next = state.clone();
        let out = apply(&mut next);
        self.save(&next)?;
        *state = next;

        Ok(out)
    }

    // Write-then-rename: the file on disk is always a complete document.
    fn save(&self, state: &ClientState) -> Result<(), ClientStateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(state).map_err(|err| ClientStateError::Corrupt {
            path: path.clone(),
            message: err.to_string(),
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|err| io_error(&tmp, &err))?;
        fs::rename(&tmp, path).map_err(|err| io_error(path, &err))?;

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn trim(logs: &mut VecDeque<AccessLogEntry>, cap: usize) {
    while logs.len() > cap {
        logs.pop_front();
    }
}

fn io_error(path: &Path, err: &io::Error) -> ClientStateError {
    ClientStateError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_path(dir: &TempDir) -> PathBuf {
        dir.path().join("client_state.json")
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = ClientStateStore::open(state_path(&dir), 10).expect("open should succeed");

        assert_eq!(store.snapshot(), ClientState::default());
        assert!(!state_path(&dir).exists());
    }

    #[test]
    fn preferences_survive_reopen() {
        let dir = TempDir::new().expect("tempdir");
        {
            let store = ClientStateStore::open(state_path(&dir), 10).expect("open");
            store.set_dark_mode(true).expect("save");
            store
                .record_access("/financeiro", Some("admin@example.com"))
                .expect("save");
        }

        let store = ClientStateStore::open(state_path(&dir), 10).expect("reopen");

        assert!(store.dark_mode());
        let logs = store.access_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].path, "/financeiro");
        assert_eq!(logs[0].user_email.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn file_uses_the_browser_key_names() {
        let dir = TempDir::new().expect("tempdir");
        let store = ClientStateStore::open(state_path(&dir), 10).expect("open");
        store.toggle_dark_mode().expect("save");

        let raw = fs::read_to_string(state_path(&dir)).expect("read back");

        assert!(raw.contains("\"darkMode\": true"));
        assert!(raw.contains("\"access_logs\""));
    }

    #[test]
    fn access_log_is_capped_oldest_first() {
        let store = ClientStateStore::in_memory(3);
        for page in ["/a", "/b", "/c", "/d", "/e"] {
            store.record_access(page, None).expect("in-memory save");
        }

        let paths: Vec<String> = store.access_logs().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, ["/c", "/d", "/e"]);
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing").join("client_state.json");
        let store = ClientStateStore::open(&path, 10).expect("open should succeed");

        let err = store.set_dark_mode(true).expect_err("parent directory is missing");
        assert!(matches!(err, ClientStateError::Io { .. }));
        assert!(store.toggle_dark_mode().is_err());
        assert!(store.record_access("/painel", None).is_err());

        assert_eq!(store.snapshot(), ClientState::default());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(state_path(&dir), "{ not json").expect("write");

        let err = ClientStateStore::open(state_path(&dir), 10)
            .err()
            .expect("corrupt file should fail");

        assert!(matches!(err, ClientStateError::Corrupt { .. }));
        assert_eq!(Error::from(err).code, ErrorCode::ClientStateError);
    }
}
