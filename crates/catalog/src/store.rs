//! Persistence of the filter across restarts.
//!
//! The filter lives in a single string slot of a key-value backend, the same
//! way a browser keeps it in local storage. [`FileSlots`] keeps every slot in
//! one JSON object on disk; [`MemorySlots`] keeps them in process.
//!
//! Edits reach the backend through a [`FilterWriter`], which saves on a
//! blocking thread and only ever writes the latest queued filter.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::watch;

use crate::{error::StoreError, filter::FilterState};

/// Key of the slot that holds the serialized filter.
pub const FILTER_SLOT: &str = "searchkeys";

/// A string-keyed store of string values.
pub trait SlotBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: SlotBackend + ?Sized> SlotBackend for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemorySlots {
    inner: Mutex<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotBackend for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slots kept as a JSON object of strings in a single file.
///
/// A missing file reads as an empty map. Writes go to a temporary file that
/// is then renamed over the target.
#[derive(Debug)]
pub struct FileSlots {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSlots {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }
}

impl SlotBackend for FileSlots {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut slots = match self.read_map() {
            Ok(slots) => slots,
            // A corrupt file is replaced rather than blocking every later write.
            Err(StoreError::Json(err)) => {
                tracing::warn!("replacing corrupt slot file {}: {err}", self.path.display());
                HashMap::new()
            }
            Err(err) => return Err(err),
        };
        slots.insert(key.to_string(), value.to_string());
        write_json_file(&self.path, &slots)
    }
}

fn write_json_file(path: &Path, slots: &HashMap<String, String>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(slots)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}

/// Reads and writes the filter slot of a backend.
#[derive(Debug)]
pub struct FilterStore<B> {
    backend: B,
}

impl<B: SlotBackend> FilterStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Last saved filter, or defaults when the slot is missing or unreadable.
    pub fn load(&self) -> FilterState {
        let raw = match self.backend.get(FILTER_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no saved filter, using defaults");
                return FilterState::default();
            }
            Err(err) => {
                tracing::debug!("filter slot unreadable, using defaults: {err}");
                return FilterState::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                tracing::debug!("saved filter unparsable, using defaults: {err}");
                FilterState::default()
            }
        }
    }

    /// Overwrites the slot with the full filter.
    pub fn save(&self, state: &FilterState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state)?;
        self.backend.set(FILTER_SLOT, &raw)
    }
}

/// Saves filters off the caller's thread.
///
/// [`FilterWriter::queue`] returns at once. Filters queued while a save is
/// running collapse into one: only the latest is written. A failed save is
/// logged and not retried; the next queued filter carries the full state.
#[derive(Debug)]
pub struct FilterWriter {
    queued: watch::Sender<(u64, Option<FilterState>)>,
    written: watch::Receiver<u64>,
}

impl FilterWriter {
    /// Starts the writer task. Must be called from within a Tokio runtime.
    pub fn spawn<B: SlotBackend + 'static>(store: Arc<FilterStore<B>>) -> Self {
        let (queued, mut pending) = watch::channel((0, None::<FilterState>));
        let (done, written) = watch::channel(0);

        tokio::spawn(async move {
            while pending.changed().await.is_ok() {
                let (version, state) = pending.borrow_and_update().clone();
                let Some(state) = state else {
                    continue;
                };

                let store = store.clone();
                match tokio::task::spawn_blocking(move || store.save(&state)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => tracing::warn!("failed to save filter: {err}"),
                    Err(err) => tracing::warn!("filter save task failed: {err}"),
                }
                let _ = done.send(version);
            }
        });

        Self { queued, written }
    }

    pub fn queue(&self, state: FilterState) {
        self.queued.send_modify(|(version, slot)| {
            *version += 1;
            *slot = Some(state);
        });
    }

    /// Waits until everything queued so far has been handled.
    pub async fn flush(&self) {
        let target = self.queued.borrow().0;
        let mut written = self.written.clone();
        let _ = written.wait_for(|version| *version >= target).await;
    }
}
