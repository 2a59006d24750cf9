//! The replica's single in-memory request database, guarded by one mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use hotcert_types::{Fingerprint, RequestInfo};

/// Map `Fingerprint -> RequestInfo`, guarded by one mutex so every
/// read-modify-write sequence on a `RequestInfo` is serialized.
#[derive(Default)]
pub struct Database {
    entries: Mutex<HashMap<Fingerprint, RequestInfo>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the database.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut HashMap<Fingerprint, RequestInfo>) -> R) -> R {
        let mut guard = self.entries.lock().expect("database mutex poisoned");
        f(&mut guard)
    }
}
