//! In-process notification center.

use super::{NotificationCenter, NotificationError, NotificationRequest};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Keeps pending requests keyed by identifier.
///
/// Used by the CLI and tests; a mobile shell supplies its own center.
#[derive(Debug, Default)]
pub struct InMemoryNotificationCenter {
    pending: Mutex<BTreeMap<String, NotificationRequest>>,
    denied: bool,
}

impl InMemoryNotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A center that rejects every request, as when permission was refused.
    pub fn denied() -> Self {
        Self {
            pending: Mutex::default(),
            denied: true,
        }
    }

    /// Pending requests ordered by identifier.
    pub fn pending(&self) -> Vec<NotificationRequest> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, NotificationRequest>> {
        // A poisoned map is still a consistent map of requests.
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationCenter for InMemoryNotificationCenter {
    fn add(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        if self.denied {
            return Err(NotificationError::PermissionDenied);
        }
        self.lock().insert(request.identifier.clone(), request);
        Ok(())
    }

    fn remove_pending(&self, identifiers: &[String]) {
        let mut pending = self.lock();
        for identifier in identifiers {
            pending.remove(identifier);
        }
    }
}
