//! Timer persistence commands
//!
//! The timer itself knows nothing about storage. These commands connect its
//! state-change observer to the state store and bring a saved snapshot back
//! after a restart.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use ironlog_core::logging_facility::elapsed_ms;
use ironlog_core::{log_op_end, log_op_error, log_op_start};
use ironlog_core::{TimerState, WorkoutTimer};
use ironlog_store::errors::Result;
use ironlog_store::{KeyValueStateStore, StorageHandle};

/// Storage shared between workflows and the timer observer
pub type SharedStorage = Arc<Mutex<StorageHandle>>;

pub(crate) fn lock_storage(storage: &SharedStorage) -> MutexGuard<'_, StorageHandle> {
    storage.lock().unwrap_or_else(|e| e.into_inner())
}

/// Build a state-change observer that writes each snapshot to `timer_state`
///
/// The observer locks `storage` for every write, so timer transitions must
/// not be triggered while the caller holds that lock. Write failures are
/// logged; the in-memory timer stays authoritative.
pub fn persist_timer_state(storage: SharedStorage) -> impl FnMut(&TimerState) + Send + 'static {
    move |state: &TimerState| {
        let start = Instant::now();
        let db = lock_storage(&storage);
        match KeyValueStateStore::new(&db).set_timer_state(Some(state)) {
            Ok(()) => tracing::debug!(
                component = module_path!(),
                op = "persist_timer_state",
                is_running = state.is_running,
                is_paused = state.is_paused,
            ),
            Err(e) => {
                log_op_error!("persist_timer_state", e, duration_ms = elapsed_ms(start));
            }
        }
    }
}

/// Adopt the persisted timer snapshot, if one is saved and readable
///
/// Returns whether a snapshot was restored. A running snapshot resumes with
/// all the time that passed while the process was gone.
pub fn restore_timer(db: &StorageHandle, timer: &mut WorkoutTimer) -> Result<bool> {
    log_op_start!("restore_timer");
    let start = Instant::now();

    let saved = KeyValueStateStore::new(db).timer_state().map_err(|e| {
        log_op_error!("restore_timer", e, duration_ms = elapsed_ms(start));
        e
    })?;
    let restored = match saved {
        Some(state) => {
            timer.restore(state);
            true
        }
        None => false,
    };

    log_op_end!(
        "restore_timer",
        duration_ms = elapsed_ms(start),
        restored = restored
    );
    Ok(restored)
}
