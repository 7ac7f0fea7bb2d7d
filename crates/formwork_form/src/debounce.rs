//! Debounced validation scheduling.
//!
//! [`DebouncedValidationScheduler`] keeps at most one pending timer per
//! field. Scheduling a field that already has a timer cancels it, so a burst
//! of input results in a single validation run carrying the last value.
//!
//! Each schedule gets a fresh [`ValidationToken`]. A timer only runs its job
//! if its token is still the field's current one when it fires; together with
//! [`JoinHandle::abort`] this makes a cancelled or superseded timer a no-op
//! even if it was already past its sleep when cancelled.
//!
//! Timers run on the ambient tokio runtime. Outside a runtime the job runs
//! immediately.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use formwork_fields::FieldValue;
use hashbrown::HashMap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

// ─────────────────────────────────────────────────────────────────────────────
// ValidationToken
// ─────────────────────────────────────────────────────────────────────────────

/// Identifies one scheduled validation.
///
/// Tokens are strictly increasing per scheduler; token 0 means "nothing was
/// scheduled".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ValidationToken(u64);

impl ValidationToken {
    /// The token returned when nothing was scheduled.
    pub const NONE: Self = Self(0);

    /// Returns the raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns true for [`NONE`](Self::NONE).
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ValidationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DebouncedValidationScheduler
// ─────────────────────────────────────────────────────────────────────────────

struct PendingValidation {
    token: ValidationToken,
    handle: JoinHandle<()>,
}

/// Per-field debounce timers.
pub struct DebouncedValidationScheduler {
    pending: Arc<Mutex<HashMap<String, PendingValidation>>>,
    next_token: AtomicU64,
    disposed: Arc<AtomicBool>,
}

impl fmt::Debug for DebouncedValidationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedValidationScheduler")
            .field("pending", &self.pending_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Default for DebouncedValidationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DebouncedValidationScheduler {
    /// Creates a scheduler with no pending timers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(1),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Schedules `job(field, value)` to run after `delay`, replacing any
    /// pending timer for `field`.
    ///
    /// Returns [`ValidationToken::NONE`] once the scheduler is disposed.
    pub fn schedule_field_validation<F>(
        &self,
        field: &str,
        value: Option<FieldValue>,
        delay: Duration,
        job: F,
    ) -> ValidationToken
    where
        F: FnOnce(String, Option<FieldValue>) + Send + 'static,
    {
        if self.is_disposed() {
            tracing::trace!(field, "scheduler disposed, validation not scheduled");
            return ValidationToken::NONE;
        }
        let token = ValidationToken(self.next_token.fetch_add(1, Ordering::Relaxed));

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                field,
                "no tokio runtime available, validating immediately instead of debouncing"
            );
            self.cancel_field_validation(field);
            job(field.to_owned(), value);
            return token;
        };

        // The lock is held until the new entry is stored so the timer can
        // never observe the map before its own token is in it.
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.remove(field) {
            previous.handle.abort();
            tracing::trace!(field, superseded = %previous.token, by = %token, "debounce timer replaced");
        }

        let timers = Arc::clone(&self.pending);
        let disposed = Arc::clone(&self.disposed);
        let name = field.to_owned();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            let current = {
                let mut timers = timers.lock();
                match timers.get(&name) {
                    Some(entry) if entry.token == token => {
                        timers.remove(&name);
                        true
                    }
                    _ => false,
                }
            };
            if !current || disposed.load(Ordering::Acquire) {
                tracing::trace!(field = %name, %token, "stale debounce timer ignored");
                return;
            }

            tracing::trace!(field = %name, %token, "debounce timer fired");
            job(name, value);
        });

        pending.insert(field.to_owned(), PendingValidation { token, handle });
        tracing::trace!(field, %token, delay_ms = delay.as_millis(), "debounce timer scheduled");
        token
    }

    /// Cancels any pending timer for `field` and runs `job` now, returning
    /// its result.
    pub fn validate_immediately<F, R>(&self, field: &str, job: F) -> R
    where
        F: FnOnce(String) -> R,
    {
        self.cancel_field_validation(field);
        job(field.to_owned())
    }

    /// Cancels the pending timer for `field`, returning whether one existed.
    pub fn cancel_field_validation(&self, field: &str) -> bool {
        let Some(previous) = self.pending.lock().remove(field) else {
            return false;
        };
        previous.handle.abort();
        tracing::trace!(field, token = %previous.token, "debounce timer cancelled");
        true
    }

    /// Cancels every pending timer, returning how many there were.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingValidation> = self
            .pending
            .lock()
            .drain()
            .map(|(_, pending)| pending)
            .collect();
        for pending in &drained {
            pending.handle.abort();
        }
        if !drained.is_empty() {
            tracing::trace!(cancelled = drained.len(), "debounce timers cancelled");
        }
        drained.len()
    }

    /// Cancels every pending timer and refuses further scheduling.
    pub fn dispose_all(&self) {
        self.disposed.store(true, Ordering::Release);
        self.cancel_all();
    }

    /// Returns whether `field` has a pending timer.
    #[must_use]
    pub fn is_pending(&self, field: &str) -> bool {
        self.pending.lock().contains_key(field)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns whether [`dispose_all`](Self::dispose_all) was called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Drop for DebouncedValidationScheduler {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
