use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};

use super::cancellation::{Cancelled, CancellationToken};

/// Bounded admission control for resource-sensitive work.
///
/// At most [`capacity()`](AdmissionGate::capacity) holders of an
/// [`AdmissionPermit`] exist at any time. Waiters park on the underlying
/// semaphore (no polling) and are released in FIFO order. A waiter gives
/// up as soon as its [`CancellationToken`] fires.
///
/// # Example
///
/// ```ignore
/// static LOADER_GATE: LazyLock<AdmissionGate> = LazyLock::new(|| AdmissionGate::new(1));
///
/// let permit = LOADER_GATE.acquire(&token).await?;
/// run_loader();
/// drop(permit); // next waiter is admitted
/// ```
#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Semaphore,
    capacity: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` concurrent holders.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "admission gate capacity must be non-zero");
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Waits for admission.
    ///
    /// Returns `Err(Cancelled)` if `token` is (or becomes) cancelled before a
    /// permit is granted. Cancellation is only observed while waiting; a
    /// granted permit is never revoked.
    pub async fn acquire(
        &self,
        token: &CancellationToken,
    ) -> Result<AdmissionPermit<'_>, Cancelled> {
        if token.is_cancelled() {
            return Err(Cancelled);
        }

        let permit = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Cancelled),
            permit = self.semaphore.acquire() => permit.map_err(|_| Cancelled)?,
        };

        Ok(self.admit(permit))
    }

    /// Attempts admission without waiting.
    pub fn try_acquire(&self) -> Option<AdmissionPermit<'_>> {
        self.semaphore.try_acquire().ok().map(|permit| self.admit(permit))
    }

    fn admit<'a>(&'a self, permit: SemaphorePermit<'a>) -> AdmissionPermit<'a> {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        AdmissionPermit {
            gate: self,
            _permit: permit,
        }
    }

    /// Maximum number of concurrent holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of simultaneously held permits observed so far.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

/// RAII permit returned by [`AdmissionGate::acquire`].
///
/// Dropping the permit (on any exit path, including unwinding) releases the
/// slot and admits the next waiter.
#[must_use = "admission is released as soon as the permit is dropped"]
pub struct AdmissionPermit<'a> {
    gate: &'a AdmissionGate,
    _permit: SemaphorePermit<'a>,
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        // Runs before the semaphore permit field is dropped, so `in_flight`
        // never exceeds the capacity.
        self.gate.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for AdmissionPermit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionPermit")
            .field("capacity", &self.gate.capacity)
            .finish()
    }
}
