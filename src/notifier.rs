use crate::signal::{Signal, Triggered};
use std::future::IntoFuture;
use std::mem;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// A broadcast wake-up primitive, similar in spirit to a condition variable's
/// broadcast, but exposed through a handle that composes with
/// `tokio::select!`.
///
/// Any number of tasks call [`wait`] to capture a handle to the current
/// internal signal and then await it. A single call to [`notify`] releases
/// every task holding a handle to that signal, installs a fresh signal, and
/// the notifier is immediately ready for the next cycle.
///
/// Notifications are not buffered: a [`notify`] that happens while nobody
/// holds a handle is simply not observed by handles captured later. Because
/// of this, callers waiting for some condition to become true must capture
/// the handle *before* checking the condition, and re-check it after being
/// released (the classic check/wait/recheck loop); checking first and then
/// calling [`wait`] can miss a wakeup that fired in between.
///
/// There is no ordering or fairness guarantee among tasks released by the
/// same [`notify`], and no payload is carried; the signal means only "an
/// event happened".
///
/// # Examples
///
/// Waiting on a notification alongside a timeout:
///
/// ```
/// use broadcast_notify::Notifier;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let notifier = Arc::new(Notifier::new());
///
/// // Capture the handle before anything that could make the awaited
/// // condition true, so the wake-up cannot be missed.
/// let handle = notifier.wait();
///
/// let waiter = tokio::spawn(async move {
///     tokio::select! {
///         _ = handle.triggered() => true,
///         _ = tokio::time::sleep(Duration::from_secs(5)) => false,
///     }
/// });
///
/// notifier.notify();
/// assert!(waiter.await.unwrap());
/// # }
/// ```
///
/// [`wait`]: Notifier::wait
/// [`notify`]: Notifier::notify
#[derive(Debug, Default)]
pub struct Notifier {
    /// The current signal. Handles snapshot it under the lock; `notify`
    /// replaces it under the lock and triggers the old one outside it.
    current: Mutex<Arc<Signal>>,
}

impl Notifier {
    /// Creates a new notifier with a fresh, pending signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures a handle to the current signal.
    ///
    /// This call never blocks; the returned [`WaitHandle`] is what the
    /// caller awaits, either directly or as one branch of a
    /// `tokio::select!`. Every handle returned before a subsequent
    /// [`notify`] begins is guaranteed to be released by it; a `wait` racing
    /// that `notify` may capture the replacement signal instead and is
    /// released by the next one.
    ///
    /// # Returns
    ///
    /// A cloneable handle tied to the signal that was current at the time of
    /// the call.
    ///
    /// [`notify`]: Notifier::notify
    pub fn wait(&self) -> WaitHandle {
        let signal = self.current.lock().unwrap().clone();

        WaitHandle { signal }
    }

    /// Releases every waiter holding a handle to the current signal and
    /// resets the notifier for reuse.
    ///
    /// The swap of the current signal happens under the lock; the broadcast
    /// itself happens after the lock is released, so waking many or slow
    /// waiters never delays a concurrent [`wait`] or a subsequent `notify`.
    /// Calling this with no outstanding handles is a no-op apart from the
    /// swap.
    ///
    /// [`wait`]: Notifier::wait
    pub fn notify(&self) {
        let old = {
            let mut current = self.current.lock().unwrap();
            mem::replace(&mut *current, Arc::new(Signal::default()))
        };

        trace!("superseding current signal and releasing its waiters");

        old.trigger();
    }
}

/// A handle to one signal instance of a [`Notifier`].
///
/// Obtained from [`Notifier::wait`]. The handle stays valid across the
/// signal firing: [`triggered`] may be awaited any number of times and
/// resolves immediately once the signal has fired. Clones share the same
/// signal instance.
///
/// Holding a handle keeps its signal alive even after the notifier has moved
/// on to a newer one; dropping the last handle releases the superseded
/// signal's memory.
///
/// [`triggered`]: WaitHandle::triggered
#[derive(Clone, Debug)]
pub struct WaitHandle {
    signal: Arc<Signal>,
}

impl WaitHandle {
    /// Returns a future that resolves once this handle's signal has been
    /// triggered by a [`Notifier::notify`] call.
    ///
    /// The future is select-compatible and resolves immediately if the
    /// signal already fired. Dropping it without awaiting (for example when
    /// another select branch wins) has no effect on the notifier or on
    /// other waiters.
    pub fn triggered(&self) -> Triggered<'_> {
        self.signal.triggered()
    }

    /// Checks whether this handle's signal has already been triggered.
    pub fn is_triggered(&self) -> bool {
        self.signal.is_triggered()
    }
}

impl<'a> IntoFuture for &'a WaitHandle {
    type Output = ();
    type IntoFuture = Triggered<'a>;

    /// Allows a handle reference to be awaited directly, as shorthand for
    /// [`WaitHandle::triggered`].
    fn into_future(self) -> Self::IntoFuture {
        self.triggered()
    }
}
