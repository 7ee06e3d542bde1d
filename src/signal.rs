use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// A one-shot broadcast signal.
///
/// A `Signal` starts out *pending* and transitions exactly once, permanently,
/// to *triggered*. Triggering releases every observer that is waiting on the
/// signal, and any observer that starts waiting afterwards is released
/// immediately. A signal is never re-armed; the [`Notifier`] replaces it
/// wholesale instead.
///
/// The atomic flag holds the durable triggered state; the [`Notify`] is only
/// the parking mechanism for observers that find the flag unset.
///
/// [`Notifier`]: crate::Notifier
#[derive(Debug, Default)]
pub(crate) struct Signal {
    /// Whether the signal has fired. Set once, never cleared.
    triggered: AtomicBool,
    /// Parks observers until the flag is set.
    notify: Notify,
}

impl Signal {
    /// Transitions the signal to the triggered state and releases all
    /// observers, current and future.
    ///
    /// The flag store must precede the wakeup so that a woken observer
    /// re-checking the flag always sees it set.
    pub(crate) fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);

        self.notify.notify_waiters();
    }

    /// Checks whether the signal has fired.
    pub(crate) fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future that resolves once the signal has fired.
    ///
    /// The inner `Notified` future is created *here*, before any flag check:
    /// tokio guarantees that a `Notified` created before `notify_waiters()`
    /// observes the wakeup, which closes the race between checking the flag
    /// and parking. The future resolves immediately if the signal already
    /// fired, and may be created any number of times after that.
    pub(crate) fn triggered(&self) -> Triggered<'_> {
        Triggered {
            signal: self,
            notified: self.notify.notified(),
        }
    }
}

/// A future that resolves once its [`Signal`] has been triggered.
///
/// Returned by [`WaitHandle::triggered`]; resolves to `()` and can be used
/// directly as one branch of a `tokio::select!`.
///
/// [`WaitHandle::triggered`]: crate::WaitHandle::triggered
#[pin_project]
pub struct Triggered<'a> {
    /// The signal being observed.
    signal: &'a Signal,
    /// Parked wait on the signal's `Notify`, registered before the first
    /// flag check.
    #[pin]
    notified: Notified<'a>,
}

impl Future for Triggered<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        loop {
            // The flag is the source of truth; the wakeup only tells us to
            // look at it again.
            if this.signal.is_triggered() {
                return Poll::Ready(());
            }

            match this.notified.as_mut().poll(cx) {
                Poll::Ready(()) => continue,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
