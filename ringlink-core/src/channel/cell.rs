//! State shared between foreground code and one interrupt handler

use core::cell::UnsafeCell;
use core::ops::Deref;

/// Interior mutability for a value touched by exactly two contexts
///
/// Access is unchecked: exclusion comes from the masking protocol in
/// [`StreamChannel`](super::StreamChannel), not from this type.
pub(crate) struct HandlerCell<T> {
    inner: UnsafeCell<T>,
}

impl<T> HandlerCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            inner: UnsafeCell::new(value),
        }
    }

    /// Mutate the contents
    ///
    /// # Safety
    ///
    /// No other reference to the contents may exist while `f` runs. From
    /// the foreground this means the competing interrupt source is masked;
    /// from a handler it means the handler is not re-entered. `f` must not
    /// call back into code that touches this cell.
    #[inline]
    pub(crate) unsafe fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.inner.get())
    }

    /// Raw pointer to the contents
    ///
    /// For reads from the foreground that must not hold a reference while
    /// a handler can preempt and mutate the contents.
    #[inline]
    pub(crate) const fn as_ptr(&self) -> *const T {
        self.inner.get()
    }
}

/// Makes a channel shareable with interrupt handlers through a `static`
///
/// [`StreamChannel`](super::StreamChannel) is not `Sync` on its own, which
/// keeps host code from calling handler entry points from another thread.
/// On a single-core target the masking protocol is what makes sharing
/// sound, and this wrapper is where that promise is made.
///
/// ```ignore
/// static LINK: InterruptShared<Link> =
///     unsafe { InterruptShared::new(StreamChannel::new(port, rx, tx)) };
/// ```
pub struct InterruptShared<T> {
    inner: T,
}

impl<T> InterruptShared<T> {
    /// Wrap a value for sharing with interrupt handlers
    ///
    /// # Safety
    ///
    /// The caller guarantees that:
    /// - the target has a single core and a single foreground context
    /// - handlers preempt the foreground but never each other
    /// - each handler entry point is only called from the handler of the
    ///   corresponding interrupt source
    /// - every other method is only called from the foreground
    pub const unsafe fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T> Deref for InterruptShared<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

// SAFETY: see the contract on `InterruptShared::new`. The foreground masks
// a source before touching the state its handler owns, and handlers run to
// completion, so no two contexts hold overlapping references.
unsafe impl<T: Send> Sync for InterruptShared<T> {}
