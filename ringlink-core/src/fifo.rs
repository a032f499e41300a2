//! Fixed-capacity circular byte buffer
//!
//! The FIFO never allocates, never blocks and never loops, so every
//! operation is safe to call from an interrupt handler. Overflow and
//! underflow are handled by policy rather than by error:
//!
//! - pushing into a full buffer drops the new byte
//! - popping from an empty buffer yields nothing (or zero, see
//!   [`Fifo::pop_or_zero`])
//!
//! `head == tail` means either "empty" or "full", so both states are
//! tracked with explicit flags instead of reserving a slot. All `N`
//! bytes of the storage are usable.
//!
//! The FIFO has no synchronization of its own. When it is shared with an
//! interrupt handler the caller must provide mutual exclusion, which is
//! what [`StreamChannel`](crate::channel::StreamChannel) does.

use core::ptr;

/// Backing storage for a [`Fifo`]
///
/// Implemented for every byte container that can be viewed as a slice,
/// such as `&mut [u8]` and `[u8; N]`.
pub trait Storage: AsRef<[u8]> + AsMut<[u8]> {}

impl<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> Storage for T {}

/// Fill level of a [`Fifo`] sampled at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Occupancy {
    pub(crate) len: usize,
    pub(crate) is_empty: bool,
    pub(crate) is_full: bool,
}

/// Circular byte buffer over caller-supplied storage
///
/// `S` is anything that derefs to a byte slice: a borrowed `&mut [u8]`
/// or an owned `[u8; N]`. The capacity is the storage length and never
/// changes.
#[derive(Debug)]
pub struct Fifo<S> {
    storage: S,
    capacity: usize,
    /// Next slot to write
    head: usize,
    /// Next slot to read
    tail: usize,
    is_empty: bool,
    is_full: bool,
}

impl<const N: usize> Fifo<[u8; N]> {
    /// Create an empty FIFO owning an array
    ///
    /// Usable in `const` and `static` initializers. A zero-length array
    /// fails const evaluation (or panics at runtime).
    pub const fn from_array(storage: [u8; N]) -> Self {
        assert!(N >= 1, "fifo capacity must be at least 1");

        Self {
            storage,
            capacity: N,
            head: 0,
            tail: 0,
            is_empty: true,
            is_full: false,
        }
    }
}

impl<S: Storage> Fifo<S> {
    /// Bind a FIFO to its backing storage
    ///
    /// Indices start at zero and the buffer is empty. The existing
    /// contents of `storage` are left as they are.
    ///
    /// # Panics
    ///
    /// When `storage` is empty.
    pub fn new(storage: S) -> Self {
        let capacity = storage.as_ref().len();
        assert!(capacity >= 1, "fifo capacity must be at least 1");

        Self {
            storage,
            capacity,
            head: 0,
            tail: 0,
            is_empty: true,
            is_full: false,
        }
    }

    /// Push a byte, silently dropping it if the buffer is full
    #[inline]
    pub fn push(&mut self, value: u8) {
        let _ = self.try_push(value);
    }

    /// Push a byte
    ///
    /// Returns `Err(value)` if the buffer is full; the contents are not
    /// modified in that case.
    pub fn try_push(&mut self, value: u8) -> Result<(), u8> {
        if self.is_full {
            return Err(value);
        }

        self.storage.as_mut()[self.head] = value;
        self.head = self.advance(self.head);
        self.is_empty = false;

        // The write index caught up with the read index
        if self.head == self.tail {
            self.is_full = true;
        }

        Ok(())
    }

    /// Pop the oldest byte, if any
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty {
            return None;
        }

        let value = self.storage.as_ref()[self.tail];
        self.tail = self.advance(self.tail);
        self.is_full = false;

        // The read index caught up with the write index
        if self.tail == self.head {
            self.is_empty = true;
        }

        Some(value)
    }

    /// Pop the oldest byte, returning `0` when the buffer is empty
    ///
    /// The sentinel cannot be told apart from a stored zero byte. Check
    /// [`is_empty`](Self::is_empty) first when zero is a valid payload.
    #[inline]
    pub fn pop_or_zero(&mut self) -> u8 {
        self.pop().unwrap_or(0)
    }

    /// Look at the oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty {
            None
        } else {
            Some(self.storage.as_ref()[self.tail])
        }
    }

    /// Discard all buffered bytes
    ///
    /// The storage is not zeroed.
    pub fn clear(&mut self) {
        self.tail = self.head;
        self.is_empty = true;
        self.is_full = false;
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        if self.is_full {
            self.capacity
        } else if self.head >= self.tail {
            self.head - self.tail
        } else {
            self.capacity - self.tail + self.head
        }
    }

    /// Number of bytes that can still be pushed
    pub fn free(&self) -> usize {
        self.capacity - self.len()
    }

    /// Release the backing storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        if index == self.capacity - 1 {
            0
        } else {
            index + 1
        }
    }
}

impl<S> Fifo<S> {
    /// Total number of bytes the buffer can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Check if the buffer cannot accept another byte
    #[inline]
    pub fn is_full(&self) -> bool {
        self.is_full
    }

    /// Sample the fill level through a raw pointer
    ///
    /// Each field is read with a volatile load and no reference to the
    /// FIFO is formed, so a handler may mutate it between the loads. The
    /// flags are then individually accurate; `len` may lag by the bytes
    /// moved during the sample.
    ///
    /// # Safety
    ///
    /// `fifo` must point to a live `Fifo`. A concurrent writer must run
    /// to completion before the caller resumes.
    #[allow(unsafe_code)]
    pub(crate) unsafe fn occupancy(fifo: *const Self) -> Occupancy {
        let is_empty = ptr::addr_of!((*fifo).is_empty).read_volatile();
        let is_full = ptr::addr_of!((*fifo).is_full).read_volatile();
        let head = ptr::addr_of!((*fifo).head).read_volatile();
        let tail = ptr::addr_of!((*fifo).tail).read_volatile();
        let capacity = ptr::addr_of!((*fifo).capacity).read_volatile();

        let len = if is_full {
            capacity
        } else if is_empty {
            0
        } else if head > tail {
            head - tail
        } else {
            capacity - tail + head
        };

        Occupancy {
            len,
            is_empty,
            is_full,
        }
    }
}
