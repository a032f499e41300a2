//! Scoped masking of a single interrupt source

use core::sync::atomic::{compiler_fence, Ordering};

use ringlink_hal::{Notification, SerialPort};

/// Keeps one interrupt source masked for as long as it lives
///
/// The source is disabled on construction and enabled again on drop,
/// whatever its state was before. This is the critical section around
/// foreground mutations of a FIFO that a handler also mutates. Only the
/// given source is masked; other interrupts keep running.
#[must_use = "the interrupt source is re-enabled as soon as the guard is dropped"]
pub struct MaskGuard<'a, P: SerialPort> {
    port: &'a P,
    source: Notification,
}

impl<'a, P: SerialPort> MaskGuard<'a, P> {
    /// Mask `source` until the guard is dropped
    pub fn new(port: &'a P, source: Notification) -> Self {
        port.disable(source);
        // Keep the protected accesses after the mask
        compiler_fence(Ordering::SeqCst);
        Self { port, source }
    }
}

impl<P: SerialPort> Drop for MaskGuard<'_, P> {
    fn drop(&mut self) {
        // Keep the protected accesses before the unmask
        compiler_fence(Ordering::SeqCst);
        self.port.enable(self.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::{MockPort, PortEvent};

    #[test]
    fn test_masks_for_scope() {
        let port = MockPort::new();
        port.enable(Notification::RxComplete);

        {
            let _guard = MaskGuard::new(&port, Notification::RxComplete);
            assert!(!port.is_enabled(Notification::RxComplete));
        }

        assert!(port.is_enabled(Notification::RxComplete));
    }

    #[test]
    fn test_reenables_even_if_previously_disabled() {
        let port = MockPort::new();
        assert!(!port.is_enabled(Notification::TxReady));

        drop(MaskGuard::new(&port, Notification::TxReady));

        assert!(port.is_enabled(Notification::TxReady));
    }

    #[test]
    fn test_leaves_other_source_alone() {
        let port = MockPort::new();
        port.enable(Notification::RxComplete);
        port.take_events();

        let _guard = MaskGuard::new(&port, Notification::TxReady);

        assert!(port.is_enabled(Notification::RxComplete));
        assert_eq!(
            port.take_events(),
            vec![PortEvent::Disable(Notification::TxReady)]
        );
    }
}
