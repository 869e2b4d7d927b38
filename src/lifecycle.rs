//! Destruction notifications.
//!
//! A [`Lifecycle`] is embedded in objects whose destruction other parts of
//! the system need to observe. Callbacks registered with
//! [`Lifecycle::on_destroy`] run exactly once, when the lifecycle is dropped.
//! A panicking callback is logged and does not stop the ones after it.

use std::panic::{self, AssertUnwindSafe};

use parking_lot::Mutex;

type DestroyCallback = Box<dyn FnOnce() + Send>;

/// Registry of callbacks fired when the owning object is destroyed.
#[derive(Default)]
pub struct Lifecycle {
    callbacks: Mutex<Vec<DestroyCallback>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback to run when the owner is destroyed.
    pub fn on_destroy<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.callbacks.lock().push(Box::new(callback));
    }

    /// Number of callbacks waiting for destruction.
    pub fn subscriber_count(&self) -> usize {
        self.callbacks.lock().len()
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        // Take the list first so callbacks never run under our own lock
        let callbacks = std::mem::take(self.callbacks.get_mut());
        for callback in callbacks {
            if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                tracing::error!("Destroy callback panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callbacks_fire_once_on_drop() {
        let fired = Arc::new(AtomicUsize::new(0));
        let lifecycle = Lifecycle::new();
        for _ in 0..3 {
            let fired = fired.clone();
            lifecycle.on_destroy(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(lifecycle.subscriber_count(), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        drop(lifecycle);
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_panicking_callback_does_not_skip_others() {
        let fired = Arc::new(AtomicUsize::new(0));
        let lifecycle = Lifecycle::new();
        {
            let fired = fired.clone();
            lifecycle.on_destroy(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        lifecycle.on_destroy(|| panic!("observer failed"));
        {
            let fired = fired.clone();
            lifecycle.on_destroy(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        drop(lifecycle);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_without_subscribers() {
        let lifecycle = Lifecycle::new();
        drop(lifecycle);
    }
}
