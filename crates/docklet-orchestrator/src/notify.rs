//! Refresh notifications sent after a batch completes

/// Told once per finished batch that node and container state changed
pub trait RefreshNotifier: Send + Sync {
    fn refresh(&self);
}

/// Notifier that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl RefreshNotifier for NoopNotifier {
    fn refresh(&self) {}
}

impl<F> RefreshNotifier for F
where
    F: Fn() + Send + Sync,
{
    fn refresh(&self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_notifier() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let notifier = move || {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        notifier.refresh();
        RefreshNotifier::refresh(&notifier);
        assert_eq!(count.load(Ordering::SeqCst), 2);

        NoopNotifier.refresh();
    }
}
