use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Rate-limits a one-argument action to the last call in a quiet window.
///
/// Each [`call`](Debouncer::call) cancels the pending invocation and
/// schedules a new one `window` later, so the action runs once, with the
/// latest argument, after calls stop arriving. Must be used inside a tokio
/// runtime.
pub struct Debouncer<T> {
    window: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(window: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            window,
            action: Arc::new(action),
            pending: None,
        }
    }

    /// Schedule `value`, replacing whatever was pending
    pub fn call(&mut self, value: T) {
        self.cancel();

        // Deadline is fixed now, not when the task first gets polled.
        let deadline = Instant::now() + self.window;
        let action = Arc::clone(&self.action);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            action(value);
        }));
    }
}

impl<T> Debouncer<T> {
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Drop the pending invocation, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether an invocation is scheduled and has not run yet
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Fired = Arc<Mutex<Vec<(Duration, &'static str)>>>;

    fn recording(window_ms: u64) -> (Debouncer<&'static str>, Fired) {
        let fired: Fired = Arc::default();
        let start = Instant::now();
        let sink = fired.clone();
        let debouncer = Debouncer::new(Duration::from_millis(window_ms), move |value| {
            sink.lock().unwrap().push((start.elapsed(), value));
        });
        (debouncer, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_with_last_value() {
        let (mut debouncer, fired) = recording(400);

        debouncer.call("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.call("b");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.call("c");
        tokio::time::sleep(Duration::from_millis(199)).await;
        debouncer.call("d");

        // t = 798: still quiet
        tokio::time::sleep(Duration::from_millis(399)).await;
        assert!(fired.lock().unwrap().is_empty());

        // t = 800: fired at 799 with the t = 399 argument
        tokio::time::sleep(Duration::from_millis(2)).await;
        let fired = fired.lock().unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, "d");
        assert!(fired[0].0 >= Duration::from_millis(799));
        assert!(fired[0].0 < Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_fire_separately() {
        let (mut debouncer, fired) = recording(400);

        debouncer.call("first");
        tokio::time::sleep(Duration::from_millis(500)).await;
        debouncer.call("second");
        tokio::time::sleep(Duration::from_millis(500)).await;

        let values: Vec<_> = fired.lock().unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (mut debouncer, fired) = recording(400);

        debouncer.call("a");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(fired.lock().unwrap().is_empty());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let (mut debouncer, fired) = recording(400);

        debouncer.call("a");
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(fired.lock().unwrap().is_empty());
    }
}
