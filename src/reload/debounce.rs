//! Trailing-edge debouncing of change signals.
//!
//! `DebounceState` is the pure state machine; `Debouncer` drives it from a
//! timer task so callers on any task can signal without coordination.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Last-payload-wins debounce state.
#[derive(Debug)]
pub struct DebounceState<T> {
    interval: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> DebounceState<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Store `payload` and restart the quiet period at `now`.
    ///
    /// Returns true if a pending payload was replaced.
    pub fn push(&mut self, now: Instant, payload: T) -> bool {
        self.pending
            .replace((now + self.interval, payload))
            .is_some()
    }

    /// When the pending payload becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the pending payload once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(_, payload)| payload),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

/// Runs an action with the last payload of each burst of calls.
///
/// Cloning shares the same timer task. Once every handle is dropped, or the
/// cancellation token fires, the task exits and a pending payload is dropped.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the timer task. Must be called from within a Tokio runtime.
    pub fn new<F>(interval: Duration, cancel: CancellationToken, action: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_timer(DebounceState::new(interval), rx, cancel, action));
        Self { tx }
    }

    /// Signal a new payload. Returns false if the timer task has stopped.
    pub fn call(&self, payload: T) -> bool {
        self.tx.send(payload).is_ok()
    }
}

async fn run_timer<T, F>(
    mut state: DebounceState<T>,
    mut rx: mpsc::UnboundedReceiver<T>,
    cancel: CancellationToken,
    mut action: F,
) where
    F: FnMut(T),
{
    loop {
        let deadline = state.deadline();
        tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(payload) => {
                    state.push(Instant::now(), payload);
                }
                None => break,
            },
            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(payload) = state.poll(Instant::now()) {
                    action(payload);
                }
            }
        }
    }

    if !state.is_idle() {
        tracing::debug!("Debouncer stopped with a pending change; dropping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const INTERVAL: Duration = Duration::from_millis(500);

    #[test]
    fn test_state_last_payload_wins() {
        let start = Instant::now();
        let mut state = DebounceState::new(INTERVAL);
        assert!(state.is_idle());

        assert!(!state.push(start, 1));
        assert!(state.push(start + Duration::from_millis(100), 2));
        assert_eq!(state.deadline(), Some(start + Duration::from_millis(600)));

        assert_eq!(state.poll(start + Duration::from_millis(599)), None);
        assert_eq!(state.poll(start + Duration::from_millis(600)), Some(2));
        assert!(state.is_idle());
        assert_eq!(state.poll(start + Duration::from_secs(10)), None);
    }

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(u32) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v| sink.lock().unwrap().push(v))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_payload() {
        let (seen, action) = recorder();
        let debouncer = Debouncer::new(INTERVAL, CancellationToken::new(), action);

        for v in 1..=3 {
            assert!(debouncer.call(v));
            time::sleep(Duration::from_millis(100)).await;
        }
        assert!(seen.lock().unwrap().is_empty());

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (seen, action) = recorder();
        let debouncer = Debouncer::new(INTERVAL, CancellationToken::new(), action);

        debouncer.call(1);
        time::sleep(Duration::from_secs(1)).await;
        debouncer.clone().call(2);
        time::sleep(Duration::from_secs(1)).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_does_not_flush() {
        let (seen, action) = recorder();
        let debouncer = Debouncer::new(INTERVAL, CancellationToken::new(), action);

        debouncer.call(1);
        drop(debouncer);
        time::sleep(Duration::from_secs(1)).await;

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_timer() {
        let (seen, action) = recorder();
        let cancel = CancellationToken::new();
        let debouncer = Debouncer::new(INTERVAL, cancel.clone(), action);

        debouncer.call(1);
        time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        time::sleep(Duration::from_secs(1)).await;

        assert!(seen.lock().unwrap().is_empty());
        assert!(!debouncer.call(2));
    }
}
