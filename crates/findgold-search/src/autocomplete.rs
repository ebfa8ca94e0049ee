//! Debounced city autocompletion.
//!
//! Each keystroke replaces the pending lookup: the previous timer is aborted,
//! never queued, so a burst of typing costs one request issued once the
//! input has been quiet for the debounce delay.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SearchError;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_MIN_CHARS: usize = 2;

/// Anything that can turn a partial city name into suggestions.
pub trait CitySuggestionSource: Send + Sync + 'static {
    fn suggest(&self, query: &str)
        -> impl Future<Output = Result<Vec<String>, SearchError>> + Send;
}

/// What the input box should show next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionEvent {
    /// A lookup for `query` is scheduled; show the spinner.
    Loading { query: String },
    /// Lookup finished.
    Suggestions { query: String, cities: Vec<String> },
    /// Lookup failed; hide the spinner and keep the current list.
    Failed { query: String, error: String },
    /// Input too short; hide the list.
    Cleared,
}

/// Owns the single pending lookup for one input box.
pub struct SuggestionDebouncer<S> {
    source: Arc<S>,
    delay: Duration,
    min_chars: usize,
    pending: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<SuggestionEvent>,
}

impl<S: CitySuggestionSource> SuggestionDebouncer<S> {
    /// Creates a debouncer with the default 250 ms delay and two-character
    /// minimum. Events are delivered on the returned receiver.
    #[must_use]
    pub fn new(source: Arc<S>) -> (Self, mpsc::UnboundedReceiver<SuggestionEvent>) {
        Self::with_timing(source, DEFAULT_DEBOUNCE, DEFAULT_MIN_CHARS)
    }

    #[must_use]
    pub fn with_timing(
        source: Arc<S>,
        delay: Duration,
        min_chars: usize,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                source,
                delay,
                min_chars,
                pending: None,
                events,
            },
            rx,
        )
    }

    /// Handles a change of the input text.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_input(&mut self, text: &str) {
        self.cancel();

        let query = text.trim().to_string();
        if query.chars().count() < self.min_chars {
            let _ = self.events.send(SuggestionEvent::Cleared);
            return;
        }

        let _ = self.events.send(SuggestionEvent::Loading {
            query: query.clone(),
        });

        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let outcome = source.suggest(&query).await;
            let event = match outcome {
                Ok(cities) => {
                    tracing::debug!(query = %query, count = cities.len(), "city suggestions");
                    SuggestionEvent::Suggestions { query, cities }
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "city suggestion lookup failed");
                    SuggestionEvent::Failed {
                        query,
                        error: e.to_string(),
                    }
                }
            };
            // The receiver may be gone if the input box was closed.
            let _ = events.send(event);
        }));
    }

    /// Aborts the pending lookup, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// `true` while a lookup is scheduled or in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<S> Drop for SuggestionDebouncer<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;

    /// Records every lookup and when it happened.
    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<(String, Instant)>>,
        fail: bool,
    }

    impl RecordingSource {
        fn calls(&self) -> Vec<(String, Instant)> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl CitySuggestionSource for RecordingSource {
        fn suggest(
            &self,
            query: &str,
        ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send {
            self.calls
                .lock()
                .expect("lock")
                .push((query.to_string(), Instant::now()));
            let result = if self.fail {
                Err(SearchError::UnexpectedStatus {
                    status: 503,
                    url: "http://geo.test/communes".to_string(),
                })
            } else {
                Ok(vec![format!("{query}-sur-Mer"), query.to_string()])
            };
            async move { result }
        }
    }

    async fn next_final_event(
        rx: &mut mpsc::UnboundedReceiver<SuggestionEvent>,
    ) -> SuggestionEvent {
        loop {
            let event = rx.recv().await.expect("channel open");
            if !matches!(event, SuggestionEvent::Loading { .. }) {
                return event;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_keystrokes_fetches_once_after_quiet_period() {
        let source = Arc::new(RecordingSource::default());
        let (mut debouncer, mut rx) = SuggestionDebouncer::new(Arc::clone(&source));

        let mut last_keystroke = Instant::now();
        for text in ["Ly", "Lyo", "Lyon", "Lyon ", "Lyons"] {
            debouncer.on_input(text);
            last_keystroke = Instant::now();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let event = next_final_event(&mut rx).await;
        assert_eq!(
            event,
            SuggestionEvent::Suggestions {
                query: "Lyons".to_string(),
                cities: vec!["Lyons-sur-Mer".to_string(), "Lyons".to_string()],
            }
        );

        let calls = source.calls();
        assert_eq!(calls.len(), 1, "exactly one fetch expected");
        let waited = calls[0].1.duration_since(last_keystroke);
        assert!(
            waited >= DEFAULT_DEBOUNCE && waited < DEFAULT_DEBOUNCE + Duration::from_millis(10),
            "fetch should happen 250ms after the last keystroke, waited {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_keystrokes_fetch_each_time() {
        let source = Arc::new(RecordingSource::default());
        let (mut debouncer, mut rx) = SuggestionDebouncer::new(Arc::clone(&source));

        debouncer.on_input("Al");
        next_final_event(&mut rx).await;
        debouncer.on_input("Alès");
        next_final_event(&mut rx).await;

        let queries: Vec<String> = source.calls().into_iter().map(|(q, _)| q).collect();
        assert_eq!(queries, vec!["Al", "Alès"]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_clears_and_cancels_pending_lookup() {
        let source = Arc::new(RecordingSource::default());
        let (mut debouncer, mut rx) = SuggestionDebouncer::new(Arc::clone(&source));

        debouncer.on_input("Foix");
        assert!(debouncer.is_pending());
        debouncer.on_input("F");
        assert!(!debouncer.is_pending());

        assert_eq!(next_final_event(&mut rx).await, SuggestionEvent::Cleared);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(source.calls().is_empty(), "cancelled lookup must not run");
    }

    #[tokio::test(start_paused = true)]
    async fn minimum_length_counts_characters_not_bytes() {
        let source = Arc::new(RecordingSource::default());
        let (mut debouncer, mut rx) = SuggestionDebouncer::new(Arc::clone(&source));

        // One character, two bytes.
        debouncer.on_input("É");
        assert_eq!(next_final_event(&mut rx).await, SuggestionEvent::Cleared);
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_is_reported() {
        let source = Arc::new(RecordingSource {
            fail: true,
            ..RecordingSource::default()
        });
        let (mut debouncer, mut rx) = SuggestionDebouncer::new(Arc::clone(&source));

        debouncer.on_input("Nîmes");
        match next_final_event(&mut rx).await {
            SuggestionEvent::Failed { query, error } => {
                assert_eq!(query, "Nîmes");
                assert!(error.contains("503"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_debouncer_aborts_lookup() {
        let source = Arc::new(RecordingSource::default());
        let (mut debouncer, _rx) = SuggestionDebouncer::new(Arc::clone(&source));

        debouncer.on_input("Pau");
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(source.calls().is_empty());
    }
}
