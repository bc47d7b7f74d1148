//! The polling loop.
//!
//! One immediate poll, then one per interval tick. Fetches never overlap:
//! the next tick is awaited only after the previous sequence finished, and
//! ticks missed during a slow fetch are delayed rather than bunched up.

use crate::cli::OutputFormat;
use crate::models::{MonitorSummary, Observation};
use crate::monitor::tracker::ViewTracker;
use crate::notify::Notifier;
use crate::report::{render_json, render_text};
use crate::youtube::{FetchError, StatsSource};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Loop settings.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Time between the start of consecutive polls.
    pub interval: Duration,
    /// Stop after this many successful polls.
    pub max_polls: Option<u64>,
    /// How each observation is written.
    pub format: OutputFormat,
    /// Show a spinner on stderr while fetching.
    pub show_spinner: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_polls: None,
            format: OutputFormat::Text,
            show_spinner: false,
        }
    }
}

/// Why monitoring halted.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("{0}")]
    Render(String),
}

/// Clears the fetch spinner when dropped, so an abandoned fetch leaves no
/// stale spinner line behind.
struct SpinnerGuard(ProgressBar);

impl Drop for SpinnerGuard {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Polls a [`StatsSource`], rings a [`Notifier`] on growth and writes one
/// line per poll to `out`.
pub struct Monitor<S, N, W> {
    source: S,
    notifier: N,
    out: W,
    settings: MonitorSettings,
    tracker: ViewTracker,
    summary: MonitorSummary,
}

impl<S, N, W> Monitor<S, N, W>
where
    S: StatsSource,
    N: Notifier,
    W: Write,
{
    pub fn new(source: S, notifier: N, out: W, settings: MonitorSettings) -> Self {
        Self {
            source,
            notifier,
            out,
            settings,
            tracker: ViewTracker::new(),
            summary: MonitorSummary::default(),
        }
    }

    /// Poll until `shutdown` resolves, `max_polls` is reached, or a poll fails.
    ///
    /// A stop request also abandons an in-flight fetch. The first error is
    /// returned as-is and nothing further is polled.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<MonitorSummary, MonitorError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Polling every {}s{}",
            self.settings.interval.as_secs_f64(),
            self.settings
                .max_polls
                .map(|n| format!(" (at most {} polls)", n))
                .unwrap_or_default()
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Stop requested, ending monitoring");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Stop requested during fetch, ending monitoring");
                    break;
                }
                result = self.poll_once() => result,
            };

            if let Err(e) = result {
                debug!("Polling halted after {} polls", self.summary.polls);
                return Err(e);
            }

            if let Some(max) = self.settings.max_polls {
                if self.summary.polls >= max {
                    debug!("Reached {} polls", max);
                    break;
                }
            }
        }

        Ok(self.summary.clone())
    }

    /// Run one fetch sequence and handle its result.
    async fn poll_once(&mut self) -> Result<Observation, MonitorError> {
        let spinner = self.start_spinner();
        let fetched = self.source.fetch_stats().await;
        drop(spinner);

        let stats = fetched?;
        let observation = self.tracker.observe(stats);

        self.summary.polls += 1;
        self.summary.last_stats = Some(stats);

        if observation.increased {
            self.summary.increases += 1;
            if let Some(prev) = observation.previous_total {
                self.notifier.notify(prev, stats.total_views);
            }
        }

        info!(
            "Poll {}: {} views across {} videos{}",
            self.summary.polls,
            stats.total_views,
            stats.video_count,
            if observation.increased { " (increased)" } else { "" }
        );

        self.emit(&observation)?;
        Ok(observation)
    }

    fn emit(&mut self, observation: &Observation) -> Result<(), MonitorError> {
        let line = match self.settings.format {
            OutputFormat::Text => render_text(observation),
            OutputFormat::Json => {
                render_json(observation).map_err(|e| MonitorError::Render(e.to_string()))?
            }
        };

        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }

    fn start_spinner(&self) -> Option<SpinnerGuard> {
        if !self.settings.show_spinner {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Fetching channel statistics...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(SpinnerGuard(pb))
    }

    #[allow(dead_code)] // Used by tests to inspect rendered output
    pub fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelStats;
    use crate::youtube::fetcher::tests::healthy_transport;
    use crate::youtube::StatsFetcher;
    use futures::future::{self, BoxFuture, FutureExt};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Source replaying a fixed script of results.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<ChannelStats, FetchError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<ChannelStats, FetchError>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                script: Mutex::new(script.into()),
                calls: calls.clone(),
            };
            (source, calls)
        }

        fn totals(totals: &[u64]) -> (Self, Arc<AtomicUsize>) {
            Self::new(totals.iter().map(|&t| Ok(stats(t))).collect())
        }
    }

    impl StatsSource for ScriptedSource {
        fn fetch_stats(&self) -> BoxFuture<'_, Result<ChannelStats, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::NoUploads));
            future::ready(next).boxed()
        }
    }

    #[derive(Default, Clone)]
    struct RecordingNotifier {
        rings: Arc<Mutex<Vec<(u64, u64)>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, previous: u64, current: u64) {
            self.rings.lock().unwrap().push((previous, current));
        }
    }

    fn stats(total_views: u64) -> ChannelStats {
        ChannelStats {
            total_views,
            video_count: 4,
        }
    }

    fn settings(max_polls: Option<u64>) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_millis(1),
            max_polls,
            ..MonitorSettings::default()
        }
    }

    fn output_text<S, N>(monitor: &Monitor<S, N, Vec<u8>>) -> String {
        String::from_utf8(monitor.out.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_bell_only_on_increase() {
        let (source, calls) = ScriptedSource::totals(&[100, 100, 150, 140, 200]);
        let notifier = RecordingNotifier::default();
        let rings = notifier.rings.clone();

        let mut monitor = Monitor::new(source, notifier, Vec::new(), settings(Some(5)));
        let summary = monitor.run_until(future::pending()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(summary.polls, 5);
        assert_eq!(summary.increases, 2);
        assert_eq!(summary.last_stats, Some(stats(200)));
        assert_eq!(*rings.lock().unwrap(), vec![(100, 150), (140, 200)]);
        assert_eq!(output_text(&monitor).lines().count(), 5);
    }

    #[tokio::test]
    async fn test_polling_stops_on_http_error() {
        let (source, calls) = ScriptedSource::new(vec![
            Ok(stats(100)),
            Err(FetchError::VideoStats {
                status: 500,
                detail: "backendError".to_string(),
            }),
            Ok(stats(200)),
        ]);
        let notifier = RecordingNotifier::default();
        let rings = notifier.rings.clone();

        let mut monitor = Monitor::new(source, notifier, Vec::new(), settings(None));
        let err = monitor.run_until(future::pending()).await.unwrap_err();

        assert!(matches!(
            err,
            MonitorError::Fetch(FetchError::VideoStats { status: 500, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(rings.lock().unwrap().is_empty());
        assert_eq!(output_text(&monitor).lines().count(), 1);
    }

    #[tokio::test]
    async fn test_error_on_first_poll() {
        let (source, calls) = ScriptedSource::new(vec![Err(FetchError::ChannelNotFound(
            "UCnope".to_string(),
        ))]);
        let mut monitor = Monitor::new(source, RecordingNotifier::default(), Vec::new(), settings(None));

        let err = monitor.run_until(future::pending()).await.unwrap_err();
        assert_eq!(err.to_string(), "Channel UCnope does not exist");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(monitor.output().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_before_first_poll() {
        let (source, calls) = ScriptedSource::totals(&[1, 2, 3]);
        let mut monitor = Monitor::new(source, RecordingNotifier::default(), Vec::new(), settings(None));

        let summary = monitor.run_until(future::ready(())).await.unwrap();
        assert_eq!(summary.polls, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_poll_is_immediate() {
        let (source, calls) = ScriptedSource::totals(&[42]);
        let mut monitor = Monitor::new(
            source,
            RecordingNotifier::default(),
            Vec::new(),
            MonitorSettings {
                interval: Duration::from_secs(3600),
                max_polls: Some(1),
                ..MonitorSettings::default()
            },
        );

        let summary = tokio::time::timeout(
            Duration::from_secs(5),
            monitor.run_until(future::pending()),
        )
        .await
        .expect("first poll should not wait for the interval")
        .unwrap();

        assert_eq!(summary.polls, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_json_lines_output() {
        let (source, _) = ScriptedSource::totals(&[10, 25]);
        let mut monitor = Monitor::new(
            source,
            RecordingNotifier::default(),
            Vec::new(),
            MonitorSettings {
                format: OutputFormat::Json,
                ..settings(Some(2))
            },
        );
        monitor.run_until(future::pending()).await.unwrap();

        let text = output_text(&monitor);
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["increased"], false);
        assert_eq!(lines[1]["total_views"], 25);
        assert_eq!(lines[1]["previous_total"], 10);
        assert_eq!(lines[1]["increased"], true);
    }

    #[tokio::test]
    async fn test_end_to_end_with_fetcher() {
        let fetcher = StatsFetcher::new(healthy_transport(), "UCabc", "key", 50);
        let mut monitor = Monitor::new(fetcher, RecordingNotifier::default(), Vec::new(), settings(Some(2)));

        let summary = monitor.run_until(future::pending()).await.unwrap();

        assert_eq!(summary.polls, 2);
        assert_eq!(summary.increases, 0);
        let text = output_text(&monitor);
        assert!(text.contains("Total views: 2,637"));
        assert!(text.contains("Videos: 3"));
    }

    /// Source whose fetches take the scripted delays (then return at once);
    /// records when each fetch starts.
    struct SlowSource {
        delays: Mutex<VecDeque<Duration>>,
        starts: Arc<Mutex<Vec<Instant>>>,
    }

    impl SlowSource {
        fn new(delays: &[Duration]) -> (Self, Arc<Mutex<Vec<Instant>>>) {
            let starts = Arc::new(Mutex::new(Vec::new()));
            let source = Self {
                delays: Mutex::new(delays.iter().copied().collect()),
                starts: starts.clone(),
            };
            (source, starts)
        }
    }

    impl StatsSource for SlowSource {
        fn fetch_stats(&self) -> BoxFuture<'_, Result<ChannelStats, FetchError>> {
            self.starts.lock().unwrap().push(Instant::now());
            let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
            async move {
                tokio::time::sleep(delay).await;
                Ok(stats(10))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_slow_fetch_delays_ticks_instead_of_bursting() {
        // The first fetch overruns three ticks; the rest return immediately.
        let (source, starts) = SlowSource::new(&[Duration::from_millis(350)]);
        let mut monitor = Monitor::new(
            source,
            RecordingNotifier::default(),
            Vec::new(),
            MonitorSettings {
                interval: Duration::from_millis(100),
                ..settings(Some(4))
            },
        );

        let summary = monitor.run_until(future::pending()).await.unwrap();
        assert_eq!(summary.polls, 4);

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 4);

        let gaps: Vec<Duration> = starts.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps[0] >= Duration::from_millis(340), "gaps: {:?}", gaps);
        // Missed ticks are not replayed back-to-back after the slow fetch.
        for gap in &gaps[1..] {
            assert!(*gap >= Duration::from_millis(90), "gaps: {:?}", gaps);
        }
    }

    #[tokio::test]
    async fn test_shutdown_abandons_in_flight_fetch() {
        let (source, starts) = SlowSource::new(&[Duration::from_secs(30)]);
        let mut monitor = Monitor::new(
            source,
            RecordingNotifier::default(),
            Vec::new(),
            MonitorSettings {
                show_spinner: true,
                ..settings(None)
            },
        );

        let begun = Instant::now();
        let summary = tokio::time::timeout(
            Duration::from_secs(5),
            monitor.run_until(tokio::time::sleep(Duration::from_millis(50))),
        )
        .await
        .expect("stop request should not wait for the fetch")
        .unwrap();

        assert_eq!(summary.polls, 0);
        assert_eq!(starts.lock().unwrap().len(), 1);
        assert!(begun.elapsed() < Duration::from_secs(5));
        assert!(monitor.output().is_empty());
    }

    #[test]
    fn test_spinner_guard_clears_on_drop() {
        let pb = ProgressBar::hidden();
        let guard = SpinnerGuard(pb.clone());
        assert!(!pb.is_finished());

        drop(guard);
        assert!(pb.is_finished());
    }
}

