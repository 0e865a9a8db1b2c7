use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snapsig_models::{NotifierConfig, NotifierKind, Signal, SignalReading};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::NotifyError;

const POPUP_TITLE: &str = "AI Signal";

/// A short-lived indicator for one analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub signal: Signal,
    /// e.g. `UP — 2 min`
    pub label: String,
    /// Background colour as `#rrggbb`.
    pub color: &'static str,
    pub display_for: Duration,
}

impl Popup {
    pub fn for_reading(reading: &SignalReading, display_for: Duration) -> Self {
        Self {
            signal: reading.signal,
            label: reading.label(),
            color: signal_color(reading.signal),
            display_for,
        }
    }

    /// Notification text. Desktop notifications have no background colour,
    /// so a coloured marker stands in for it.
    pub fn body(&self) -> String {
        format!("{} {}", color_marker(self.signal), self.label)
    }
}

pub fn signal_color(signal: Signal) -> &'static str {
    match signal {
        Signal::Up => "#2ecc71",
        Signal::Down => "#e74c3c",
        Signal::Wait => "#f1c40f",
        Signal::Unknown => "#bdc3c7",
    }
}

/// Emoji circle in the same colour as `signal_color`.
fn color_marker(signal: Signal) -> &'static str {
    match signal {
        Signal::Up => "🟢",
        Signal::Down => "🔴",
        Signal::Wait => "🟡",
        Signal::Unknown => "⚪",
    }
}

/// freedesktop icon name for the notification.
fn signal_icon(signal: Signal) -> &'static str {
    match signal {
        Signal::Up => "go-up",
        Signal::Down => "go-down",
        Signal::Wait => "media-playback-pause",
        Signal::Unknown => "dialog-question",
    }
}

/// Renders a popup. Returns once it is shown; dismissal happens on its own
/// timer. Mockable for testing.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, popup: &Popup) -> Result<(), NotifyError>;
}

/// Run `dismiss` after `delay` unless `cancel` fires first.
///
/// Resolves to `true` if the dismissal ran. Each popup gets its own task, so
/// overlapping popups never wait on each other.
pub fn schedule_dismiss<F>(delay: Duration, cancel: CancellationToken, dismiss: F) -> JoinHandle<bool>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => {
                dismiss();
                true
            }
        }
    })
}

/// Native desktop notification.
pub struct DesktopNotifier {
    cancel: CancellationToken,
}

impl DesktopNotifier {
    /// Pending dismissals are abandoned when `cancel` fires.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, popup: &Popup) -> Result<(), NotifyError> {
        let body = popup.body();
        let icon = signal_icon(popup.signal);
        let timeout_ms = u32::try_from(popup.display_for.as_millis()).unwrap_or(u32::MAX);

        let shown = tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname("snapsig")
                .summary(POPUP_TITLE)
                .body(&body)
                .icon(icon)
                .timeout(notify_rust::Timeout::Milliseconds(timeout_ms))
                .show()
        })
        .await
        .map_err(|e| NotifyError::Task(e.to_string()))?
        .map_err(|e| NotifyError::Display(e.to_string()))?;

        // Servers are free to ignore the expiry hint, so close it ourselves.
        #[cfg(all(unix, not(target_os = "macos")))]
        schedule_dismiss(popup.display_for, self.cancel.child_token(), move || shown.close());

        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            let _ = shown;
            let _ = &self.cancel;
        }

        debug!(label = %popup.label, "Desktop popup shown");
        Ok(())
    }
}

/// Headless notifier: the popup is a log line, dismissal a debug line.
pub struct LogNotifier {
    cancel: CancellationToken,
}

impl LogNotifier {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, popup: &Popup) -> Result<(), NotifyError> {
        info!(signal = %popup.signal, label = %popup.label, color = popup.color, "Popup shown");
        let label = popup.label.clone();
        schedule_dismiss(popup.display_for, self.cancel.child_token(), move || {
            debug!(label = %label, "Popup dismissed");
        });
        Ok(())
    }
}

pub fn build_notifier(config: &NotifierConfig, cancel: CancellationToken) -> Arc<dyn Notifier> {
    match config.kind {
        NotifierKind::Desktop => Arc::new(DesktopNotifier::new(cancel)),
        NotifierKind::Log => Arc::new(LogNotifier::new(cancel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapsig_models::HoldMinutes;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn popup_for_reading() {
        let reading = SignalReading {
            signal: Signal::Down,
            minutes: HoldMinutes::new(1),
        };
        let popup = Popup::for_reading(&reading, Duration::from_secs(4));
        assert_eq!(popup.label, "DOWN — 1 min");
        assert_eq!(popup.color, "#e74c3c");
        assert_eq!(popup.display_for, Duration::from_secs(4));
    }

    #[test]
    fn body_carries_colour_marker() {
        let up = SignalReading {
            signal: Signal::Up,
            minutes: HoldMinutes::new(2),
        };
        let popup = Popup::for_reading(&up, Duration::from_secs(4));
        assert_eq!(popup.body(), "🟢 UP — 2 min");

        let wait = SignalReading {
            signal: Signal::Wait,
            minutes: None,
        };
        assert_eq!(Popup::for_reading(&wait, Duration::ZERO).body(), "🟡 WAIT");
        let unknown = Popup::for_reading(&SignalReading::default(), Duration::ZERO);
        assert_eq!(unknown.body(), "⚪ UNKNOWN");
    }

    #[test]
    fn unknown_signal_is_grey() {
        let popup = Popup::for_reading(&SignalReading::default(), Duration::ZERO);
        assert_eq!(popup.label, "UNKNOWN");
        assert_eq!(popup.color, "#bdc3c7");
    }

    #[tokio::test]
    async fn dismiss_runs_after_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let handle = schedule_dismiss(
            Duration::from_millis(20),
            CancellationToken::new(),
            move || flag.store(true, Ordering::SeqCst),
        );
        assert!(handle.await.unwrap());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancelled_dismiss_never_runs() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let cancel = CancellationToken::new();
        let handle = schedule_dismiss(Duration::from_secs(60), cancel.clone(), move || {
            flag.store(true, Ordering::SeqCst)
        });
        cancel.cancel();
        assert!(!handle.await.unwrap());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn overlapping_popups_dismiss_independently() {
        let cancel = CancellationToken::new();
        let handles: Vec<_> = (0..5)
            .map(|i| schedule_dismiss(Duration::from_millis(10 * (5 - i)), cancel.clone(), || {}))
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        let notifier = LogNotifier::new(CancellationToken::new());
        let popup = Popup::for_reading(&SignalReading::default(), Duration::from_millis(5));
        notifier.notify(&popup).await.unwrap();
    }
}
