use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use snapsig_journal::JournalWriter;
use snapsig_models::{AnalysisRecord, OutputConfig};
use snapsig_vision::{parse_signal, VisionModel};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use crate::capture::{encode_png, ScreenCapture};
use crate::error::{CycleError, HotkeyError};
use crate::notifier::{Notifier, Popup};

/// Runs capture → vision → parse → notify → journal for each trigger.
pub struct Analyzer {
    capture: Arc<dyn ScreenCapture>,
    vision: Arc<dyn VisionModel>,
    notifier: Arc<dyn Notifier>,
    journal: Arc<JournalWriter>,
    output: OutputConfig,
    display_for: Duration,
}

impl Analyzer {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        vision: Arc<dyn VisionModel>,
        notifier: Arc<dyn Notifier>,
        journal: Arc<JournalWriter>,
        output: OutputConfig,
        display_for: Duration,
    ) -> Self {
        Self {
            capture,
            vision,
            notifier,
            journal,
            output,
            display_for,
        }
    }

    /// One full cycle. Capture and vision failures abort before anything is
    /// journaled; a notifier failure does not.
    pub async fn run_cycle(&self) -> Result<AnalysisRecord, CycleError> {
        let capture = Arc::clone(&self.capture);
        let png = tokio::task::spawn_blocking(move || {
            capture.capture().and_then(|img| encode_png(&img))
        })
        .await
        .map_err(|e| CycleError::Task(e.to_string()))??;

        let id = cycle_id(&self.output.image_prefix, Local::now());
        let dir = self.output.dir.clone();
        let (png, image_path) = tokio::task::spawn_blocking(move || {
            persist_image(&dir, &id, &png).map(|path| (png, path))
        })
        .await
        .map_err(|e| CycleError::Task(e.to_string()))??;
        info!(image = %image_path.display(), bytes = png.len(), "Screenshot saved");

        self.analyze_png(&png, &image_path).await
    }

    /// The part of a cycle after the image exists on disk: ask the model, parse,
    /// show the popup, append the record.
    pub async fn analyze_png(
        &self,
        png: &[u8],
        image_path: &Path,
    ) -> Result<AnalysisRecord, CycleError> {
        let reply = self.vision.analyze(png).await?;
        let reading = parse_signal(&reply);
        info!(
            signal = %reading.signal,
            minutes = ?reading.minutes.map(|m| m.get()),
            reply = %reply,
            "Model replied"
        );

        let popup = Popup::for_reading(&reading, self.display_for);
        if let Err(e) = self.notifier.notify(&popup).await {
            warn!(error = %e, "Popup failed; journaling anyway");
        }

        let record = AnalysisRecord::new(
            Local::now(),
            image_path.display().to_string(),
            reading,
            reply,
        );
        let journal = Arc::clone(&self.journal);
        let line = record.clone();
        tokio::task::spawn_blocking(move || journal.append(&line))
            .await
            .map_err(|e| CycleError::Task(e.to_string()))??;
        Ok(record)
    }

    /// Run a cycle on its own task. The handle may be dropped; failures are
    /// logged rather than lost.
    pub fn spawn_cycle(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let span = info_span!("cycle", started = %Local::now().format("%H:%M:%S%.3f"));
        tokio::spawn(
            async move {
                match this.run_cycle().await {
                    Ok(record) => {
                        let label = record.reading().label();
                        info!(label = %label, image = %record.image, "Cycle complete");
                    }
                    Err(e) => error!(error = %e, "Cycle aborted"),
                }
            }
            .instrument(span),
        )
    }

    /// Spawn a detached cycle per trigger until cancelled. Returns the number
    /// of cycles started, or `ListenerStopped` if the trigger source goes away.
    pub async fn serve(
        self: &Arc<Self>,
        mut triggers: UnboundedReceiver<()>,
        cancel: CancellationToken,
    ) -> Result<usize, HotkeyError> {
        let mut started = 0;
        loop {
            tokio::select! {
                biased;
                trigger = triggers.recv() => match trigger {
                    Some(()) => {
                        self.spawn_cycle();
                        started += 1;
                    }
                    None => return Err(HotkeyError::ListenerStopped),
                },
                _ = cancel.cancelled() => {
                    info!(cycles = started, "Listener shutting down");
                    return Ok(started);
                }
            }
        }
    }
}

/// `<prefix>_<YYYYmmdd_HHMMSS>`
pub fn cycle_id(prefix: &str, at: DateTime<Local>) -> String {
    format!("{prefix}_{}", at.format("%Y%m%d_%H%M%S"))
}

/// Write the PNG as `<dir>/<id>.png` without ever replacing an existing file.
/// A second cycle within the same second gets `<id>_1.png`, then `_2`, ...
pub fn persist_image(dir: &Path, id: &str, png: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => format!("{id}.png"),
            n => format!("{id}_{n}.png"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(png)?;
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
