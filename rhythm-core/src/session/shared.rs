use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AnalyzerDiagnostics, StreamFormat};
use crate::models::band_frame::BandFrame;
use crate::models::error::CaptureError;
use crate::models::state::AnalyzerState;
use crate::traits::band_sink::BandSink;

/// State shared between the controlling thread and the capture thread.
///
/// Every lock here is held only for a copy or an assignment; sinks are
/// always invoked after the relevant lock has been released.
pub(crate) struct SharedState {
    bands: Mutex<BandFrame>,
    sink: Mutex<Option<Arc<dyn BandSink>>>,
    state: Mutex<AnalyzerState>,
    diagnostics: Mutex<AnalyzerDiagnostics>,
    last_error: Mutex<Option<CaptureError>>,
}

impl SharedState {
    pub(crate) fn new(band_count: usize) -> Self {
        Self {
            bands: Mutex::new(BandFrame::silent(band_count)),
            sink: Mutex::new(None),
            state: Mutex::new(AnalyzerState::Idle),
            diagnostics: Mutex::new(AnalyzerDiagnostics::default()),
            last_error: Mutex::new(None),
        }
    }

    // --- band buffer ---

    pub(crate) fn store_bands(&self, values: &[f32]) {
        self.bands.lock().copy_from(values);
    }

    pub(crate) fn clear_bands(&self) {
        self.bands.lock().clear();
    }

    pub(crate) fn bands(&self) -> BandFrame {
        self.bands.lock().clone()
    }

    /// Deliver the current band values to the registered sink, if any.
    ///
    /// Returns whether a sink received the frame.
    pub(crate) fn publish(&self) -> bool {
        let frame = self.bands();
        let sink = self.sink.lock().clone();

        let delivered = match sink {
            Some(sink) => {
                sink.on_bands(&frame);
                true
            }
            None => false,
        };

        let mut d = self.diagnostics.lock();
        if delivered {
            d.frames_published += 1;
        } else {
            d.frames_without_subscriber += 1;
        }
        delivered
    }

    // --- subscriber slot ---

    pub(crate) fn set_sink(&self, sink: Option<Arc<dyn BandSink>>) {
        *self.sink.lock() = sink;
    }

    pub(crate) fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    // --- lifecycle ---

    pub(crate) fn state(&self) -> AnalyzerState {
        *self.state.lock()
    }

    pub(crate) fn set_state(&self, new_state: AnalyzerState) {
        self.transition(|_| Some(new_state));
    }

    /// Apply `next` to the current state under the lock. A `Some` result is
    /// stored and reported to the sink.
    pub(crate) fn transition(&self, next: impl FnOnce(AnalyzerState) -> Option<AnalyzerState>) -> bool {
        let changed = {
            let mut state = self.state.lock();
            match next(*state) {
                Some(new_state) if new_state != *state => {
                    log::debug!("Analyzer state {} -> {}", state.as_str(), new_state.as_str());
                    *state = new_state;
                    Some(new_state)
                }
                _ => None,
            }
        };

        match changed {
            Some(new_state) => {
                if let Some(sink) = self.sink.lock().clone() {
                    sink.on_state_changed(new_state);
                }
                true
            }
            None => false,
        }
    }

    /// A session opened successfully: reset counters, forget the last failure.
    pub(crate) fn begin_session(&self, format: StreamFormat) {
        *self.diagnostics.lock() = AnalyzerDiagnostics {
            format: Some(format),
            ..Default::default()
        };
        *self.last_error.lock() = None;
        self.transition(|s| (s == AnalyzerState::Starting).then_some(AnalyzerState::Running));
    }

    pub(crate) fn store_error(&self, error: &CaptureError) {
        log::error!("Loopback capture ended: {}", error);
        *self.last_error.lock() = Some(error.clone());
    }

    /// Report `error` to the sink. Call only once the lifecycle state
    /// already reflects the failure.
    pub(crate) fn notify_error(&self, error: &CaptureError) {
        if let Some(sink) = self.sink.lock().clone() {
            sink.on_capture_error(error);
        }
    }

    pub(crate) fn last_error(&self) -> Option<CaptureError> {
        self.last_error.lock().clone()
    }

    // --- diagnostics ---

    pub(crate) fn diagnostics(&self) -> AnalyzerDiagnostics {
        self.diagnostics.lock().clone()
    }

    pub(crate) fn record_packet(&self, silent: bool, samples: usize, windows: usize) {
        let mut d = self.diagnostics.lock();
        d.packets_read += 1;
        if silent {
            d.silent_packets += 1;
        }
        d.samples_accumulated += samples as u64;
        d.windows_transformed += windows as u64;
    }
}
