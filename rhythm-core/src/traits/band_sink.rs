use crate::models::band_frame::BandFrame;
use crate::models::error::CaptureError;
use crate::models::state::AnalyzerState;

/// Destination for published band frames.
///
/// At most one sink is registered at a time. All methods are called from
/// the capture thread (state changes also from the controlling thread) and
/// must not block for long. A callback may call `start` or `stop` on the
/// analyzer: from the capture thread `stop` does not wait for the thread
/// to exit, and a failed session is already idle when `on_capture_error`
/// runs, so `start` there opens a new one.
pub trait BandSink: Send + Sync {
    /// Called once per publish tick with the current band values.
    fn on_bands(&self, frame: &BandFrame);

    /// Called when a session ends because of a failure.
    fn on_capture_error(&self, _error: &CaptureError) {}

    /// Called when the analyzer changes lifecycle state.
    fn on_state_changed(&self, _state: AnalyzerState) {}
}
