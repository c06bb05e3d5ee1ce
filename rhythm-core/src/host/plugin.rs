//! Command surface exposed to the embedding application.
//!
//! The host marshals method calls on [`METHOD_CHANNEL`] into
//! [`RhythmPlugin::handle_method_call`] and forwards every frame pushed to
//! the registered listener over [`EVENT_CHANNEL`].

use std::sync::Arc;

use crate::models::band_frame::BandFrame;
use crate::models::error::CaptureError;
use crate::session::analyzer::LoopbackAnalyzer;
use crate::traits::band_sink::BandSink;
use crate::traits::loopback_source::LoopbackProvider;

pub const METHOD_CHANNEL: &str = "com.cyrene.music/rhythm_method";
pub const EVENT_CHANNEL: &str = "com.cyrene.music/rhythm_event";

/// Reply to a method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodResponse {
    Success(bool),
    NotImplemented,
}

pub struct RhythmPlugin<P: LoopbackProvider> {
    analyzer: LoopbackAnalyzer<P>,
}

impl<P: LoopbackProvider> RhythmPlugin<P> {
    pub fn new(analyzer: LoopbackAnalyzer<P>) -> Self {
        Self { analyzer }
    }

    /// Dispatch a named command.
    ///
    /// `start` reports success as soon as the capture thread exists; session
    /// failures surface through the listener's error callback instead.
    pub fn handle_method_call(&self, method: &str) -> MethodResponse {
        match method {
            "start" => MethodResponse::Success(self.analyzer.start()),
            "stop" => MethodResponse::Success(self.analyzer.stop()),
            other => {
                log::debug!("Unhandled method call on {}: {}", METHOD_CHANNEL, other);
                MethodResponse::NotImplemented
            }
        }
    }

    /// Register the event listener, replacing any previous one.
    pub fn listen(&self, sink: Arc<dyn BandSink>) {
        self.analyzer.set_sink(sink);
    }

    pub fn cancel(&self) {
        self.analyzer.clear_sink();
    }

    pub fn analyzer(&self) -> &LoopbackAnalyzer<P> {
        &self.analyzer
    }
}

/// Listener that encodes each frame as a JSON array and hands the text to
/// the host's event channel.
pub struct JsonEventSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    emit: F,
}

impl<F> JsonEventSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    pub fn new(emit: F) -> Self {
        Self { emit }
    }
}

impl<F> BandSink for JsonEventSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn on_bands(&self, frame: &BandFrame) {
        match serde_json::to_string(frame) {
            Ok(payload) => (self.emit)(&payload),
            Err(e) => log::warn!("Failed to encode band frame: {}", e),
        }
    }

    fn on_capture_error(&self, error: &CaptureError) {
        log::warn!("{} listener notified of capture failure: {}", EVENT_CHANNEL, error);
    }
}
