//! # rhythm-core
//!
//! Platform-agnostic core of the system-audio spectrum analyzer.
//!
//! Captures whatever the default output device is playing, folds it to mono,
//! transforms fixed 1024-sample windows and publishes 16 normalised band
//! energies to a single subscriber roughly every 16 ms. Platform backends
//! (Windows WASAPI) implement the `LoopbackProvider` trait and plug into the
//! generic `LoopbackAnalyzer`.
//!
//! ## Architecture
//!
//! ```text
//! rhythm-core (this crate)
//! ├── traits/       ← LoopbackProvider, LoopbackSession, BandSink
//! ├── models/       ← CaptureError, AnalyzerState, AnalyzerConfig, BandFrame, StreamFormat
//! ├── dsp/          ← Hann window, radix-2 FFT, band mapping
//! ├── processing/   ← downmix, WindowAccumulator, SpectrumProcessor
//! ├── session/      ← LoopbackAnalyzer (capture thread, coalescing publisher)
//! └── host/         ← RhythmPlugin command surface
//! ```

pub mod dsp;
pub mod host;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use host::plugin::{JsonEventSink, MethodResponse, RhythmPlugin, EVENT_CHANNEL, METHOD_CHANNEL};
pub use models::audio_models::{AnalyzerDiagnostics, AudioEndpoint, SampleFormat, StreamFormat};
pub use models::band_frame::BandFrame;
pub use models::config::AnalyzerConfig;
pub use models::error::CaptureError;
pub use models::state::AnalyzerState;
pub use processing::accumulator::WindowAccumulator;
pub use processing::spectrum::SpectrumProcessor;
pub use session::analyzer::LoopbackAnalyzer;
pub use traits::band_sink::BandSink;
pub use traits::loopback_source::{LoopbackProvider, LoopbackSession, Packet};
