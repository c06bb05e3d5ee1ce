use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::audio_models::{AnalyzerDiagnostics, AudioEndpoint};
use crate::models::band_frame::BandFrame;
use crate::models::config::AnalyzerConfig;
use crate::models::error::CaptureError;
use crate::models::state::AnalyzerState;
use crate::traits::band_sink::BandSink;
use crate::traits::loopback_source::LoopbackProvider;

use super::capture_loop::run_capture;
use super::shared::SharedState;

/// Real-time loopback spectrum analyzer.
///
/// Owns at most one capture thread at a time. The thread opens a session
/// from the provider, then repeatedly drains packets, transforms full
/// windows and publishes the latest band values to the registered sink:
/// ```text
/// [LoopbackSession] → downmix → [WindowAccumulator] → Hann → FFT → [BandMapper]
///                                                                      ↓
///                                  [BandSink] ← publish (every tick) ← band buffer
/// ```
pub struct LoopbackAnalyzer<P: LoopbackProvider> {
    provider: Arc<P>,
    config: AnalyzerConfig,
    shared: Arc<SharedState>,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<P: LoopbackProvider> LoopbackAnalyzer<P> {
    pub fn new(provider: P, config: AnalyzerConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            provider: Arc::new(provider),
            shared: Arc::new(SharedState::new(config.band_count)),
            config,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        })
    }

    /// Spawn the capture thread unless one is already running.
    ///
    /// Returns `true` once the thread exists; whether the session then opens
    /// is reported through the sink, the log and `last_error`, never here.
    /// Returns `false` only if the thread could not be spawned.
    pub fn start(&self) -> bool {
        let mut handle_guard = self.capture_handle.lock();

        if self.running.load(Ordering::SeqCst) {
            return true;
        }

        // A previous session ended on its own; reap its thread first.
        if let Some(finished) = handle_guard.take() {
            join_capture_thread(finished);
        }

        self.running.store(true, Ordering::SeqCst);
        self.shared.set_state(AnalyzerState::Starting);

        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);
        let running = Arc::clone(&self.running);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name("rhythm-capture".into())
            .spawn(move || {
                let result = run_capture(provider.as_ref(), &config, &shared, &running);
                if let Err(e) = &result {
                    shared.store_error(e);
                }
                running.store(false, Ordering::SeqCst);
                // stop() owns the transition out of Stopping.
                shared.transition(|s| (s != AnalyzerState::Stopping).then_some(AnalyzerState::Idle));
                // The sink may restart from here, so the analyzer must already be idle.
                if let Err(e) = &result {
                    shared.notify_error(e);
                }
            });

        match spawned {
            Ok(handle) => {
                *handle_guard = Some(handle);
                true
            }
            Err(e) => {
                let error = CaptureError::ThreadSpawn(e.to_string());
                self.running.store(false, Ordering::SeqCst);
                self.shared.store_error(&error);
                self.shared.set_state(AnalyzerState::Idle);
                self.shared.notify_error(&error);
                false
            }
        }
    }

    /// Clear the running flag and block until the capture thread has exited.
    ///
    /// A no-op returning `true` when nothing is running. May block for one
    /// drain plus one publish interval. Called from a sink callback (that is,
    /// on the capture thread itself) it only clears the flag; the thread
    /// winds down and goes idle once the callback returns.
    pub fn stop(&self) -> bool {
        let mut handle_guard = self.capture_handle.lock();
        let Some(handle) = handle_guard.take() else {
            return true;
        };

        if is_current_thread(&handle) {
            self.running.store(false, Ordering::SeqCst);
            // The next start or stop joins it once it has gone idle.
            *handle_guard = Some(handle);
            return true;
        }

        // Stopping must be visible before the thread can observe the cleared flag.
        self.shared.transition(|s| {
            matches!(s, AnalyzerState::Starting | AnalyzerState::Running).then_some(AnalyzerState::Stopping)
        });
        self.running.store(false, Ordering::SeqCst);

        join_capture_thread(handle);

        self.shared.set_state(AnalyzerState::Idle);
        true
    }

    /// Register the sink for published frames, replacing any previous one.
    pub fn set_sink(&self, sink: Arc<dyn BandSink>) {
        self.shared.set_sink(Some(sink));
    }

    /// Remove the sink. Frames are still computed but dropped.
    pub fn clear_sink(&self) {
        self.shared.set_sink(None);
    }

    pub fn has_sink(&self) -> bool {
        self.shared.has_sink()
    }

    pub fn state(&self) -> AnalyzerState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the band buffer as it would be published now.
    pub fn current_bands(&self) -> BandFrame {
        self.shared.bands()
    }

    pub fn diagnostics(&self) -> AnalyzerDiagnostics {
        self.shared.diagnostics()
    }

    /// The failure that ended the most recent session, if any.
    pub fn last_error(&self) -> Option<CaptureError> {
        self.shared.last_error()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn device_info(&self) -> AudioEndpoint {
        self.provider.device_info()
    }
}

fn is_current_thread(handle: &thread::JoinHandle<()>) -> bool {
    handle.thread().id() == thread::current().id()
}

/// Join a capture thread, unless it is the calling thread, in which case it
/// is detached and exits on its own.
fn join_capture_thread(handle: thread::JoinHandle<()>) {
    if is_current_thread(&handle) {
        return;
    }
    if handle.join().is_err() {
        log::error!("Capture thread panicked");
    }
}

impl<P: LoopbackProvider> Drop for LoopbackAnalyzer<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
