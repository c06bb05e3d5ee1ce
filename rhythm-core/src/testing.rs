//! Scripted loopback source and recording sink for exercising the capture
//! loop without audio hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::audio_models::{AudioEndpoint, StreamFormat};
use crate::models::band_frame::BandFrame;
use crate::models::error::CaptureError;
use crate::models::state::AnalyzerState;
use crate::traits::band_sink::BandSink;
use crate::traits::loopback_source::{LoopbackProvider, LoopbackSession, Packet};

/// One scripted step inside a drain.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Packet { samples: Vec<f32>, silent: bool },
    PollError,
    GetBufferError,
}

impl Step {
    pub(crate) fn audio(samples: Vec<f32>) -> Self {
        Self::Packet { samples, silent: false }
    }

    pub(crate) fn silent() -> Self {
        Self::Packet {
            samples: Vec::new(),
            silent: true,
        }
    }
}

/// Provider whose sessions replay a list of drains, one per loop iteration.
pub(crate) struct ScriptedProvider {
    format: StreamFormat,
    drains: Arc<Mutex<VecDeque<Vec<Step>>>>,
    open_error: Mutex<Option<CaptureError>>,
    pub(crate) opens: Arc<AtomicUsize>,
    pub(crate) closes: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub(crate) fn new(format: StreamFormat) -> Self {
        Self {
            format,
            drains: Arc::new(Mutex::new(VecDeque::new())),
            open_error: Mutex::new(None),
            opens: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_drains(self, drains: Vec<Vec<Step>>) -> Self {
        self.drains.lock().extend(drains);
        self
    }

    /// The next `open` fails with `error`; later opens succeed.
    pub(crate) fn fail_next_open(&self, error: CaptureError) {
        *self.open_error.lock() = Some(error);
    }

    pub(crate) fn push_drain(&self, steps: Vec<Step>) {
        self.drains.lock().push_back(steps);
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl LoopbackProvider for ScriptedProvider {
    fn open(&self) -> Result<Box<dyn LoopbackSession>, CaptureError> {
        if let Some(error) = self.open_error.lock().take() {
            return Err(error);
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            format: self.format,
            drains: Arc::clone(&self.drains),
            current: VecDeque::new(),
            in_drain: false,
            closes: Arc::clone(&self.closes),
        }))
    }

    fn device_info(&self) -> AudioEndpoint {
        AudioEndpoint {
            id: "scripted".into(),
            name: "Scripted Loopback".into(),
            is_default: true,
        }
    }
}

struct ScriptedSession {
    format: StreamFormat,
    drains: Arc<Mutex<VecDeque<Vec<Step>>>>,
    current: VecDeque<Step>,
    in_drain: bool,
    closes: Arc<AtomicUsize>,
}

impl ScriptedSession {
    fn frames_of(&self, step: &Step) -> Result<u32, CaptureError> {
        match step {
            Step::Packet { samples, silent } => {
                if *silent {
                    Ok(480)
                } else {
                    Ok((samples.len() / self.format.channels as usize) as u32)
                }
            }
            Step::PollError => Err(CaptureError::packet("get_next_packet_size", "scripted failure")),
            Step::GetBufferError => Ok(1),
        }
    }
}

impl LoopbackSession for ScriptedSession {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn next_packet_frames(&mut self) -> Result<u32, CaptureError> {
        if let Some(step) = self.current.front() {
            return self.frames_of(step);
        }
        if self.in_drain {
            self.in_drain = false;
            return Ok(0);
        }
        match self.drains.lock().pop_front() {
            Some(steps) if !steps.is_empty() => {
                self.current = steps.into();
                self.in_drain = true;
                let front = self.current.front().cloned();
                match front {
                    Some(step) => self.frames_of(&step),
                    None => Ok(0),
                }
            }
            _ => Ok(0),
        }
    }

    fn read_packet(&mut self, consume: &mut dyn FnMut(&Packet<'_>)) -> Result<(), CaptureError> {
        let Some(step) = self.current.pop_front() else {
            return Err(CaptureError::packet("get_buffer", "no packet pending"));
        };
        match step {
            Step::Packet { samples, silent } => {
                let channels = self.format.channels;
                let frames = if silent { 480 } else { (samples.len() / channels as usize) as u32 };
                consume(&Packet {
                    samples: &samples,
                    frames,
                    channels,
                    silent,
                });
                Ok(())
            }
            Step::GetBufferError => Err(CaptureError::packet("get_buffer", "scripted failure")),
            Step::PollError => Err(CaptureError::packet("get_next_packet_size", "scripted failure")),
        }
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink that records everything it receives.
#[derive(Default)]
pub(crate) struct RecordingSink {
    frames: Mutex<Vec<BandFrame>>,
    errors: Mutex<Vec<CaptureError>>,
    states: Mutex<Vec<AnalyzerState>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn frames(&self) -> Vec<BandFrame> {
        self.frames.lock().clone()
    }

    pub(crate) fn errors(&self) -> Vec<CaptureError> {
        self.errors.lock().clone()
    }

    pub(crate) fn states(&self) -> Vec<AnalyzerState> {
        self.states.lock().clone()
    }
}

impl BandSink for RecordingSink {
    fn on_bands(&self, frame: &BandFrame) {
        self.frames.lock().push(frame.clone());
    }

    fn on_capture_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }

    fn on_state_changed(&self, state: AnalyzerState) {
        self.states.lock().push(state);
    }
}

/// Interleaved stereo sine, identical on both channels.
pub(crate) fn stereo_sine(freq_hz: f32, sample_rate: f32, frames: usize, amplitude: f32) -> Vec<f32> {
    (0..frames)
        .flat_map(|i| {
            let s = amplitude * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate).sin();
            [s, s]
        })
        .collect()
}

/// Poll `cond` until it holds or `timeout` elapses.
pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}
