use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::models::config::AnalyzerConfig;
use crate::models::error::CaptureError;
use crate::processing::accumulator::WindowAccumulator;
use crate::processing::downmix::downmix_into;
use crate::processing::spectrum::SpectrumProcessor;
use crate::traits::loopback_source::{LoopbackProvider, LoopbackSession, Packet};

use super::shared::SharedState;

/// Per-session packet pipeline: downmix → accumulate → transform → store.
///
/// Every completed window overwrites the shared band buffer, so when one
/// drain completes several windows only the last result is ever published.
pub(crate) struct PacketProcessor {
    accumulator: WindowAccumulator,
    spectrum: SpectrumProcessor,
    mono: Vec<f32>,
    bands: Vec<f32>,
}

impl PacketProcessor {
    pub(crate) fn new(config: &AnalyzerConfig) -> Self {
        Self {
            accumulator: WindowAccumulator::new(config.window_size),
            spectrum: SpectrumProcessor::new(config),
            mono: Vec::with_capacity(config.window_size),
            bands: vec![0.0; config.band_count],
        }
    }

    /// Consume one packet. Returns the number of windows transformed.
    pub(crate) fn consume(&mut self, packet: &Packet<'_>, shared: &SharedState) -> usize {
        if packet.silent {
            // Silent packets bypass the transform and zero the output.
            shared.clear_bands();
            shared.record_packet(true, 0, 0);
            return 0;
        }

        self.mono.clear();
        downmix_into(packet.samples, packet.channels as usize, &mut self.mono);

        let Self {
            accumulator,
            spectrum,
            mono,
            bands,
        } = self;
        let windows = accumulator.push(mono, |window| {
            spectrum.process(window, bands);
            shared.store_bands(bands);
        });

        shared.record_packet(false, mono.len(), windows);
        windows
    }

    pub(crate) fn pending(&self) -> usize {
        self.accumulator.pending()
    }
}

/// Drain every packet currently available from `session`.
pub(crate) fn drain_packets(
    session: &mut dyn LoopbackSession,
    processor: &mut PacketProcessor,
    shared: &SharedState,
) -> Result<(), CaptureError> {
    let mut frames = session.next_packet_frames()?;
    while frames > 0 {
        session.read_packet(&mut |packet: &Packet<'_>| {
            processor.consume(packet, shared);
        })?;
        frames = session.next_packet_frames()?;
    }
    Ok(())
}

/// Body of the capture thread for one session.
///
/// Opens the session, then loops drain → publish → sleep until `running`
/// is cleared. Returns early on the first session error. The session is
/// dropped (and its resources released) on every exit path.
pub(crate) fn run_capture<P: LoopbackProvider + ?Sized>(
    provider: &P,
    config: &AnalyzerConfig,
    shared: &SharedState,
    running: &AtomicBool,
) -> Result<(), CaptureError> {
    let mut session = provider.open()?;

    let format = session.format();
    if let Err(reason) = format.validate() {
        log::warn!("Rejecting loopback format {}: {}", format, reason);
        return Err(CaptureError::UnsupportedFormat(reason));
    }

    log::info!(
        "Loopback session opened on '{}': {} ({:.1} Hz per bin)",
        provider.device_info().name,
        format,
        format.bin_width_hz(config.window_size)
    );
    shared.begin_session(format);

    let mut processor = PacketProcessor::new(config);
    let interval = config.publish_interval();

    while running.load(Ordering::SeqCst) {
        drain_packets(session.as_mut(), &mut processor, shared)?;
        shared.publish();
        thread::sleep(interval);
    }

    log::info!("Loopback session closed");
    Ok(())
}
