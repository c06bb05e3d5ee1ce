use crate::models::audio_models::{AudioEndpoint, StreamFormat};
use crate::models::error::CaptureError;

/// One captured packet, borrowed from the session for the duration of a
/// `read_packet` call.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    /// Interleaved f32 samples, `frames * channels` long. Empty when silent.
    pub samples: &'a [f32],
    pub frames: u32,
    pub channels: u16,
    /// The device flagged this packet as carrying no audible signal.
    pub silent: bool,
}

/// Factory for loopback capture sessions on the default render endpoint.
///
/// Implemented by:
/// - `WasapiLoopbackProvider` (Windows)
pub trait LoopbackProvider: Send + Sync + 'static {
    /// Open a capture session. Called on the capture thread, so the session
    /// may hold thread-confined handles.
    ///
    /// Any failure is a session init error: partially acquired resources
    /// must already be released when this returns `Err`.
    fn open(&self) -> Result<Box<dyn LoopbackSession>, CaptureError>;

    /// Information about the endpoint this provider captures from.
    fn device_info(&self) -> AudioEndpoint;
}

/// An open, started loopback stream.
///
/// Dropping the session stops the stream and releases its resources in
/// reverse-acquisition order.
pub trait LoopbackSession {
    /// The negotiated stream format.
    fn format(&self) -> StreamFormat;

    /// Frames in the next pending packet, or 0 if none is available.
    fn next_packet_frames(&mut self) -> Result<u32, CaptureError>;

    /// Acquire the next packet, pass it to `consume`, then release it.
    fn read_packet(&mut self, consume: &mut dyn FnMut(&Packet<'_>)) -> Result<(), CaptureError>;
}
