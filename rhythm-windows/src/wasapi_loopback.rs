//! WASAPI loopback capture of the default render endpoint.
//!
//! Reads the mix going to the speakers using `AUDCLNT_STREAMFLAGS_LOOPBACK`.
//! No special permissions are needed; DRM-protected audio arrives silenced.

use windows::core::{w, GUID};
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::{CoTaskMemFree, CLSCTX_ALL};
use windows::Win32::System::Threading::{AvRevertMmThreadCharacteristics, AvSetMmThreadCharacteristicsW};

use rhythm_core::models::audio_models::{AudioEndpoint, SampleFormat, StreamFormat};
use rhythm_core::models::error::CaptureError;
use rhythm_core::traits::loopback_source::{LoopbackProvider, LoopbackSession, Packet};

use crate::com::ComApartment;
use crate::endpoint::{describe, EndpointEnumerator};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;
const KSDATAFORMAT_SUBTYPE_IEEE_FLOAT: GUID = GUID::from_u128(0x00000003_0000_0010_8000_00aa00389b71);

/// 100 ms in 100 ns units.
const BUFFER_DURATION: i64 = 1_000_000;

/// Opens loopback sessions on the default render device.
#[derive(Debug, Default, Clone, Copy)]
pub struct WasapiLoopbackProvider;

impl WasapiLoopbackProvider {
    pub fn new() -> Self {
        Self
    }
}

impl LoopbackProvider for WasapiLoopbackProvider {
    fn open(&self) -> Result<Box<dyn LoopbackSession>, CaptureError> {
        Ok(Box::new(WasapiLoopbackSession::open()?))
    }

    fn device_info(&self) -> AudioEndpoint {
        match query_default_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                log::debug!("Default render endpoint unavailable: {}", e);
                AudioEndpoint {
                    id: "system-loopback".into(),
                    name: "System Audio (Loopback)".into(),
                    is_default: true,
                }
            }
        }
    }
}

fn query_default_endpoint() -> Result<AudioEndpoint, CaptureError> {
    let _com = ComApartment::enter()?;
    let enumerator = EndpointEnumerator::new()?;
    enumerator.default_render_endpoint()
}

/// Owns the mix format block returned by `GetMixFormat`.
struct MixFormat(*mut WAVEFORMATEX);

impl MixFormat {
    fn as_ptr(&self) -> *const WAVEFORMATEX {
        self.0
    }

    /// Map the device's shared-mode format to a `StreamFormat`.
    fn stream_format(&self) -> StreamFormat {
        // SAFETY: GetMixFormat returned a valid block that lives until drop.
        let format = unsafe { std::ptr::read_unaligned(self.0) };
        let tag = format.wFormatTag;
        let bits = format.wBitsPerSample;

        let is_float = match tag {
            WAVE_FORMAT_IEEE_FLOAT => true,
            WAVE_FORMAT_EXTENSIBLE => {
                let ext = unsafe { std::ptr::read_unaligned(self.0 as *const WAVEFORMATEXTENSIBLE) };
                let sub_format = ext.SubFormat;
                sub_format == KSDATAFORMAT_SUBTYPE_IEEE_FLOAT
            }
            _ => false,
        };

        let sample_format = match (is_float, bits) {
            (true, 32) => SampleFormat::F32,
            (false, 16) if matches!(tag, WAVE_FORMAT_PCM | WAVE_FORMAT_EXTENSIBLE) => SampleFormat::I16,
            (false, 24) if matches!(tag, WAVE_FORMAT_PCM | WAVE_FORMAT_EXTENSIBLE) => SampleFormat::I24,
            (false, 32) if matches!(tag, WAVE_FORMAT_PCM | WAVE_FORMAT_EXTENSIBLE) => SampleFormat::I32,
            _ => SampleFormat::Unknown,
        };

        StreamFormat {
            sample_rate: format.nSamplesPerSec,
            channels: format.nChannels,
            sample_format,
        }
    }
}

impl Drop for MixFormat {
    fn drop(&mut self) {
        unsafe {
            CoTaskMemFree(Some(self.0 as *const _));
        }
    }
}

/// Pro Audio scheduling for the capture thread, reverted on drop.
struct MmcssRegistration(HANDLE);

impl MmcssRegistration {
    fn register() -> Option<Self> {
        let mut task_index: u32 = 0;
        match unsafe { AvSetMmThreadCharacteristicsW(w!("Pro Audio"), &mut task_index) } {
            Ok(handle) => Some(Self(handle)),
            Err(e) => {
                log::warn!("MMCSS registration failed, capturing at normal priority: {}", e);
                None
            }
        }
    }
}

impl Drop for MmcssRegistration {
    fn drop(&mut self) {
        unsafe {
            let _ = AvRevertMmThreadCharacteristics(self.0);
        }
    }
}

/// A started loopback stream. Confined to the thread that opened it.
///
/// Fields drop in declaration order, after `Drop::drop` has stopped the
/// stream: interfaces first, then the mix format, then COM itself.
pub struct WasapiLoopbackSession {
    capture_client: IAudioCaptureClient,
    audio_client: IAudioClient,
    _mmcss: Option<MmcssRegistration>,
    _mix_format: MixFormat,
    format: StreamFormat,
    _com: ComApartment,
}

impl WasapiLoopbackSession {
    /// Sequence:
    /// 1. CoInitializeEx (MTA)
    /// 2. Default render endpoint
    /// 3. Activate IAudioClient
    /// 4. GetMixFormat, reject anything but float32
    /// 5. Initialize shared mode with LOOPBACK
    /// 6. IAudioCaptureClient
    /// 7. MMCSS registration
    /// 8. Start
    pub fn open() -> Result<Self, CaptureError> {
        let com = ComApartment::enter()?;

        let device = EndpointEnumerator::new()?.default_render_device()?;
        let endpoint = describe(&device);

        unsafe {
            let audio_client: IAudioClient = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| CaptureError::session_init("activate", e))?;

            let mix_format = MixFormat(
                audio_client
                    .GetMixFormat()
                    .map_err(|e| CaptureError::session_init("get_mix_format", e))?,
            );

            let format = mix_format.stream_format();
            if let Err(reason) = format.validate() {
                log::warn!("Loopback mix format on '{}' is {}: {}", endpoint.name, format, reason);
                return Err(CaptureError::UnsupportedFormat(reason));
            }

            audio_client
                .Initialize(
                    AUDCLNT_SHAREMODE_SHARED,
                    AUDCLNT_STREAMFLAGS_LOOPBACK,
                    BUFFER_DURATION,
                    0,
                    mix_format.as_ptr(),
                    None,
                )
                .map_err(|e| CaptureError::session_init("initialize", e))?;

            let capture_client: IAudioCaptureClient = audio_client
                .GetService()
                .map_err(|e| CaptureError::session_init("get_service", e))?;

            let mmcss = MmcssRegistration::register();

            audio_client.Start().map_err(|e| CaptureError::session_init("start", e))?;

            log::debug!("WASAPI loopback started on '{}' ({})", endpoint.name, endpoint.id);

            Ok(Self {
                capture_client,
                audio_client,
                _mmcss: mmcss,
                _mix_format: mix_format,
                format,
                _com: com,
            })
        }
    }
}

impl LoopbackSession for WasapiLoopbackSession {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn next_packet_frames(&mut self) -> Result<u32, CaptureError> {
        unsafe { self.capture_client.GetNextPacketSize() }
            .map_err(|e| CaptureError::packet("get_next_packet_size", e))
    }

    fn read_packet(&mut self, consume: &mut dyn FnMut(&Packet<'_>)) -> Result<(), CaptureError> {
        let mut buffer_ptr: *mut u8 = std::ptr::null_mut();
        let mut num_frames: u32 = 0;
        let mut flags: u32 = 0;

        unsafe {
            self.capture_client
                .GetBuffer(&mut buffer_ptr, &mut num_frames, &mut flags, None, None)
                .map_err(|e| CaptureError::packet("get_buffer", e))?;
        }

        let channels = self.format.channels;
        let silent = flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0;

        let samples: &[f32] = if silent || num_frames == 0 || buffer_ptr.is_null() {
            &[]
        } else {
            // SAFETY: the buffer holds num_frames interleaved f32 frames until
            // ReleaseBuffer, and the format was checked to be float32.
            unsafe {
                std::slice::from_raw_parts(buffer_ptr as *const f32, num_frames as usize * channels as usize)
            }
        };

        consume(&Packet {
            samples,
            frames: num_frames,
            channels,
            silent,
        });

        unsafe { self.capture_client.ReleaseBuffer(num_frames) }.map_err(|e| CaptureError::packet("release_buffer", e))
    }
}

impl Drop for WasapiLoopbackSession {
    fn drop(&mut self) {
        unsafe {
            let _ = self.audio_client.Stop();
        }
        log::debug!("WASAPI loopback stopped ({} frames/s)", self.format.sample_rate);
    }
}
