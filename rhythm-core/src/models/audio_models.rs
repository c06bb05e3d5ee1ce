use serde::{Deserialize, Serialize};

/// Sample representation delivered by a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    F32,
    I16,
    I24,
    I32,
    Unknown,
}

/// Negotiated format of a loopback stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: SampleFormat,
}

impl StreamFormat {
    pub fn f32(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            sample_format: SampleFormat::F32,
        }
    }

    /// Only interleaved float32 with at least one channel can be downmixed.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.sample_format != SampleFormat::F32 {
            return Err(format!("expected f32 samples, got {:?}", self.sample_format));
        }
        Ok(())
    }

    /// Width of one FFT bin in Hz for the given window length.
    pub fn bin_width_hz(&self, window_size: usize) -> f32 {
        self.sample_rate as f32 / window_size as f32
    }
}

impl std::fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz, {} ch, {:?}", self.sample_rate, self.channels, self.sample_format)
    }
}

/// The render endpoint a loopback session reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEndpoint {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

/// Counters for debugging a capture session. Reset on every session start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzerDiagnostics {
    pub format: Option<StreamFormat>,
    pub packets_read: u64,
    pub silent_packets: u64,
    pub samples_accumulated: u64,
    pub windows_transformed: u64,
    pub frames_published: u64,
    pub frames_without_subscriber: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_stereo_is_valid() {
        assert!(StreamFormat::f32(48000, 2).validate().is_ok());
    }

    #[test]
    fn rejects_integer_samples() {
        let format = StreamFormat {
            sample_rate: 44100,
            channels: 2,
            sample_format: SampleFormat::I16,
        };
        assert!(format.validate().is_err());
    }

    #[test]
    fn rejects_zero_channels_or_rate() {
        assert!(StreamFormat::f32(48000, 0).validate().is_err());
        assert!(StreamFormat::f32(0, 2).validate().is_err());
    }

    #[test]
    fn bin_width() {
        let format = StreamFormat::f32(48000, 2);
        assert!((format.bin_width_hz(1024) - 46.875).abs() < 1e-6);
    }
}
