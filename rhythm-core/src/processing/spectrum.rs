use num_complex::Complex32;

use crate::dsp::bands::BandMapper;
use crate::dsp::fft::fft_in_place;
use crate::dsp::window::hann_window;
use crate::models::config::AnalyzerConfig;

/// Turns one full analysis window into band values.
///
/// Window weights and the complex scratch buffer are allocated once and
/// reused for every window.
#[derive(Debug)]
pub struct SpectrumProcessor {
    window: Vec<f32>,
    scratch: Vec<Complex32>,
    mapper: BandMapper,
}

impl SpectrumProcessor {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            window: hann_window(config.window_size),
            scratch: vec![Complex32::new(0.0, 0.0); config.window_size],
            mapper: BandMapper::new(config.band_count, config.gain),
        }
    }

    /// Window, transform and band-map `samples` into `bands`.
    ///
    /// `samples` must be exactly one window long and `bands` one value per band.
    pub fn process(&mut self, samples: &[f32], bands: &mut [f32]) {
        assert_eq!(samples.len(), self.window.len(), "expected one full analysis window");

        for ((slot, &sample), &weight) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex32::new(sample * weight, 0.0);
        }
        fft_in_place(&mut self.scratch);
        self.mapper.map_into(&self.scratch, bands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / rate).sin())
            .collect()
    }

    #[test]
    fn full_scale_sine_in_band_three() {
        let config = AnalyzerConfig::default();
        let mut processor = SpectrumProcessor::new(&config);
        let mut bands = vec![0.0; 16];

        // bin 112 of 1024 at 48 kHz, inside band 3 (4500..6000 Hz)
        processor.process(&sine(5250.0, 48000.0, 1024), &mut bands);

        assert!(bands[3] > 0.5);
        for (i, &v) in bands.iter().enumerate() {
            assert!((0.0..=1.0).contains(&v));
            if i != 3 {
                assert!(v < 0.1, "band {} = {}", i, v);
            }
        }
    }

    #[test]
    fn off_bin_sine_stays_in_its_band() {
        let mut processor = SpectrumProcessor::new(&AnalyzerConfig::default());
        let mut bands = vec![0.0; 16];

        // 5000 Hz falls between bins 106 and 107; leakage must not cross bands
        processor.process(&sine(5000.0, 48000.0, 1024), &mut bands);

        assert!(bands[3] > 0.5);
        assert!(bands[2] < 0.1, "band 2 = {}", bands[2]);
        assert!(bands[4] < 0.1, "band 4 = {}", bands[4]);
        for (i, &v) in bands.iter().enumerate() {
            assert!(v <= bands[3], "band {} = {} exceeds band 3", i, v);
        }
    }

    #[test]
    fn silence_gives_zero_bands() {
        let mut processor = SpectrumProcessor::new(&AnalyzerConfig::default());
        let mut bands = vec![1.0; 16];
        processor.process(&vec![0.0; 1024], &mut bands);
        assert!(bands.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn scratch_is_fully_overwritten_between_windows() {
        let mut processor = SpectrumProcessor::new(&AnalyzerConfig::default());
        let mut first = vec![0.0; 16];
        let mut second = vec![0.0; 16];
        processor.process(&sine(750.0, 48000.0, 1024), &mut first);
        processor.process(&vec![0.0; 1024], &mut second);
        assert!(first[0] > 0.5);
        assert!(second.iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "one full analysis window")]
    fn rejects_partial_window() {
        let mut processor = SpectrumProcessor::new(&AnalyzerConfig::default());
        let mut bands = vec![0.0; 16];
        processor.process(&[0.0; 100], &mut bands);
    }
}
