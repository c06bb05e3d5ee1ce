use num_complex::Complex32;

/// Collapses the lower half of a magnitude spectrum into equal-width bands.
///
/// Linear in frequency: every band covers the same number of bins. Each
/// band's mean magnitude is scaled by `gain` and clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct BandMapper {
    band_count: usize,
    gain: f32,
}

impl BandMapper {
    pub fn new(band_count: usize, gain: f32) -> Self {
        assert!(band_count > 0, "band count must be positive");
        Self { band_count, gain }
    }

    /// Write one value per band into `out`.
    ///
    /// Only `spectrum[..len / 2]` is read; the upper half mirrors it for
    /// real input. Bins left over after an uneven split are ignored.
    pub fn map_into(&self, spectrum: &[Complex32], out: &mut [f32]) {
        assert_eq!(out.len(), self.band_count, "output must hold one value per band");
        let usable = spectrum.len() / 2;
        let bins_per_band = usable / self.band_count;
        if bins_per_band == 0 {
            out.fill(0.0);
            return;
        }

        for (band, value) in spectrum[..bins_per_band * self.band_count]
            .chunks_exact(bins_per_band)
            .zip(out.iter_mut())
        {
            let mean = band.iter().map(|c| c.norm()).sum::<f32>() / bins_per_band as f32;
            *value = (mean * self.gain).clamp(0.0, 1.0);
        }
    }
}
