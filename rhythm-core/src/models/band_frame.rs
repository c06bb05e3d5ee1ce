use serde::{Deserialize, Serialize};

/// One published frame: band energies in `[0.0, 1.0]`, lowest frequency first.
///
/// Serializes as a bare JSON array so the host can forward it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandFrame(Vec<f32>);

impl BandFrame {
    /// An all-zero frame with `band_count` bands.
    pub fn silent(band_count: usize) -> Self {
        Self(vec![0.0; band_count])
    }

    pub fn from_values(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    /// Overwrite every band with zero, keeping the band count.
    pub fn clear(&mut self) {
        self.0.fill(0.0);
    }

    /// Copy `values` in place. Lengths must match.
    pub fn copy_from(&mut self, values: &[f32]) {
        self.0.copy_from_slice(values);
    }
}
