/// Hann window weights for a window of `len` samples.
///
/// `w(i) = 0.5 * (1 - cos(2π·i / (len - 1)))`, so both ends are exactly zero.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f32;
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos()))
        .collect()
}
