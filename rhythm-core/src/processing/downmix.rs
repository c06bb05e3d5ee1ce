/// Downmix interleaved multi-channel audio to mono by averaging channels per frame.
///
/// Appends `samples.len() / channels` values to `out`. A trailing partial
/// frame is ignored.
pub fn downmix_into(samples: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(samples);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(
        samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}
