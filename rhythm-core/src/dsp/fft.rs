//! In-place iterative radix-2 Cooley-Tukey FFT.

use num_complex::Complex32;

/// Forward, unnormalized DFT of `buf` in place.
///
/// `X[k] = Σ x[n]·e^(-2πi·k·n/N)`.
///
/// # Panics
/// If `buf.len()` is not a power of two.
pub fn fft_in_place(buf: &mut [Complex32]) {
    let n = buf.len();
    assert!(
        n.is_power_of_two(),
        "fft length must be a power of two, got {}",
        n
    );
    if n == 1 {
        return;
    }

    bit_reverse_permute(buf);

    let mut len = 2;
    while len <= n {
        let angle = -2.0 * std::f32::consts::PI / len as f32;
        let w_len = Complex32::from_polar(1.0, angle);
        let half = len / 2;
        for chunk in buf.chunks_exact_mut(len) {
            let mut w = Complex32::new(1.0, 0.0);
            let (lo, hi) = chunk.split_at_mut(half);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let u = *a;
                let v = *b * w;
                *a = u + v;
                *b = u - v;
                w *= w_len;
            }
        }
        len <<= 1;
    }
}

/// Swap every element with the one at its bit-reversed index.
fn bit_reverse_permute(buf: &mut [Complex32]) {
    let n = buf.len();
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            buf.swap(i, j);
        }
    }
}
