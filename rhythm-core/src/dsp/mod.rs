pub mod bands;
pub mod fft;
pub mod window;
