pub mod audio_models;
pub mod band_frame;
pub mod config;
pub mod error;
pub mod state;
