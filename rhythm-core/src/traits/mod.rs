pub mod band_sink;
pub mod loopback_source;
