pub mod accumulator;
pub mod downmix;
pub mod spectrum;
