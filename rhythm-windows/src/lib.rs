//! # rhythm-windows
//!
//! Windows WASAPI backend for rhythm-core.
//!
//! Provides:
//! - `WasapiLoopbackProvider`: opens loopback sessions on the default render endpoint
//! - `WasapiLoopbackSession`: one started loopback stream, float32 only
//!
//! ## Platform Requirements
//! - Windows 10 or later
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use rhythm_core::{AnalyzerConfig, LoopbackAnalyzer, RhythmPlugin};
//! use rhythm_windows::WasapiLoopbackProvider;
//!
//! let analyzer = LoopbackAnalyzer::new(WasapiLoopbackProvider::new(), AnalyzerConfig::default())?;
//! let plugin = RhythmPlugin::new(analyzer);
//! plugin.handle_method_call("start");
//! ```

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
mod endpoint;
#[cfg(target_os = "windows")]
pub mod wasapi_loopback;

#[cfg(target_os = "windows")]
pub use wasapi_loopback::{WasapiLoopbackProvider, WasapiLoopbackSession};
