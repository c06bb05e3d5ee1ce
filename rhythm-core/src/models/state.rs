use serde::Serialize;

/// Analyzer lifecycle state machine.
///
/// State transitions:
/// ```text
/// idle → starting → running → stopping → idle
///           │          │
///           └──────────┴──→ idle   (session init / packet failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

impl AnalyzerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}
