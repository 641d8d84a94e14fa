use std::fmt;

use serde::{Deserialize, Serialize};

/// How much report the caller wants: a one-page flash summary or a full
/// investigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDepth {
    #[default]
    #[serde(alias = "summarized")]
    Flash,
    #[serde(alias = "detailed", alias = "deep-dive")]
    DeepDive,
}

impl ReportDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportDepth::Flash => "flash",
            ReportDepth::DeepDive => "deep_dive",
        }
    }

    /// Document title shown in the title region.
    pub fn title(&self) -> &'static str {
        match self {
            ReportDepth::Flash => "HSE FLASH REPORT",
            ReportDepth::DeepDive => "HSE INVESTIGATION REPORT",
        }
    }

    /// Report-type label shown under the title.
    pub fn label(&self) -> &'static str {
        match self {
            ReportDepth::Flash => "Summarized Flash Report",
            ReportDepth::DeepDive => "Detailed Level 3 Investigation",
        }
    }
}

impl fmt::Display for ReportDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
