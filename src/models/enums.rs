use serde::{Deserialize, Serialize};

/// Which part of the record a flag was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    Labs,
    Medications,
    Screenings,
    AiInsight,
}

impl FlagCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Labs => "labs",
            Self::Medications => "medications",
            Self::Screenings => "screenings",
            Self::AiInsight => "ai_insight",
        }
    }

    /// Human-readable form for the category badge ("ai insight").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// Clinical urgency of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tag on a flag. The backend only emits "ai" today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Ai,
}
