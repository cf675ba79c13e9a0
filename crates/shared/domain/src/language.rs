use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognition languages the service ships models for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[default]
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::English, Self::Spanish];

    /// Resolves a client-supplied selector.
    ///
    /// Only `es` selects Spanish; every other value (including unknown codes)
    /// falls back to English.
    #[must_use]
    pub fn resolve(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("es") { Self::Spanish } else { Self::English }
    }

    /// Two-letter code used on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
        }
    }

    /// Model name understood by the OCR engine (`-l` argument).
    #[must_use]
    pub const fn engine_code(self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Spanish => "spa",
        }
    }

    /// Wire codes of every supported language.
    #[must_use]
    pub fn codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.code()).collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
