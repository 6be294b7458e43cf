//! Thought modes and the registry that maps each mode to its behaviour.
//!
//! A mode decides three things about a step in the contemplation loop:
//! how the input is phrased for the backend, which sampling temperature is
//! requested, and whether the generated text is wrapped in a decorative
//! frame afterwards. All three live in one exhaustive match per concern,
//! so a new variant does not compile until every table covers it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Stylistic or analytical stance used for a chain of thoughts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThoughtMode {
    #[default]
    Standard,
    Poetic,
    Philosophical,
    Scientific,
    Psychological,
    Mystical,
}

impl ThoughtMode {
    /// Every mode, in catalog order.
    pub const ALL: [ThoughtMode; 6] = [
        Self::Standard,
        Self::Poetic,
        Self::Philosophical,
        Self::Scientific,
        Self::Psychological,
        Self::Mystical,
    ];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Poetic => "poetic",
            Self::Philosophical => "philosophical",
            Self::Scientific => "scientific",
            Self::Psychological => "psychological",
            Self::Mystical => "mystical",
        }
    }

    /// Sampling temperature requested from the backend.
    pub fn temperature(&self) -> f64 {
        match self {
            Self::Standard => 0.70,
            Self::Poetic => 0.90,
            Self::Philosophical => 0.80,
            Self::Scientific => 0.50,
            Self::Psychological => 0.75,
            Self::Mystical => 1.00,
        }
    }

    /// Instructional prefix placed before the input, if any.
    fn prompt_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Poetic => Some("Respond poetically about: "),
            Self::Philosophical => Some("Analyze philosophically: "),
            Self::Scientific => Some("Explain scientifically: "),
            Self::Psychological => Some("Analyze from psychological perspective: "),
            Self::Mystical => Some("Respond mystically about: "),
        }
    }

    /// Frame titles for decorated modes. Empty means no post-processing.
    pub fn frames(&self) -> &'static [&'static str] {
        match self {
            Self::Poetic => &[
                "🌌 Cosmic Reflection",
                "🌀 Recursive Echo",
                "🪞 Mirror of Consciousness",
                "⚛️ Quantum Thought",
            ],
            Self::Mystical => &[
                "🔮 Mystical Vision",
                "🌠 Cosmic Revelation",
                "🕳️ Void Whisper",
            ],
            Self::Standard | Self::Philosophical | Self::Scientific | Self::Psychological => &[],
        }
    }

    /// Human-readable description for mode catalogs.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "Standard recursive thought generation",
            Self::Poetic => "Poetic and metaphorical responses",
            Self::Philosophical => "Philosophical analysis and reflection",
            Self::Scientific => "Scientific explanation and reasoning",
            Self::Psychological => "Psychological perspective and analysis",
            Self::Mystical => "Mystical and esoteric interpretations",
        }
    }

    /// Render the backend prompt for `text` in this mode.
    pub fn render(&self, text: &str) -> String {
        match self.prompt_prefix() {
            Some(prefix) => format!("{prefix}{text}"),
            None => text.to_string(),
        }
    }
}

impl fmt::Display for ThoughtMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThoughtMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| Error::unknown_mode(s))
    }
}

/// Resolved behaviour of a mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub mode: ThoughtMode,
    pub temperature: f64,
    pub frames: &'static [&'static str],
}

impl ModeProfile {
    /// Render the backend prompt for `text`.
    pub fn render(&self, text: &str) -> String {
        self.mode.render(text)
    }

    /// Whether generated text is framed before it re-enters the loop.
    pub fn has_post_processor(&self) -> bool {
        !self.frames.is_empty()
    }
}

/// Resolve a mode to its template, temperature and frames.
pub fn resolve(mode: ThoughtMode) -> ModeProfile {
    ModeProfile {
        mode,
        temperature: mode.temperature(),
        frames: mode.frames(),
    }
}

/// Resolve a mode given by name, rejecting anything outside the closed set.
pub fn resolve_named(name: &str) -> Result<ModeProfile> {
    name.parse::<ThoughtMode>().map(resolve)
}

/// Catalog entry describing one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub mode: ThoughtMode,
    pub description: String,
    pub temperature: f64,
}

/// Catalog of every mode with its description and temperature.
pub fn mode_catalog() -> Vec<ModeInfo> {
    ThoughtMode::ALL
        .into_iter()
        .map(|mode| ModeInfo {
            mode,
            description: mode.description().to_string(),
            temperature: mode.temperature(),
        })
        .collect()
}
