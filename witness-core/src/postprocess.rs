//! Mode-specific decoration of generated text.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};

use crate::mode::ThoughtMode;

/// Separator appended after every framed thought.
pub const FRAME_SEPARATOR: &str = "---";

/// Wraps generated text in a randomly chosen frame for decorated modes.
///
/// The random source is owned by the processor and guarded by a mutex so a
/// single processor can serve concurrent chains. Inject a seeded or mock RNG
/// to make frame selection reproducible.
pub struct PostProcessor {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl PostProcessor {
    /// Create a processor drawing from the given random source.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Create a processor with a reproducible seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a processor seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Apply the mode's post-processing to `text`.
    ///
    /// Modes without frames return the text unchanged and draw nothing from
    /// the random source.
    pub fn apply(&self, mode: ThoughtMode, text: &str) -> String {
        let frames = mode.frames();
        if frames.is_empty() {
            return text.to_string();
        }

        let title = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            frames.choose(&mut **rng).copied()
        };

        match title {
            Some(title) => frame(title, text),
            None => text.to_string(),
        }
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for PostProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostProcessor").finish_non_exhaustive()
    }
}

fn frame(title: &str, text: &str) -> String {
    format!("{title}:\n{text}\n{FRAME_SEPARATOR}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_undecorated_modes_pass_through() {
        let processor = PostProcessor::seeded(7);
        for mode in [
            ThoughtMode::Standard,
            ThoughtMode::Philosophical,
            ThoughtMode::Scientific,
            ThoughtMode::Psychological,
        ] {
            assert_eq!(processor.apply(mode, "plain"), "plain");
        }
    }

    #[test]
    fn test_pinned_rng_selects_first_frame() {
        let processor = PostProcessor::with_rng(StepRng::new(0, 0));
        assert_eq!(
            processor.apply(ThoughtMode::Poetic, "stars"),
            "🌌 Cosmic Reflection:\nstars\n---"
        );
        assert_eq!(
            processor.apply(ThoughtMode::Mystical, "void"),
            "🔮 Mystical Vision:\nvoid\n---"
        );
    }

    #[test]
    fn test_seeded_processors_agree() {
        let a = PostProcessor::seeded(42);
        let b = PostProcessor::seeded(42);
        for _ in 0..16 {
            assert_eq!(
                a.apply(ThoughtMode::Poetic, "echo"),
                b.apply(ThoughtMode::Poetic, "echo")
            );
        }
    }

    #[test]
    fn test_frames_stay_within_mode_set() {
        let processor = PostProcessor::seeded(3);
        for _ in 0..32 {
            let out = processor.apply(ThoughtMode::Mystical, "omen");
            let title = out.split(":\n").next().unwrap();
            assert!(ThoughtMode::Mystical.frames().contains(&title), "{out}");
            assert!(out.ends_with("\nomen\n---"));
        }
    }
}
