//! Thought records and chains produced by the contemplation loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mode::ThoughtMode;

/// Prefix of the sentinel text substituted for a failed generation.
pub const SENTINEL_PREFIX: &str = "Contemplation error: ";

/// Build the sentinel output for a failed backend call.
pub fn sentinel(cause: &str) -> String {
    format!("{SENTINEL_PREFIX}{cause}")
}

/// How a record's output was obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThoughtOutcome {
    /// The backend produced the output
    #[default]
    Generated,
    /// The backend failed; the output is sentinel text embedding the cause
    Absorbed { cause: String },
}

impl ThoughtOutcome {
    pub fn is_absorbed(&self) -> bool {
        matches!(self, Self::Absorbed { .. })
    }
}

/// One iteration of the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtRecord {
    /// Position in the chain, starting at 1
    pub depth: u32,
    pub input: String,
    pub output: String,
    pub mode: ThoughtMode,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub outcome: ThoughtOutcome,
}

impl ThoughtRecord {
    /// Whether this step degraded to a sentinel output.
    pub fn is_degraded(&self) -> bool {
        self.outcome.is_absorbed()
    }

    /// The absorbed failure cause, if any.
    pub fn failure_cause(&self) -> Option<&str> {
        match &self.outcome {
            ThoughtOutcome::Absorbed { cause } => Some(cause),
            ThoughtOutcome::Generated => None,
        }
    }
}

/// Ordered records of one contemplation run.
///
/// Record `i` takes record `i - 1`'s output as its input; the first record
/// takes the seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtChain {
    records: Vec<ThoughtRecord>,
}

impl ThoughtChain {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: ThoughtRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ThoughtRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ThoughtRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ThoughtRecord> {
        self.records.get(index)
    }

    /// Output of the deepest record.
    pub fn final_output(&self) -> Option<&str> {
        self.records.last().map(|r| r.output.as_str())
    }

    /// Records whose backend call failed.
    pub fn degraded(&self) -> impl Iterator<Item = &ThoughtRecord> {
        self.records.iter().filter(|r| r.is_degraded())
    }

    pub fn is_degraded(&self) -> bool {
        self.records.iter().any(ThoughtRecord::is_degraded)
    }

    /// Check the feedback invariant against the seed.
    pub fn is_linked_to(&self, seed: &str) -> bool {
        let mut expected = seed;
        for (i, record) in self.records.iter().enumerate() {
            if record.input != expected || record.depth as usize != i + 1 {
                return false;
            }
            expected = &record.output;
        }
        true
    }

    pub fn into_records(self) -> Vec<ThoughtRecord> {
        self.records
    }
}

impl IntoIterator for ThoughtChain {
    type Item = ThoughtRecord;
    type IntoIter = std::vec::IntoIter<ThoughtRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ThoughtChain {
    type Item = &'a ThoughtRecord;
    type IntoIter = std::slice::Iter<'a, ThoughtRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(depth: u32, input: &str, output: &str, outcome: ThoughtOutcome) -> ThoughtRecord {
        ThoughtRecord {
            depth,
            input: input.to_string(),
            output: output.to_string(),
            mode: ThoughtMode::Standard,
            timestamp: Utc::now(),
            outcome,
        }
    }

    #[test]
    fn test_sentinel_embeds_cause() {
        assert_eq!(sentinel("boom"), "Contemplation error: boom");
    }

    #[test]
    fn test_chain_linkage() {
        let mut chain = ThoughtChain::default();
        chain.push(record(1, "seed", "a", ThoughtOutcome::Generated));
        chain.push(record(2, "a", "b", ThoughtOutcome::Generated));
        assert!(chain.is_linked_to("seed"));
        assert!(!chain.is_linked_to("other"));
        assert_eq!(chain.final_output(), Some("b"));

        chain.push(record(3, "not-b", "c", ThoughtOutcome::Generated));
        assert!(!chain.is_linked_to("seed"));
    }

    #[test]
    fn test_degraded_records() {
        let mut chain = ThoughtChain::default();
        chain.push(record(1, "s", "ok", ThoughtOutcome::Generated));
        chain.push(record(
            2,
            "ok",
            &sentinel("down"),
            ThoughtOutcome::Absorbed {
                cause: "down".to_string(),
            },
        ));

        assert!(chain.is_degraded());
        let degraded: Vec<_> = chain.degraded().map(|r| r.depth).collect();
        assert_eq!(degraded, vec![2]);
        assert_eq!(chain.records()[1].failure_cause(), Some("down"));
        assert_eq!(chain.records()[0].failure_cause(), None);
    }

    #[test]
    fn test_record_serialization_tags_outcome() {
        let rec = record(
            1,
            "i",
            "o",
            ThoughtOutcome::Absorbed {
                cause: "x".to_string(),
            },
        );
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["mode"], "standard");
        assert_eq!(value["outcome"]["status"], "absorbed");
        assert_eq!(value["outcome"]["cause"], "x");
    }
}
