//! Completed workout logs and weight carry-forward
//!
//! Logs are the flattened record of a finished session. The most recent ones
//! are indexed by exercise name so freshly parsed blocks can pick up the last
//! weight used (progressive overload).

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::models::{Block, BlockCategory, BlockType};

/// Status of a stored workout log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Completed,
    Skipped,
    #[serde(other)]
    Other,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Completed => "completed",
            LogStatus::Skipped => "skipped",
            LogStatus::Other => "other",
        }
    }
}

/// One set as written to the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedSet {
    #[serde(default)]
    pub set: u32,

    #[serde(default, deserialize_with = "lenient_text")]
    pub weight: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub reps: String,

    #[serde(default)]
    pub is_bodyweight: bool,

    #[serde(default)]
    pub completed: bool,
}

/// One block as written to the log
///
/// `completed` is only present for non-exercise blocks and `sets` only for
/// exercise blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedBlock {
    pub name: String,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<Vec<LoggedSet>>,
}

/// A persisted session log, keyed by user and date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    pub workout_date: NaiveDate,

    pub status: LogStatus,

    #[serde(default)]
    pub details: Vec<LoggedBlock>,
}

impl SessionLog {
    pub fn is_completed(&self) -> bool {
        self.status == LogStatus::Completed
    }
}

/// Last recorded performance of an exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub weight: String,
    pub reps: String,
    pub is_bodyweight: bool,
    pub workout_date: NaiveDate,
}

/// Exercise name to most recently used weight
#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    entries: HashMap<String, HistoryEntry>,
}

impl HistoryIndex {
    /// Build from logs supplied newest first
    ///
    /// Only the first `depth` completed logs are read. Per exercise, the last
    /// completed set of a log is its working set; the first log that has one
    /// with a weight wins.
    pub fn from_logs(logs: &[SessionLog], depth: usize) -> Self {
        let mut entries: HashMap<String, HistoryEntry> = HashMap::new();

        for log in logs.iter().filter(|log| log.is_completed()).take(depth) {
            for block in &log.details {
                if block.block_type != BlockType::Exercise || entries.contains_key(&block.name) {
                    continue;
                }

                let last_completed = block
                    .sets
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .rev()
                    .find(|set| set.completed);

                if let Some(set) = last_completed.filter(|set| !set.weight.trim().is_empty()) {
                    entries.insert(
                        block.name.clone(),
                        HistoryEntry {
                            weight: set.weight.clone(),
                            reps: set.reps.clone(),
                            is_bodyweight: set.is_bodyweight,
                            workout_date: log.workout_date,
                        },
                    );
                }
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-name lookup of the carried weight
    pub fn weight_for(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| entry.weight.as_str())
    }

    pub fn last_performance(&self, name: &str) -> Option<&HistoryEntry> {
        self.entries.get(name)
    }

    /// Entries sorted by exercise name
    pub fn entries(&self) -> Vec<(&str, &HistoryEntry)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Fill blank weights of strength exercise blocks; returns the number of sets filled
    ///
    /// Reps and non-strength blocks are never touched, and sets that already
    /// carry a weight are left alone, so merging twice is a no-op.
    pub fn merge_into(&self, blocks: &mut [Block]) -> usize {
        let mut filled = 0;

        for block in blocks.iter_mut().filter(|b| {
            b.block_type == BlockType::Exercise && b.category == BlockCategory::Strength
        }) {
            let Some(weight) = self.weight_for(&block.name) else {
                continue;
            };

            for set in block.sets.iter_mut().filter(|set| !set.has_weight()) {
                set.weight = weight.to_string();
                set.is_bodyweight = false;
                filled += 1;
            }

            debug!(exercise = %block.name, weight, "carried weight forward");
        }

        filled
    }
}

/// Merge the most recent `depth` completed logs into `blocks`
pub fn merge_history(blocks: &mut [Block], logs: &[SessionLog], depth: usize) -> usize {
    HistoryIndex::from_logs(logs, depth).merge_into(blocks)
}

/// Weights and reps may arrive as numbers or null in stored logs
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
