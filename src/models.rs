use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Training focus tag attached to a sub-workout by the plan generator
///
/// The tag is advisory: title text and instruction content can override it
/// during classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Focus {
    Strength,
    Hypertrophy,
    Resistance,
    Mixed,
    Cardio,
    Endurance,
    Mobility,
    Hiit,
    Recovery,
    Other(String),
}

impl Focus {
    pub fn as_str(&self) -> &str {
        match self {
            Focus::Strength => "strength",
            Focus::Hypertrophy => "hypertrophy",
            Focus::Resistance => "resistance",
            Focus::Mixed => "mixed",
            Focus::Cardio => "cardio",
            Focus::Endurance => "endurance",
            Focus::Mobility => "mobility",
            Focus::Hiit => "hiit",
            Focus::Recovery => "recovery",
            Focus::Other(tag) => tag,
        }
    }

    /// Counts towards `hasCardio` of the pure-endurance check
    pub fn is_cardio(&self) -> bool {
        matches!(self, Focus::Cardio | Focus::Endurance)
    }

    /// Counts towards `hasStrength` of the pure-endurance check
    pub fn is_strength(&self) -> bool {
        matches!(
            self,
            Focus::Strength | Focus::Hypertrophy | Focus::Resistance | Focus::Mixed
        )
    }
}

impl From<&str> for Focus {
    fn from(s: &str) -> Self {
        let tag = s.trim().to_lowercase();
        match tag.as_str() {
            "strength" => Focus::Strength,
            "hypertrophy" => Focus::Hypertrophy,
            "resistance" => Focus::Resistance,
            "mixed" => Focus::Mixed,
            "cardio" => Focus::Cardio,
            "endurance" => Focus::Endurance,
            "mobility" => Focus::Mobility,
            "hiit" => Focus::Hiit,
            "recovery" => Focus::Recovery,
            _ => Focus::Other(tag),
        }
    }
}

impl From<String> for Focus {
    fn from(s: String) -> Self {
        Focus::from(s.as_str())
    }
}

impl From<Focus> for String {
    fn from(focus: Focus) -> Self {
        focus.as_str().to_string()
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day classification emitted by the plan generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Main,
    Bonus,
    Recovery,
    #[serde(other)]
    Unknown,
}

/// One named section of a day's plan (e.g. "Upper Body Strength")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubWorkout {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<Focus>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_min: Option<f64>,

    /// Free-text instruction lines; `None` when absent or not a list
    #[serde(
        default,
        deserialize_with = "lenient_lines",
        skip_serializing_if = "Option::is_none"
    )]
    pub instructions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SubWorkout {
    pub fn new(title: impl Into<String>, focus: Option<Focus>, instructions: Vec<String>) -> Self {
        Self {
            title: title.into(),
            focus,
            duration_min: None,
            instructions: Some(instructions),
            notes: None,
        }
    }
}

/// A single day of a generated week plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Empty when the generator left it out; such days are dropped from a week
    #[serde(default, deserialize_with = "lenient_text")]
    pub weekday: String,

    /// Short summary lines
    #[serde(default, deserialize_with = "lenient_line_list")]
    pub workouts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DayKind>,

    #[serde(default, deserialize_with = "lenient_sub_workouts")]
    pub detailed_workouts: Vec<SubWorkout>,
}

impl DayPlan {
    /// Empty recovery day used to pad a generated week
    pub fn rest(weekday: impl Into<String>) -> Self {
        Self {
            weekday: weekday.into(),
            workouts: Vec::new(),
            kind: Some(DayKind::Recovery),
            detailed_workouts: Vec::new(),
        }
    }
}

/// A full week as returned by the plan generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub days: Vec<DayPlan>,
}

/// A stored week plan, newest-first ordering is by `week_start_date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub user_id: String,
    pub week_start_date: Option<NaiveDate>,
    pub plan: PlanDocument,
}

/// Semantic role of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Warmup,
    Cooldown,
    EnduranceSession,
    Exercise,
    GeneralBlock,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Warmup => "warmup",
            BlockType::Cooldown => "cooldown",
            BlockType::EnduranceSession => "endurance_session",
            BlockType::Exercise => "exercise",
            BlockType::GeneralBlock => "general_block",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Strength,
    Mobility,
    Cardio,
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BlockCategory::Strength => "strength",
            BlockCategory::Mobility => "mobility",
            BlockCategory::Cardio => "cardio",
        };
        f.write_str(label)
    }
}

/// Activity of an endurance session, drives the timer presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnduranceMode {
    Run,
    Bike,
    Swim,
    General,
}

impl fmt::Display for EnduranceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnduranceMode::Run => "run",
            EnduranceMode::Bike => "bike",
            EnduranceMode::Swim => "swim",
            EnduranceMode::General => "general",
        };
        f.write_str(label)
    }
}

/// A single trackable set of an exercise block
///
/// `weight` and `reps` are kept as opaque text: reps may be a range ("8-12")
/// or a time token ("30 sec").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub set_number: u32,
    pub weight: String,
    pub reps: String,
    pub is_bodyweight: bool,
    pub completed: bool,
}

impl ExerciseSet {
    pub fn new(set_number: u32, weight: impl Into<String>, reps: impl Into<String>) -> Self {
        let weight = weight.into();
        Self {
            set_number,
            is_bodyweight: weight.is_empty(),
            weight,
            reps: reps.into(),
            completed: false,
        }
    }

    pub fn has_weight(&self) -> bool {
        !self.weight.trim().is_empty()
    }
}

/// One rendered/trackable unit of a workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    pub category: BlockCategory,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default)]
    pub sets: Vec<ExerciseSet>,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<EnduranceMode>,
}

impl Block {
    pub fn is_exercise(&self) -> bool {
        self.block_type == BlockType::Exercise
    }

    /// Number of completion units this block contributes to session progress
    pub fn trackables(&self) -> usize {
        if self.is_exercise() {
            self.sets.len()
        } else {
            1
        }
    }

    pub fn completed_trackables(&self) -> usize {
        if self.is_exercise() {
            self.sets.iter().filter(|s| s.completed).count()
        } else {
            usize::from(self.is_completed)
        }
    }
}

/// Output of one parse run over a day plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutData {
    pub day_plan: DayPlan,
    pub general_notes: String,
    pub blocks: Vec<Block>,
    pub is_pure_endurance_day: bool,
}

/// Accepts a list of strings, tolerating scalars mixed in; anything else is `None`
fn lenient_lines<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Array(items) => Some(items.into_iter().filter_map(value_to_line).collect()),
        _ => None,
    }))
}

fn lenient_line_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_lines(deserializer)?.unwrap_or_default())
}

/// Strings pass through, numbers are rendered, anything else is empty
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_line).unwrap_or_default())
}

/// Null or a non-list is empty; entries that are not sub-workout objects are skipped
fn lenient_sub_workouts<'de, D>(deserializer: D) -> Result<Vec<SubWorkout>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn value_to_line(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
