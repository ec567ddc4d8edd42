//! Week plan generation collaborator
//!
//! The generator itself is an external model service; this module holds the
//! request context handed to it, the primary/backup fallback chain and the
//! normalization of whatever JSON comes back into a seven-day `PlanDocument`.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::{GenerationError, PlanError};
use crate::history::SessionLog;
use crate::models::{BlockType, DayPlan, PlanDocument};
use crate::schedule::{effective_training_days, normalize_weekday, weekday_code, DOW_ORDER};

/// Notes used when the generator returns none
pub const DEFAULT_PLAN_NOTES: &str = "Here is your plan.";

const NO_HISTORY: &str = "No previous workout history available - Start with baseline weights.";
const NO_LIFTS: &str = "No lifts recorded yet.";

/// Athlete profile fields forwarded to the generator
#[derive(Debug, Clone, Default, Serialize)]
pub struct AthleteProfile {
    pub name: String,
    pub goal: String,
    pub level: String,
    pub current_training_week: u32,
    pub fixed_activities: Vec<String>,
    pub constraints: Option<String>,
    pub facilities: Vec<String>,
}

/// Which days the generator may place main workouts on
#[derive(Debug, Clone, Serialize)]
pub struct SchedulingContext {
    pub current_day: String,
    pub valid_days_for_workouts: Vec<String>,
    pub is_future_plan: bool,
    pub is_adjustment: bool,
}

/// Everything the generator is told about one week request
#[derive(Debug, Clone, Serialize)]
pub struct PlanContext {
    pub user_profile: AthleteProfile,
    pub scheduling_context: SchedulingContext,
    pub notes: String,
    pub adjustment_request: String,
    pub performance_history: String,
}

impl PlanContext {
    /// Build the request for the week starting `week_start_date`
    ///
    /// `requested_days` are free-form labels; unknown labels are dropped.
    pub fn new(
        profile: AthleteProfile,
        requested_days: &[String],
        week_start_date: Option<NaiveDate>,
        today: NaiveDate,
        recent_logs: &[SessionLog],
    ) -> Self {
        let requested: Vec<Weekday> = requested_days
            .iter()
            .filter_map(|label| normalize_weekday(label))
            .collect();

        let is_future_plan = week_start_date.is_some_and(|start| start > today);
        let valid_days = effective_training_days(&requested, week_start_date, today);
        let current_day = if is_future_plan {
            "Start of Week".to_string()
        } else {
            weekday_code(today.weekday()).to_string()
        };

        Self {
            user_profile: profile,
            scheduling_context: SchedulingContext {
                current_day,
                valid_days_for_workouts: valid_days
                    .into_iter()
                    .map(|day| weekday_code(day).to_string())
                    .collect(),
                is_future_plan,
                is_adjustment: false,
            },
            notes: String::new(),
            adjustment_request: String::new(),
            performance_history: performance_summary(recent_logs),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Mark the request as a change to an existing plan
    pub fn with_adjustment(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.scheduling_context.is_adjustment = !reason.trim().is_empty();
        self.adjustment_request = reason;
        self
    }

    /// Context rendered as the user message sent to the model
    pub fn to_prompt(&self) -> Result<String, GenerationError> {
        let context = serde_json::to_string_pretty(self).map_err(|e| {
            GenerationError::ModelFailed {
                model: "prompt".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(format!(
            "CONTEXT:\n{}\n\nTASK:\nGenerate the plan as strict JSON.",
            context
        ))
    }
}

/// Last completed performance per exercise, one line each
///
/// Logs are expected newest first; the newest log mentioning an exercise wins.
pub fn performance_summary(logs: &[SessionLog]) -> String {
    if logs.is_empty() {
        return NO_HISTORY.to_string();
    }

    let mut seen: HashMap<&str, String> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for log in logs {
        for block in log.details.iter().filter(|b| b.block_type == BlockType::Exercise) {
            if seen.contains_key(block.name.as_str()) {
                continue;
            }
            let Some(set) = block
                .sets
                .as_deref()
                .unwrap_or_default()
                .iter()
                .rev()
                .find(|set| set.completed)
            else {
                continue;
            };

            let weight = if set.is_bodyweight {
                "Bodyweight".to_string()
            } else {
                format!("{}kg", set.weight)
            };
            seen.insert(
                &block.name,
                format!("[{}]: {} x {} reps", log.workout_date, weight, set.reps),
            );
            order.push(&block.name);
        }
    }

    if order.is_empty() {
        return NO_LIFTS.to_string();
    }

    order
        .iter()
        .filter_map(|name| seen.get(name).map(|perf| format!("- {}: {}", name, perf)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A model that turns a plan request into a week plan
pub trait PlanGenerator {
    fn model_name(&self) -> &str;

    fn generate(&self, context: &PlanContext) -> Result<PlanDocument, GenerationError>;
}

/// Primary generator with a single backup attempt
pub struct FallbackGenerator<P, B> {
    primary: P,
    backup: B,
}

impl<P: PlanGenerator, B: PlanGenerator> FallbackGenerator<P, B> {
    pub fn new(primary: P, backup: B) -> Self {
        Self { primary, backup }
    }
}

impl<P: PlanGenerator, B: PlanGenerator> PlanGenerator for FallbackGenerator<P, B> {
    fn model_name(&self) -> &str {
        self.primary.model_name()
    }

    fn generate(&self, context: &PlanContext) -> Result<PlanDocument, GenerationError> {
        info!(model = self.primary.model_name(), "requesting week plan");
        let primary_err = match self.primary.generate(context) {
            Ok(document) => return Ok(document.normalize_week()),
            Err(err) => err,
        };

        warn!(
            model = self.primary.model_name(),
            backup = self.backup.model_name(),
            error = %primary_err,
            "primary generator failed, trying backup"
        );

        self.backup
            .generate(context)
            .map(PlanDocument::normalize_week)
            .map_err(|backup_err| GenerationError::Connection {
                primary: primary_err.to_string(),
                backup: backup_err.to_string(),
            })
    }
}

/// Read a model reply into a plan, attributing failures to `model`
pub fn document_from_model_output(model: &str, output: &str) -> Result<PlanDocument, GenerationError> {
    if output.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    PlanDocument::from_json(output)
        .map(PlanDocument::normalize_week)
        .map_err(|e| GenerationError::ModelFailed {
            model: model.to_string(),
            reason: e.to_string(),
        })
}

impl PlanDocument {
    /// Parse raw model text: surrounding prose and code fences are ignored
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        let body = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(PlanError::InvalidDocument {
                    reason: "no JSON object found".to_string(),
                })
            }
        };

        let value: Value = serde_json::from_str(body).map_err(|e| PlanError::InvalidDocument {
            reason: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Parse a JSON value, unwrapping a `{ "plan": { ... } }` envelope
    pub fn from_value(value: Value) -> Result<Self, PlanError> {
        let value = match value {
            Value::Object(mut map) if !map.contains_key("days") && map.contains_key("plan") => {
                map.remove("plan").unwrap_or(Value::Null)
            }
            other => other,
        };

        let mut value = value;
        match value.get_mut("days") {
            // Entries that are not day objects are skipped
            Some(Value::Array(days)) => days.retain(Value::is_object),
            _ => {
                return Err(PlanError::InvalidDocument {
                    reason: "missing days list".to_string(),
                })
            }
        }

        let mut document: Self =
            serde_json::from_value(value).map_err(|e| PlanError::InvalidDocument {
                reason: e.to_string(),
            })?;

        let before = document.days.len();
        document
            .days
            .retain(|day| normalize_weekday(&day.weekday).is_some());
        if document.days.len() < before {
            warn!(
                dropped = before - document.days.len(),
                "skipping days without a recognizable weekday"
            );
        }
        Ok(document)
    }

    /// Exactly one day per weekday in Mon..Sun order
    ///
    /// Days are matched by weekday label; missing days become recovery days
    /// and a later duplicate replaces an earlier one.
    pub fn normalize_week(self) -> Self {
        let mut by_day: HashMap<Weekday, DayPlan> = HashMap::new();
        for day in self.days {
            if let Some(weekday) = normalize_weekday(&day.weekday) {
                by_day.insert(weekday, day);
            }
        }

        let days = DOW_ORDER
            .iter()
            .map(|weekday| {
                by_day
                    .remove(weekday)
                    .unwrap_or_else(|| DayPlan::rest(weekday_code(*weekday)))
            })
            .collect();

        let notes = self
            .notes
            .filter(|notes| !notes.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLAN_NOTES.to_string());

        Self {
            notes: Some(notes),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{LogStatus, LoggedBlock, LoggedSet};
    use crate::models::DayKind;
    use std::cell::Cell;

    struct StubGenerator {
        name: &'static str,
        reply: Option<&'static str>,
        calls: Cell<u32>,
    }

    impl StubGenerator {
        fn new(name: &'static str, reply: Option<&'static str>) -> Self {
            Self {
                name,
                reply,
                calls: Cell::new(0),
            }
        }
    }

    impl PlanGenerator for StubGenerator {
        fn model_name(&self) -> &str {
            self.name
        }

        fn generate(&self, _context: &PlanContext) -> Result<PlanDocument, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            match self.reply {
                Some(text) => document_from_model_output(self.name, text),
                None => Err(GenerationError::ModelFailed {
                    model: self.name.to_string(),
                    reason: "status 503".to_string(),
                }),
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context() -> PlanContext {
        PlanContext::new(
            AthleteProfile::default(),
            &["monday".to_string(), "Fri".to_string()],
            Some(date(2024, 3, 4)),
            date(2024, 3, 6),
            &[],
        )
    }

    const REPLY: &str = "```json\n{\"days\": [{\"weekday\": \"Wed\", \"workouts\": [\"Run\"], \"kind\": \"main\"}]}\n```";

    #[test]
    fn test_model_output_is_normalized() {
        let doc = document_from_model_output("m", REPLY).unwrap();
        assert_eq!(doc.days.len(), 7);
        assert_eq!(doc.days[2].weekday, "Wed");
        assert_eq!(doc.days[2].kind, Some(DayKind::Main));
        assert_eq!(doc.days[0].kind, Some(DayKind::Recovery));
        assert_eq!(doc.days[6].weekday, "Sun");
        assert_eq!(doc.notes.as_deref(), Some(DEFAULT_PLAN_NOTES));
    }

    #[test]
    fn test_invalid_output() {
        assert!(matches!(
            document_from_model_output("m", "   "),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            document_from_model_output("m", "Sorry, I cannot help"),
            Err(GenerationError::ModelFailed { .. })
        ));
        assert!(PlanDocument::from_json("{\"notes\": \"x\"}").is_err());
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let value = serde_json::json!({"plan": {"notes": "n", "days": [{"weekday": "Mon"}]}});
        let doc = PlanDocument::from_value(value).unwrap();
        assert_eq!(doc.days.len(), 1);
        assert_eq!(doc.notes.as_deref(), Some("n"));
    }

    #[test]
    fn test_days_without_weekday_are_skipped() {
        let doc = PlanDocument::from_json(
            r#"{"days": [
                {"weekday": "Mon", "workouts": ["Squats: 3 sets of 5 reps"], "detailed_workouts": null},
                {"workouts": ["stray"]},
                {"weekday": "Someday"},
                "not a day"
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.days.len(), 1);
        assert_eq!(doc.days[0].weekday, "Mon");

        let week = doc.normalize_week();
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].workouts, vec!["Squats: 3 sets of 5 reps"]);
    }

    #[test]
    fn test_later_duplicate_weekday_wins() {
        let doc = PlanDocument::from_json(
            r#"{"days": [
                {"weekday": "Tue", "workouts": ["Draft"]},
                {"weekday": "Tuesday", "workouts": ["Final"]}
            ]}"#,
        )
        .unwrap()
        .normalize_week();
        assert_eq!(doc.days[1].workouts, vec!["Final"]);
    }

    #[test]
    fn test_backup_used_once() {
        let generator = FallbackGenerator::new(
            StubGenerator::new("primary", None),
            StubGenerator::new("backup", Some(REPLY)),
        );
        let doc = generator.generate(&context()).unwrap();
        assert_eq!(doc.days.len(), 7);
        assert_eq!(generator.primary.calls.get(), 1);
        assert_eq!(generator.backup.calls.get(), 1);
    }

    #[test]
    fn test_both_failing_is_connection_error() {
        let generator = FallbackGenerator::new(
            StubGenerator::new("primary", None),
            StubGenerator::new("backup", None),
        );
        let err = generator.generate(&context()).unwrap_err();
        assert!(matches!(err, GenerationError::Connection { ref primary, ref backup }
            if primary.contains("primary") && backup.contains("backup")));
    }

    #[test]
    fn test_context_days() {
        let ctx = context();
        assert_eq!(ctx.scheduling_context.current_day, "Wed");
        assert_eq!(ctx.scheduling_context.valid_days_for_workouts, vec!["Fri"]);
        assert!(!ctx.scheduling_context.is_future_plan);

        let ctx = ctx.with_adjustment("sore knee");
        assert!(ctx.scheduling_context.is_adjustment);
        assert!(ctx.to_prompt().unwrap().contains("sore knee"));
    }

    #[test]
    fn test_performance_summary() {
        assert!(performance_summary(&[]).starts_with("No previous"));

        let log = SessionLog {
            user_id: None,
            workout_date: date(2024, 3, 4),
            status: LogStatus::Completed,
            details: vec![
                LoggedBlock {
                    name: "Squat".to_string(),
                    block_type: BlockType::Exercise,
                    completed: None,
                    sets: Some(vec![LoggedSet {
                        set: 1,
                        weight: "60".to_string(),
                        reps: "5".to_string(),
                        is_bodyweight: false,
                        completed: true,
                    }]),
                },
                LoggedBlock {
                    name: "Warm Up".to_string(),
                    block_type: BlockType::Warmup,
                    completed: Some(true),
                    sets: None,
                },
            ],
        };
        assert_eq!(performance_summary(&[log]), "- Squat: [2024-03-04]: 60kg x 5 reps");
    }
}
