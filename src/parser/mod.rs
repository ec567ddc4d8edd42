//! Free-text workout plan parser
//!
//! Turns a generated day plan into typed, trackable blocks:
//! classification of sub-workouts and lines, extraction of sets/reps/weight,
//! assembly into an ordered block list and optional weight carry-forward
//! from completed history.

use tracing::{info, warn};

use crate::config::ParserSettings;
use crate::error::PlanError;
use crate::history::{HistoryIndex, SessionLog};
use crate::models::{DayPlan, Focus, SubWorkout, WorkoutData};

pub mod assembler;
pub mod classifier;
pub mod line;
pub mod patterns;

pub use assembler::{BlockAssembler, BlockIdGenerator};
pub use classifier::{classify_line, classify_sub_workout, LineRole, SegmentKind, SubWorkoutRole};
pub use line::{clean_name, duration_seconds, parse_exercise_line, ParsedExercise, WeightUnit};

/// Title given to the sub-workout synthesized from summary lines
pub const SYNTHETIC_TITLE: &str = "Workout";

/// Parser for generated day plans
#[derive(Debug, Clone, Default)]
pub struct WorkoutParser {
    settings: ParserSettings,
}

impl WorkoutParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ParserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Parse a day plan into blocks
    ///
    /// Sub-workouts without an instruction list are skipped.
    pub fn parse(&self, day_plan: &DayPlan) -> WorkoutData {
        let sources = source_sub_workouts(day_plan);
        let mut assembler = BlockAssembler::new(self.settings.default_segment_seconds);

        for sub in &sources {
            let focus = self.focus_of(sub);
            match &sub.instructions {
                Some(lines) => {
                    assembler.push_sub_workout(&sub.title, &focus, lines);
                }
                None => warn!(title = %sub.title, "skipping sub-workout without instructions"),
            }
        }

        let blocks = assembler.finish();
        let is_pure_endurance_day = self.is_pure_endurance(&sources);

        info!(
            weekday = %day_plan.weekday,
            sub_workouts = sources.len(),
            blocks = blocks.len(),
            pure_endurance = is_pure_endurance_day,
            "parsed day plan"
        );

        WorkoutData {
            day_plan: day_plan.clone(),
            general_notes: general_notes(&sources),
            blocks,
            is_pure_endurance_day,
        }
    }

    /// Like `parse`, but a sub-workout without an instruction list is an error
    pub fn parse_strict(&self, day_plan: &DayPlan) -> Result<WorkoutData, PlanError> {
        if let Some(sub) = day_plan
            .detailed_workouts
            .iter()
            .find(|sub| sub.instructions.is_none())
        {
            return Err(PlanError::MissingInstructions {
                title: sub.title.clone(),
            });
        }
        Ok(self.parse(day_plan))
    }

    /// Parse and back-fill blank weights from completed history (newest first)
    pub fn parse_with_history(&self, day_plan: &DayPlan, logs: &[SessionLog]) -> WorkoutData {
        let mut data = self.parse(day_plan);
        if self.settings.history_enabled && !logs.is_empty() {
            let index = HistoryIndex::from_logs(logs, self.settings.history_depth);
            let filled = index.merge_into(&mut data.blocks);
            info!(exercises = index.len(), sets_filled = filled, "merged workout history");
        }
        data
    }

    fn focus_of(&self, sub: &SubWorkout) -> Focus {
        sub.focus
            .clone()
            .unwrap_or_else(|| self.settings.default_focus.clone())
    }

    /// A day with cardio focus and no strength focus anywhere
    fn is_pure_endurance(&self, sources: &[SubWorkout]) -> bool {
        let foci: Vec<Focus> = sources.iter().map(|sub| self.focus_of(sub)).collect();
        let has_cardio = foci.iter().any(Focus::is_cardio);
        let has_strength = foci.iter().any(Focus::is_strength);
        has_cardio && !has_strength
    }
}

/// Detailed sub-workouts, or one synthesized from the summary lines
fn source_sub_workouts(day_plan: &DayPlan) -> Vec<SubWorkout> {
    if day_plan.detailed_workouts.is_empty() && !day_plan.workouts.is_empty() {
        return vec![SubWorkout::new(
            SYNTHETIC_TITLE,
            Some(Focus::Mixed),
            day_plan.workouts.clone(),
        )];
    }
    day_plan.detailed_workouts.clone()
}

fn general_notes(sources: &[SubWorkout]) -> String {
    sources
        .iter()
        .filter_map(|sub| sub.notes.as_deref())
        .map(str::trim)
        .filter(|note| !note.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
