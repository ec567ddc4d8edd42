//! Extraction of exercise details from a single instruction line

use serde::{Deserialize, Serialize};

use super::patterns::{
    COUNT_FIRST_SETS_RE, LEADING_OF_RE, LIST_MARKER_RE, MINUTES_RE, NAME_FIRST_SETS_RE,
    REPS_RE, SECONDS_RE, SET_TIME_RE, WEIGHT_RE,
};
use crate::models::ExerciseSet;

/// Largest set count accepted from a line; larger counts fall through to freeform
pub const MAX_SET_COUNT: u32 = 100;

/// Unit attached to a matched load token
///
/// Only reported for diagnostics; sets keep the bare magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

/// A strength/set-count line broken into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExercise {
    pub name: String,
    pub sets: u32,
    /// Rep count, rep range or fallback time token; empty when none was found
    pub reps: String,
    /// Load magnitude without unit; empty when none was found
    pub weight: String,
    pub weight_unit: Option<WeightUnit>,
}

impl ParsedExercise {
    /// Seed `sets` identical sets from the extracted values
    pub fn build_sets(&self) -> Vec<ExerciseSet> {
        (1..=self.sets)
            .map(|n| ExerciseSet::new(n, self.weight.clone(), self.reps.clone()))
            .collect()
    }

    pub fn is_bodyweight(&self) -> bool {
        self.weight.is_empty()
    }
}

/// Strip a single trailing `:` or `-` and surrounding whitespace
pub fn clean_name(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(':')
        .or_else(|| trimmed.strip_suffix('-'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Parse a line matching either the name-first or the count-first set pattern
///
/// A set count outside `1..=MAX_SET_COUNT` is treated as no match.
pub fn parse_exercise_line(line: &str) -> Option<ParsedExercise> {
    parse_name_first(line).or_else(|| parse_count_first(line))
}

fn parse_name_first(line: &str) -> Option<ParsedExercise> {
    let caps = NAME_FIRST_SETS_RE.captures(line)?;
    let sets = parse_set_count(&caps[2])?;
    let (weight, weight_unit) = extract_weight(line);

    Some(ParsedExercise {
        name: name_or_line(clean_name(&caps[1]), line),
        sets,
        reps: extract_reps(line),
        weight,
        weight_unit,
    })
}

fn parse_count_first(line: &str) -> Option<ParsedExercise> {
    let caps = COUNT_FIRST_SETS_RE.captures(line)?;
    let sets = parse_set_count(&caps[1])?;
    let remainder = caps.get(2).map_or("", |m| m.as_str());
    let (weight, weight_unit) = extract_weight(remainder);

    let without_reps = REPS_RE.replace(remainder, "");
    let without_load = WEIGHT_RE.replace(&without_reps, "");
    let name = LEADING_OF_RE.replace(&without_load, "");

    Some(ParsedExercise {
        name: name_or_line(clean_name(&name), line),
        sets,
        reps: extract_reps(remainder),
        weight,
        weight_unit,
    })
}

fn parse_set_count(digits: &str) -> Option<u32> {
    digits
        .parse::<u32>()
        .ok()
        .filter(|count| (1..=MAX_SET_COUNT).contains(count))
}

fn name_or_line(name: String, line: &str) -> String {
    if name.is_empty() {
        line.trim().to_string()
    } else {
        name
    }
}

/// Rep count/range, else the raw time token ("30 sec"), else empty
fn extract_reps(text: &str) -> String {
    if let Some(caps) = REPS_RE.captures(text) {
        return caps[1].to_string();
    }
    SET_TIME_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn extract_weight(text: &str) -> (String, Option<WeightUnit>) {
    match WEIGHT_RE.captures(text) {
        Some(caps) => {
            let unit = if caps[2].eq_ignore_ascii_case("kg") {
                WeightUnit::Kg
            } else {
                WeightUnit::Lbs
            };
            (caps[1].to_string(), Some(unit))
        }
        None => (String::new(), None),
    }
}

/// Name of a mobility drill: list marker removed, text before any colon
///
/// Falls back to the trimmed line when that leaves nothing.
pub fn mobility_drill_name(line: &str) -> String {
    let unmarked = LIST_MARKER_RE.replace(line.trim_start(), "");
    let name = unmarked
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    name_or_line(name, line)
}

/// Authoritative duration of a segment: first minute token, else first second token
pub fn duration_seconds(text: &str) -> Option<u32> {
    if let Some(caps) = MINUTES_RE.captures(text) {
        return caps[1].parse::<u32>().ok().map(|m| m.saturating_mul(60));
    }
    SECONDS_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Squats:"), "Squats");
        assert_eq!(clean_name("  Bench Press - "), "Bench Press");
        assert_eq!(clean_name("Row::"), "Row:");
        assert_eq!(clean_name("Plank"), "Plank");
    }

    #[test]
    fn test_name_first_with_range() {
        let parsed = parse_exercise_line("Romanian Deadlift 3 sets of 8-12 reps").unwrap();
        assert_eq!(parsed.name, "Romanian Deadlift");
        assert_eq!(parsed.sets, 3);
        assert_eq!(parsed.reps, "8-12");
        assert!(parsed.is_bodyweight());
    }

    #[test]
    fn test_weight_is_kept_without_unit() {
        let parsed = parse_exercise_line("Bench Press: 4 sets of 6 reps at 62.5 kg").unwrap();
        assert_eq!(parsed.weight, "62.5");
        assert_eq!(parsed.weight_unit, Some(WeightUnit::Kg));

        let parsed = parse_exercise_line("Deadlift 5x5 225lbs").unwrap();
        assert_eq!(parsed.weight, "225");
        assert_eq!(parsed.weight_unit, Some(WeightUnit::Lbs));
        assert_eq!(parsed.reps, "");
    }

    #[test]
    fn test_time_token_fallback() {
        let parsed = parse_exercise_line("Plank: 3 sets of 30 sec holds").unwrap();
        assert_eq!(parsed.reps, "30 sec");
        assert_eq!(parsed.sets, 3);
    }

    #[test]
    fn test_count_first() {
        let parsed = parse_exercise_line("3 sets of 10 reps Goblet Squat 20kg").unwrap();
        assert_eq!(parsed.name, "Goblet Squat");
        assert_eq!(parsed.sets, 3);
        assert_eq!(parsed.reps, "10");
        assert_eq!(parsed.weight, "20");
    }

    #[test]
    fn test_count_first_without_name_falls_back_to_line() {
        let parsed = parse_exercise_line("3 sets of 10 reps").unwrap();
        assert_eq!(parsed.name, "3 sets of 10 reps");
    }

    #[test]
    fn test_zero_or_oversized_counts_do_not_match() {
        assert!(parse_exercise_line("Squats: 0 sets").is_none());
        assert!(parse_exercise_line("Squats: 99999999999 sets").is_none());
        assert!(parse_exercise_line("Squats: 3000000000 sets").is_none());
        assert_eq!(parse_exercise_line("Burpees 100 rounds").map(|p| p.sets), Some(100));
        assert!(parse_exercise_line("Focus on slow eccentrics").is_none());
    }

    #[test]
    fn test_build_sets() {
        let parsed = parse_exercise_line("Push Ups: 4 sets of 12 reps").unwrap();
        let sets = parsed.build_sets();
        assert_eq!(sets.len(), 4);
        assert_eq!(sets[3].set_number, 4);
        assert!(sets.iter().all(|s| s.reps == "12" && s.weight.is_empty() && s.is_bodyweight));
        assert!(sets.iter().all(|s| !s.completed));
    }

    #[test]
    fn test_mobility_drill_name() {
        assert_eq!(mobility_drill_name("1. Pigeon Pose: 60s each side"), "Pigeon Pose");
        assert_eq!(mobility_drill_name("Cat-Cow"), "Cat-Cow");
    }

    #[test]
    fn test_mobility_drill_name_never_empty() {
        assert_eq!(mobility_drill_name("1. "), "1.");
        assert_eq!(mobility_drill_name(": breathe deeply"), ": breathe deeply");
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(duration_seconds("Running: 30 min steady state"), Some(1800));
        assert_eq!(duration_seconds("hold for 45 sec"), Some(45));
        assert_eq!(duration_seconds("90 seconds then 2 minutes"), Some(120));
        assert_eq!(duration_seconds("easy spin"), None);
    }
}
