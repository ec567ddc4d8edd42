//! Semantic role assignment for sub-workouts and instruction lines

use super::line::{mobility_drill_name, parse_exercise_line, ParsedExercise};
use super::patterns::{
    contains_any, BIKE_KEYWORDS, COOLDOWN_PHRASES, ENDURANCE_KEYWORDS, LEADING_TIME_RE,
    LINE_CARDIO_KEYWORDS, LIST_MARKER_RE, RUN_KEYWORDS, STRENGTH_MARKERS, SWIM_KEYWORDS,
    WARMUP_PHRASES,
};
use crate::models::{EnduranceMode, Focus};

/// Role of a whole sub-workout, first matching rule wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubWorkoutRole {
    Warmup(EnduranceMode),
    Cooldown(EnduranceMode),
    Endurance(EnduranceMode),
    /// Every line is classified on its own; `mobility` enables the drill rule
    Lines { mobility: bool },
}

/// Kind of a time-based segment carved out of an exercise list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Warmup,
    Cooldown,
    Cardio,
}

/// Role of a single instruction line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRole {
    Segment(SegmentKind),
    Exercise(ParsedExercise),
    MobilityDrill(String),
    Freeform,
}

/// Lowercased title plus all instruction lines, space separated
pub fn combined_text(title: &str, lines: &[String]) -> String {
    format!("{} {}", title, lines.join(" ")).to_lowercase()
}

/// Endurance mode by keyword priority: swim, then bike, then run
pub fn detect_mode(text_lower: &str) -> EnduranceMode {
    if contains_any(text_lower, &SWIM_KEYWORDS) {
        EnduranceMode::Swim
    } else if contains_any(text_lower, &BIKE_KEYWORDS) {
        EnduranceMode::Bike
    } else if contains_any(text_lower, &RUN_KEYWORDS) {
        EnduranceMode::Run
    } else {
        EnduranceMode::General
    }
}

pub fn classify_sub_workout(title: &str, focus: &Focus, lines: &[String]) -> SubWorkoutRole {
    let title_lower = title.to_lowercase();
    let full_text = combined_text(title, lines);
    let is_mobility = *focus == Focus::Mobility;

    if !is_mobility && title_lower.contains("warm") {
        return SubWorkoutRole::Warmup(detect_mode(&full_text));
    }

    if !is_mobility && (title_lower.contains("cool") || title_lower.contains("stretch")) {
        return SubWorkoutRole::Cooldown(detect_mode(&full_text));
    }

    let mentions_endurance = contains_any(&full_text, &ENDURANCE_KEYWORDS) || focus.is_cardio();
    if mentions_endurance && !contains_any(&full_text, &STRENGTH_MARKERS) {
        return SubWorkoutRole::Endurance(detect_mode(&full_text));
    }

    SubWorkoutRole::Lines {
        mobility: is_mobility,
    }
}

/// Classify one line of a non-endurance, non-warmup/cooldown sub-workout
pub fn classify_line(line: &str, mobility: bool) -> LineRole {
    if let Some(kind) = segment_kind(line) {
        return LineRole::Segment(kind);
    }

    if let Some(parsed) = parse_exercise_line(line) {
        return LineRole::Exercise(parsed);
    }

    if mobility && (LIST_MARKER_RE.is_match(line) || line.trim().chars().count() > 3) {
        return LineRole::MobilityDrill(mobility_drill_name(line));
    }

    LineRole::Freeform
}

fn segment_kind(line: &str) -> Option<SegmentKind> {
    let lower = line.trim_start().to_lowercase();

    if contains_any(&lower, &WARMUP_PHRASES) {
        Some(SegmentKind::Warmup)
    } else if contains_any(&lower, &COOLDOWN_PHRASES) {
        Some(SegmentKind::Cooldown)
    } else if LEADING_TIME_RE.is_match(&lower) && contains_any(&lower, &LINE_CARDIO_KEYWORDS) {
        Some(SegmentKind::Cardio)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_warmup_title() {
        let role = classify_sub_workout("Warm-Up", &Focus::Strength, &lines(&["5 min jog"]));
        assert_eq!(role, SubWorkoutRole::Warmup(EnduranceMode::Run));
    }

    #[test]
    fn test_mobility_focus_overrides_title() {
        let role = classify_sub_workout(
            "Stretch & Warm Flow",
            &Focus::Mobility,
            &lines(&["1. Cat-Cow", "2. Pigeon Pose"]),
        );
        assert_eq!(role, SubWorkoutRole::Lines { mobility: true });
    }

    #[test]
    fn test_cooldown_title() {
        let role = classify_sub_workout("Cool Down", &Focus::Mixed, &lines(&["Easy walk"]));
        assert_eq!(role, SubWorkoutRole::Cooldown(EnduranceMode::General));
    }

    #[test]
    fn test_endurance_from_instruction_keyword() {
        let role = classify_sub_workout(
            "Zone 2",
            &Focus::Mixed,
            &lines(&["Outdoor ride at conversational pace"]),
        );
        assert_eq!(role, SubWorkoutRole::Endurance(EnduranceMode::Bike));
    }

    #[test]
    fn test_endurance_from_cardio_focus() {
        let role = classify_sub_workout("Session", &Focus::Cardio, &lines(&["45 min easy"]));
        assert_eq!(role, SubWorkoutRole::Endurance(EnduranceMode::General));
    }

    #[test]
    fn test_strength_marker_blocks_endurance() {
        let role = classify_sub_workout(
            "Conditioning",
            &Focus::Cardio,
            &lines(&["Rowing intervals: 4 sets of 500m"]),
        );
        assert_eq!(role, SubWorkoutRole::Lines { mobility: false });
    }

    #[test]
    fn test_mode_priority() {
        assert_eq!(detect_mode("run to the pool then swim"), EnduranceMode::Swim);
        assert_eq!(detect_mode("bike then run"), EnduranceMode::Bike);
        assert_eq!(detect_mode("treadmill"), EnduranceMode::Run);
        assert_eq!(detect_mode("elliptical"), EnduranceMode::General);
    }

    #[test]
    fn test_line_segments() {
        assert_eq!(
            classify_line("5 min brisk walk warm-up", false),
            LineRole::Segment(SegmentKind::Warmup)
        );
        assert_eq!(
            classify_line("Cool down: easy stretching", false),
            LineRole::Segment(SegmentKind::Cooldown)
        );
        assert_eq!(
            classify_line("10 minutes treadmill incline walk", false),
            LineRole::Segment(SegmentKind::Cardio)
        );
        // time without an activity keyword is not a segment
        assert_eq!(classify_line("60 sec rest between sets", false), LineRole::Freeform);
    }

    #[test]
    fn test_segment_wins_over_set_pattern() {
        assert_eq!(
            classify_line("Warm up: 2 sets of 10 air squats", false),
            LineRole::Segment(SegmentKind::Warmup)
        );
    }

    #[test]
    fn test_mobility_drill_rule_is_permissive() {
        assert_eq!(
            classify_line("Keep your breathing slow", true),
            LineRole::MobilityDrill("Keep your breathing slow".to_string())
        );
        assert_eq!(classify_line("ok", true), LineRole::Freeform);
        assert_eq!(classify_line("Keep your breathing slow", false), LineRole::Freeform);
    }
}
