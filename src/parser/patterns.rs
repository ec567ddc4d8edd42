//! Compiled patterns and keyword tables for workout text recognition

use regex::Regex;
use std::sync::LazyLock;

/// `"<Name>[:|-] <N> sets|x|rounds"`, name first
pub static NAME_FIRST_SETS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)(?::|-)?\s+(\d+)\s*(?:sets|x|rounds)").expect("valid name-first regex")
});

/// `"<N> sets [of] <Name...>"`, count first
pub static COUNT_FIRST_SETS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*sets\s+(?:of\s+)?(.*)").expect("valid count-first regex")
});

/// Single rep count or `low-high` range
pub static REPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:-\d+)?)\s*reps").expect("valid reps regex"));

/// Load magnitude with kg/lbs unit
pub static WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|lbs)").expect("valid weight regex")
});

/// Time token used as a reps fallback on exercise lines
pub static SET_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:sec|min)").expect("valid set time regex"));

pub static MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:minutes|minute|mins|min)\b").expect("valid minutes regex")
});

pub static SECONDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:seconds|second|secs|sec|s)\b").expect("valid seconds regex")
});

/// Line opening with a time expression ("5 min brisk walk")
pub static LEADING_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(?:minutes|minute|mins|min|seconds|second|secs|sec)")
        .expect("valid leading time regex")
});

/// Numbered-list marker ("1. ")
pub static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid list marker regex"));

pub static LEADING_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*of\s+").expect("valid leading of regex"));

/// Sub-workout level endurance keywords (matched as substrings)
pub const ENDURANCE_KEYWORDS: [&str; 12] = [
    "run",
    "jog",
    "treadmill",
    "cycl",
    "bik",
    "rid",
    "swim",
    "pool",
    "freestyle",
    "cardio",
    "elliptical",
    "rowing",
];

/// Markers that a text describes sets and reps rather than a steady session
pub const STRENGTH_MARKERS: [&str; 2] = ["sets of", " x "];

pub const SWIM_KEYWORDS: [&str; 3] = ["swim", "pool", "freestyle"];
pub const BIKE_KEYWORDS: [&str; 3] = ["cycl", "bik", "rid"];
pub const RUN_KEYWORDS: [&str; 3] = ["run", "jog", "treadmill"];

/// Line level activity keywords for embedded cardio segments
pub const LINE_CARDIO_KEYWORDS: [&str; 7] = [
    "cardio",
    "treadmill",
    "run",
    "walk",
    "jog",
    "cycle",
    "rowing",
];

pub const WARMUP_PHRASES: [&str; 2] = ["warm-up", "warm up"];
pub const COOLDOWN_PHRASES: [&str; 2] = ["cool-down", "cool down"];

/// Substring test against an already lowercased haystack
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_first_pattern() {
        let caps = NAME_FIRST_SETS_RE.captures("Squats: 3 sets of 8 reps").unwrap();
        assert_eq!(&caps[1], "Squats");
        assert_eq!(&caps[2], "3");

        let caps = NAME_FIRST_SETS_RE.captures("Deadlift 5x5 @ 100kg").unwrap();
        assert_eq!(&caps[1], "Deadlift");
        assert_eq!(&caps[2], "5");

        assert!(NAME_FIRST_SETS_RE.captures("Walk for a while").is_none());
    }

    #[test]
    fn test_count_first_pattern() {
        let caps = COUNT_FIRST_SETS_RE.captures("4 sets of Push Ups").unwrap();
        assert_eq!(&caps[1], "4");
        assert_eq!(&caps[2], "Push Ups");
    }

    #[test]
    fn test_time_patterns() {
        assert_eq!(&MINUTES_RE.captures("30 minutes easy").unwrap()[1], "30");
        assert_eq!(&MINUTES_RE.captures("run 20min").unwrap()[1], "20");
        assert_eq!(&SECONDS_RE.captures("hold 45s").unwrap()[1], "45");
        assert!(SECONDS_RE.captures("3 sets").is_none());
        assert!(LEADING_TIME_RE.is_match("5 min brisk walk"));
        assert!(!LEADING_TIME_RE.is_match("brisk walk 5 min"));
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("easy treadmill jog", &RUN_KEYWORDS));
        assert!(!contains_any("bench press", &ENDURANCE_KEYWORDS));
    }
}
