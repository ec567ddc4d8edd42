//! Week layout: weekday labels, week boundaries and day plan lookup

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::debug;

use crate::error::PlanError;
use crate::models::{DayPlan, PlanDocument, WeekPlan};

/// Canonical weekday order of a plan document
pub const DOW_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekday from a free-form label ("monday", "Mon.", "MON") by its first three letters
pub fn normalize_weekday(label: &str) -> Option<Weekday> {
    let prefix: String = label.trim().chars().take(3).collect::<String>().to_lowercase();
    match prefix.as_str() {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Three-letter label used in plan documents ("Mon")
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Most recent `week_start` day on or before `date`
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date - Duration::days(offset as i64)
}

/// Calendar date of `day` within the week starting on `week_start_date`
pub fn date_for_weekday(week_start_date: NaiveDate, week_start: Weekday, day: Weekday) -> NaiveDate {
    let offset = (7 + day.num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    week_start_date + Duration::days(offset as i64)
}

/// Training days still usable in a week
///
/// A week starting after `today` keeps every requested day. For the current
/// (or a past) week only days from today onwards in Mon..Sun order remain.
pub fn effective_training_days(
    requested: &[Weekday],
    week_start_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<Weekday> {
    if week_start_date.is_some_and(|start| start > today) {
        return requested.to_vec();
    }

    let today_index = today.weekday().num_days_from_monday();
    requested
        .iter()
        .copied()
        .filter(|day| day.num_days_from_monday() >= today_index)
        .collect()
}

/// Week plan covering `date` from plans ordered newest first
///
/// Falls back to the newest plan when none covers the date. Plans without a
/// start date never match but can still be the fallback.
pub fn select_week_plan(plans: &[WeekPlan], date: NaiveDate) -> Option<&WeekPlan> {
    let covering = plans.iter().find(|plan| {
        plan.week_start_date
            .is_some_and(|start| date >= start && date < start + Duration::days(7))
    });

    if covering.is_none() && !plans.is_empty() {
        debug!(%date, "no week plan covers date, using newest");
    }

    covering.or_else(|| plans.first())
}

/// Day plan whose label starts with the date's weekday code
pub fn find_day_plan(document: &PlanDocument, date: NaiveDate) -> Result<&DayPlan, PlanError> {
    let code = weekday_code(date.weekday()).to_lowercase();

    document
        .days
        .iter()
        .find(|day| day.weekday.to_lowercase().starts_with(&code))
        .ok_or_else(|| PlanError::DayPlanUnavailable {
            weekday: weekday_code(date.weekday()).to_string(),
            date,
        })
}

/// Day plan for `date` from the user's stored plans (newest first)
pub fn day_plan_for_date<'a>(
    plans: &'a [WeekPlan],
    user_id: &str,
    date: NaiveDate,
) -> Result<&'a DayPlan, PlanError> {
    let plan = select_week_plan(plans, date).ok_or_else(|| PlanError::NoWeekPlan {
        user_id: user_id.to_string(),
    })?;
    find_day_plan(&plan.plan, date)
}
