use chrono::NaiveDate;
use coachrs::database::Database;
use coachrs::error::{CoachError, PlanError};
use coachrs::generator::document_from_model_output;
use coachrs::history::LogStatus;
use coachrs::models::{BlockType, WeekPlan};
use coachrs::parser::WorkoutParser;
use coachrs::schedule::day_plan_for_date;
use coachrs::session::WorkoutSession;
use tempfile::TempDir;

/// Week plan and workout log persistence against an on-disk database

const MODEL_REPLY: &str = r#"Here you go:
```json
{
  "notes": "Build week",
  "days": [
    {"weekday": "Mon", "kind": "main", "workouts": ["Legs"],
     "detailed_workouts": [{"title": "Legs", "focus": "strength",
       "instructions": ["Squat: 3 sets of 5 reps", "Lunges: 2 sets of 10 reps"]}]},
    {"weekday": "Wednesday", "kind": "main", "workouts": ["Run"],
     "detailed_workouts": [{"title": "Tempo Run", "focus": "cardio",
       "instructions": ["Running: 25 min tempo"]}]}
  ]
}
```"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(dir: &TempDir) -> Database {
    Database::new(dir.path().join("data").join("coachrs.db")).unwrap()
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn test_plan_roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let document = document_from_model_output("test-model", MODEL_REPLY).unwrap();

        {
            let mut db = open(&dir);
            db.store_week_plan(&WeekPlan {
                user_id: "u1".to_string(),
                week_start_date: Some(date(2024, 3, 4)),
                plan: document,
            })
            .unwrap();
        }

        let db = open(&dir);
        let plans = db.week_plans("u1").unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].plan.days.len(), 7);
        assert_eq!(plans[0].plan.notes.as_deref(), Some("Build week"));

        let wednesday = day_plan_for_date(&plans, "u1", date(2024, 3, 6)).unwrap();
        let data = WorkoutParser::new().parse(wednesday);
        assert!(data.is_pure_endurance_day);
        assert_eq!(data.blocks[0].duration_seconds, Some(1500));

        let tuesday = day_plan_for_date(&plans, "u1", date(2024, 3, 5)).unwrap();
        assert!(WorkoutParser::new().parse(tuesday).blocks.is_empty());
    }

    #[test]
    fn test_missing_day_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let mut document = document_from_model_output("test-model", MODEL_REPLY).unwrap();
        document.days.retain(|d| d.weekday != "Fri");
        db.store_week_plan(&WeekPlan {
            user_id: "u1".to_string(),
            week_start_date: Some(date(2024, 3, 4)),
            plan: document,
        })
        .unwrap();

        let plans = db.week_plans("u1").unwrap();
        let err = day_plan_for_date(&plans, "u1", date(2024, 3, 8)).unwrap_err();
        assert!(matches!(err, PlanError::DayPlanUnavailable { .. }));
        assert_eq!(CoachError::from(err).user_message(), "Workout data unavailable.");

        let err = day_plan_for_date(&db.week_plans("u2").unwrap(), "u2", date(2024, 3, 8)).unwrap_err();
        assert!(matches!(err, PlanError::NoWeekPlan { .. }));
    }

    #[test]
    fn test_finished_session_is_loaded_as_history() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let document = document_from_model_output("test-model", MODEL_REPLY).unwrap();
        let monday = document.days[0].clone();

        let mut session = WorkoutSession::new(WorkoutParser::new().parse(&monday));
        for set in 1..=3 {
            session.set_weight("block-0", set, "80").unwrap();
            session.toggle_set("block-0", set).unwrap();
        }
        db.upsert_log("u1", &session.to_log("u1", date(2024, 3, 4))).unwrap();

        let stored = db.load_log("u1", date(2024, 3, 4)).unwrap().unwrap();
        assert_eq!(stored.status, LogStatus::Completed);
        assert_eq!(stored.details.len(), 2);
        assert_eq!(stored.details[0].block_type, BlockType::Exercise);
        assert_eq!(stored.details[0].sets.as_ref().unwrap().len(), 3);

        let logs = db.recent_completed_logs("u1", 5).unwrap();
        let next = WorkoutParser::new().parse_with_history(&monday, &logs);
        assert!(next.blocks[0].sets.iter().all(|s| s.weight == "80"));
        assert!(next.blocks[1].sets.iter().all(|s| s.weight.is_empty()));
    }
}
