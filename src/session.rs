//! A workout session in progress: the parsed blocks plus user edits
//!
//! After construction only set fields and block completion change. Finishing
//! a session flattens it into the persisted log shape.

use chrono::NaiveDate;

use crate::error::{CoachError, Result};
use crate::history::{LogStatus, LoggedBlock, LoggedSet, SessionLog};
use crate::models::{Block, ExerciseSet, WorkoutData};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    data: WorkoutData,
}

impl WorkoutSession {
    pub fn new(data: WorkoutData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &WorkoutData {
        &self.data
    }

    pub fn blocks(&self) -> &[Block] {
        &self.data.blocks
    }

    pub fn into_data(self) -> WorkoutData {
        self.data
    }

    /// Flip a set's completion, returning the new state
    pub fn toggle_set(&mut self, block_id: &str, set_number: u32) -> Result<bool> {
        let set = self.set_mut(block_id, set_number)?;
        set.completed = !set.completed;
        Ok(set.completed)
    }

    pub fn set_weight(&mut self, block_id: &str, set_number: u32, weight: &str) -> Result<()> {
        let set = self.set_mut(block_id, set_number)?;
        set.weight = weight.trim().to_string();
        Ok(())
    }

    pub fn set_reps(&mut self, block_id: &str, set_number: u32, reps: &str) -> Result<()> {
        let set = self.set_mut(block_id, set_number)?;
        set.reps = reps.trim().to_string();
        Ok(())
    }

    /// Switching a set to bodyweight clears its weight
    pub fn set_bodyweight(&mut self, block_id: &str, set_number: u32, bodyweight: bool) -> Result<()> {
        let set = self.set_mut(block_id, set_number)?;
        set.is_bodyweight = bodyweight;
        if bodyweight {
            set.weight.clear();
        }
        Ok(())
    }

    /// Flip completion of a non-exercise block, returning the new state
    pub fn toggle_block(&mut self, block_id: &str) -> Result<bool> {
        let block = self.non_exercise_block_mut(block_id)?;
        block.is_completed = !block.is_completed;
        Ok(block.is_completed)
    }

    /// Mark a non-exercise block (e.g. a finished endurance timer) as done
    pub fn complete_block(&mut self, block_id: &str) -> Result<()> {
        self.non_exercise_block_mut(block_id)?.is_completed = true;
        Ok(())
    }

    /// Rounded share of completed trackables; each set or non-exercise block is one
    pub fn progress_percent(&self) -> u8 {
        let (total, done) = self.data.blocks.iter().fold((0usize, 0usize), |(t, d), block| {
            (t + block.trackables(), d + block.completed_trackables())
        });

        if total == 0 {
            return 0;
        }
        ((done as f64 / total as f64) * 100.0).round() as u8
    }

    /// Flatten into the persisted log shape
    pub fn to_log(&self, user_id: &str, workout_date: NaiveDate) -> SessionLog {
        let details = self
            .data
            .blocks
            .iter()
            .map(|block| {
                if block.is_exercise() {
                    LoggedBlock {
                        name: block.name.clone(),
                        block_type: block.block_type,
                        completed: None,
                        sets: Some(block.sets.iter().map(logged_set).collect()),
                    }
                } else {
                    LoggedBlock {
                        name: block.name.clone(),
                        block_type: block.block_type,
                        completed: Some(block.is_completed),
                        sets: None,
                    }
                }
            })
            .collect();

        SessionLog {
            user_id: Some(user_id.to_string()),
            workout_date,
            status: LogStatus::Completed,
            details,
        }
    }

    fn block_mut(&mut self, block_id: &str) -> Result<&mut Block> {
        self.data
            .blocks
            .iter_mut()
            .find(|block| block.id == block_id)
            .ok_or_else(|| CoachError::Validation(format!("Unknown block: {}", block_id)))
    }

    fn non_exercise_block_mut(&mut self, block_id: &str) -> Result<&mut Block> {
        let block = self.block_mut(block_id)?;
        if block.is_exercise() {
            return Err(CoachError::Validation(format!(
                "Block {} is tracked per set",
                block_id
            )));
        }
        Ok(block)
    }

    fn set_mut(&mut self, block_id: &str, set_number: u32) -> Result<&mut ExerciseSet> {
        let block = self.block_mut(block_id)?;
        if !block.is_exercise() {
            return Err(CoachError::Validation(format!(
                "Block {} has no sets",
                block_id
            )));
        }
        block
            .sets
            .iter_mut()
            .find(|set| set.set_number == set_number)
            .ok_or_else(|| {
                CoachError::Validation(format!("Block {} has no set {}", block_id, set_number))
            })
    }
}

fn logged_set(set: &ExerciseSet) -> LoggedSet {
    LoggedSet {
        set: set.set_number,
        weight: set.weight.clone(),
        reps: set.reps.clone(),
        is_bodyweight: set.is_bodyweight,
        completed: set.completed,
    }
}
