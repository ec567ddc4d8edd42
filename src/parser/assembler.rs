//! Sequencing of classified lines into the ordered block list of a day

use tracing::debug;

use super::classifier::{classify_line, classify_sub_workout, LineRole, SegmentKind, SubWorkoutRole};
use super::line::{clean_name, duration_seconds, ParsedExercise};
use crate::models::{Block, BlockCategory, BlockType, EnduranceMode, ExerciseSet, Focus};

/// Hands out `block-N` ids, monotonic across a whole day plan
#[derive(Debug, Default)]
pub struct BlockIdGenerator {
    next: usize,
}

impl BlockIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("block-{}", self.next);
        self.next += 1;
        id
    }

    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Builds the ordered blocks of one day plan, one sub-workout at a time
#[derive(Debug)]
pub struct BlockAssembler {
    ids: BlockIdGenerator,
    default_segment_seconds: u32,
    blocks: Vec<Block>,
}

impl BlockAssembler {
    pub fn new(default_segment_seconds: u32) -> Self {
        Self {
            ids: BlockIdGenerator::new(),
            default_segment_seconds,
            blocks: Vec::new(),
        }
    }

    /// Classify and append the blocks of one sub-workout; returns how many were added
    pub fn push_sub_workout(&mut self, title: &str, focus: &Focus, lines: &[String]) -> usize {
        if lines.is_empty() {
            debug!(title, "sub-workout has no instructions, no blocks emitted");
            return 0;
        }

        let role = classify_sub_workout(title, focus, lines);
        debug!(title, %focus, ?role, "classified sub-workout");

        let before = self.blocks.len();
        match role {
            SubWorkoutRole::Warmup(mode) => {
                let block = self.whole_block(BlockType::Warmup, "Warm Up", lines, mode, true, title);
                self.blocks.push(block);
            }
            SubWorkoutRole::Cooldown(mode) => {
                let block =
                    self.whole_block(BlockType::Cooldown, "Cool Down", lines, mode, true, title);
                self.blocks.push(block);
            }
            SubWorkoutRole::Endurance(mode) => {
                let name = clean_name(title);
                let block =
                    self.whole_block(BlockType::EnduranceSession, &name, lines, mode, false, title);
                self.blocks.push(block);
            }
            SubWorkoutRole::Lines { mobility } => {
                let category = if mobility {
                    BlockCategory::Mobility
                } else {
                    BlockCategory::Strength
                };
                let mut ctx = LineContext {
                    ids: &mut self.ids,
                    category,
                    mobility,
                    default_segment_seconds: self.default_segment_seconds,
                };
                let state = lines
                    .iter()
                    .fold(FoldState::default(), |state, line| state.step(line, &mut ctx));
                let emitted = state.finish(title, &mut ctx);
                self.blocks.extend(emitted);
            }
        }

        self.blocks.len() - before
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn finish(self) -> Vec<Block> {
        self.blocks
    }

    /// A sub-workout rendered as a single timed block holding every line
    fn whole_block(
        &mut self,
        block_type: BlockType,
        name: &str,
        lines: &[String],
        mode: EnduranceMode,
        use_default_duration: bool,
        title: &str,
    ) -> Block {
        let text = format!("{} {}", title, lines.join(" "));
        let detected = duration_seconds(&text).filter(|secs| *secs > 0);
        let duration = if use_default_duration {
            Some(detected.unwrap_or(self.default_segment_seconds))
        } else {
            detected
        };

        Block {
            id: self.ids.next_id(),
            block_type,
            category: BlockCategory::Cardio,
            name: name.to_string(),
            subtitle: Some(lines.join("\n")),
            instructions: lines.to_vec(),
            sets: Vec::new(),
            is_completed: false,
            duration_seconds: duration,
            mode: Some(mode),
        }
    }
}

struct LineContext<'a> {
    ids: &'a mut BlockIdGenerator,
    category: BlockCategory,
    mobility: bool,
    default_segment_seconds: u32,
}

/// Accumulator threaded through the instruction lines of one sub-workout
#[derive(Debug, Default)]
struct FoldState {
    current: Option<Block>,
    pending: Vec<String>,
    blocks: Vec<Block>,
}

impl FoldState {
    fn step(mut self, line: &str, ctx: &mut LineContext<'_>) -> Self {
        match classify_line(line, ctx.mobility) {
            LineRole::Segment(kind) => {
                self.close_current();
                let mut block = segment_block(kind, line, ctx);
                let mut instructions = std::mem::take(&mut self.pending);
                instructions.append(&mut block.instructions);
                block.instructions = instructions;
                self.blocks.push(block);
            }
            LineRole::Exercise(parsed) => {
                self.close_current();
                let block = exercise_block(&parsed, line, ctx);
                self.open(block);
            }
            LineRole::MobilityDrill(name) => {
                self.close_current();
                let block = mobility_block(name, line, ctx);
                self.open(block);
            }
            LineRole::Freeform => match self.current.as_mut() {
                Some(block) => block.instructions.push(line.to_string()),
                None => self.pending.push(line.to_string()),
            },
        }
        self
    }

    fn open(&mut self, mut block: Block) {
        block.instructions = std::mem::take(&mut self.pending);
        self.current = Some(block);
    }

    fn close_current(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    /// Flush the open block; leftover notes trail the last block or form a general block
    fn finish(mut self, title: &str, ctx: &mut LineContext<'_>) -> Vec<Block> {
        self.close_current();

        if !self.pending.is_empty() {
            match self.blocks.last_mut() {
                Some(last) => last.instructions.append(&mut self.pending),
                None => {
                    let notes = std::mem::take(&mut self.pending);
                    self.blocks.push(Block {
                        id: ctx.ids.next_id(),
                        block_type: BlockType::GeneralBlock,
                        category: BlockCategory::Strength,
                        name: clean_name(title),
                        subtitle: Some(notes.join("\n")),
                        instructions: notes,
                        sets: Vec::new(),
                        is_completed: false,
                        duration_seconds: None,
                        mode: None,
                    });
                }
            }
        }

        self.blocks
    }
}

fn segment_block(kind: SegmentKind, line: &str, ctx: &mut LineContext<'_>) -> Block {
    let (block_type, name) = match kind {
        SegmentKind::Warmup => (BlockType::Warmup, "Warm Up".to_string()),
        SegmentKind::Cooldown => (BlockType::Cooldown, "Cool Down".to_string()),
        SegmentKind::Cardio => {
            let label = line.split(':').next().unwrap_or_default().trim();
            let name = if label.is_empty() { "Cardio" } else { label };
            (BlockType::GeneralBlock, name.to_string())
        }
    };

    Block {
        id: ctx.ids.next_id(),
        block_type,
        category: BlockCategory::Cardio,
        name,
        subtitle: Some(line.to_string()),
        instructions: vec![line.to_string()],
        sets: Vec::new(),
        is_completed: false,
        duration_seconds: Some(
            duration_seconds(line)
                .filter(|secs| *secs > 0)
                .unwrap_or(ctx.default_segment_seconds),
        ),
        mode: Some(EnduranceMode::General),
    }
}

fn exercise_block(parsed: &ParsedExercise, line: &str, ctx: &mut LineContext<'_>) -> Block {
    debug!(
        name = %parsed.name,
        sets = parsed.sets,
        reps = %parsed.reps,
        weight = %parsed.weight,
        unit = ?parsed.weight_unit,
        "parsed exercise line"
    );

    Block {
        id: ctx.ids.next_id(),
        block_type: BlockType::Exercise,
        category: ctx.category,
        name: parsed.name.clone(),
        subtitle: Some(line.to_string()),
        instructions: Vec::new(),
        sets: parsed.build_sets(),
        is_completed: false,
        duration_seconds: None,
        mode: None,
    }
}

fn mobility_block(name: String, line: &str, ctx: &mut LineContext<'_>) -> Block {
    Block {
        id: ctx.ids.next_id(),
        block_type: BlockType::Exercise,
        category: BlockCategory::Mobility,
        name,
        subtitle: Some(line.to_string()),
        instructions: Vec::new(),
        sets: vec![ExerciseSet {
            set_number: 1,
            weight: String::new(),
            reps: "1".to_string(),
            is_bodyweight: true,
            completed: false,
        }],
        is_completed: false,
        duration_seconds: None,
        mode: None,
    }
}
