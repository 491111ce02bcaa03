use std::collections::VecDeque;
use std::fmt;

use crate::instruction::Instruction;
use crate::viewpoint::ViewPoint;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("state id mismatch: expected {expected}, found {found}")]
    IdMismatch { expected: u32, found: u32 },
    #[error("state {id} failed its integrity check")]
    Corrupt { id: u32 },
    #[error("instruction {index} is malformed: {reason}")]
    InvalidInstruction { index: usize, reason: &'static str },
    #[error("bad protocol header")]
    BadHeader,
    #[error("unexpected `{0}` packet")]
    UnexpectedPacket(&'static str),
}

/// State that a remote client keeps in sync with the server.
///
/// `merge` is called on the freshly received value with the server's current
/// value as `previous`; it must leave `previous` untouched and return the new
/// authoritative value.
pub trait MergeableState: Sized {
    fn id(&self) -> u32;

    fn check_integrity(&self) -> bool;

    fn merge(&self, previous: &Self) -> Result<Self, IntegrityError>;
}

/// FIFO of camera instructions for one camera channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstructionQueue {
    id: u32,
    instructions: VecDeque<Instruction>,
}

impl InstructionQueue {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            instructions: VecDeque::new(),
        }
    }

    pub fn with_instructions(id: u32, instructions: impl IntoIterator<Item = Instruction>) -> Self {
        Self {
            id,
            instructions: instructions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push_back(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Drains the queue front to back onto `vp`. Returns how many
    /// instructions were applied.
    pub fn execute(&mut self, vp: &mut ViewPoint) -> usize {
        let mut applied = 0;
        while let Some(instruction) = self.instructions.pop_front() {
            instruction.apply(vp);
            applied += 1;
        }
        applied
    }
}

impl MergeableState for InstructionQueue {
    fn id(&self) -> u32 {
        self.id
    }

    fn check_integrity(&self) -> bool {
        self.instructions.iter().all(Instruction::is_finite)
    }

    fn merge(&self, previous: &Self) -> Result<Self, IntegrityError> {
        if self.id != previous.id {
            return Err(IntegrityError::IdMismatch {
                expected: previous.id,
                found: self.id,
            });
        }

        let mut instructions = VecDeque::with_capacity(previous.len() + self.len());
        instructions.extend(previous.instructions.iter().copied());
        instructions.extend(self.instructions.iter().copied());

        Ok(Self {
            id: self.id,
            instructions,
        })
    }
}

impl fmt::Display for InstructionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Queue of size {}", self.len())?;
        for instruction in &self.instructions {
            write!(f, "\n{instruction}")?;
        }
        Ok(())
    }
}
