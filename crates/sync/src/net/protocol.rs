use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::instruction::Instruction;
use crate::state::{InstructionQueue, IntegrityError, MergeableState};

pub const PROTOCOL_MAGIC: u32 = 0x43414D53;
pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_PORT: u16 = 42511;
pub const MAX_FRAME_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
}

impl Default for PacketHeader {
    fn default() -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
        }
    }
}

impl PacketHeader {
    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum InstructionKind {
    Move,
    Turn,
    Pitch,
}

impl InstructionKind {
    pub fn arity(self) -> usize {
        match self {
            Self::Move => 3,
            Self::Turn | Self::Pitch => 1,
        }
    }
}

/// Instruction as it travels on the wire. Nothing in here is trusted until
/// it has been converted into an [`Instruction`].
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct InstructionRecord {
    pub kind: InstructionKind,
    pub args: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct QueueRecord {
    pub id: u32,
    pub instructions: Vec<InstructionRecord>,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum PacketType {
    /// Sent once by the server right after accepting a client.
    Ready,
    Queue(QueueRecord),
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: PacketType,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
}

impl Packet {
    pub fn new(payload: PacketType) -> Self {
        Self {
            header: PacketHeader::default(),
            payload,
        }
    }

    pub fn ready() -> Self {
        Self::new(PacketType::Ready)
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)
    }

    /// `data` must be 16-byte aligned, as produced by the framing layer.
    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(PacketError::Deserialize)
    }

    pub fn is_ready(&self) -> bool {
        self.header.is_valid() && matches!(self.payload, PacketType::Ready)
    }
}

/// Conversion between a synchronized state and its wire payload.
pub trait WireState: MergeableState {
    fn to_payload(&self) -> PacketType;

    fn from_payload(payload: PacketType) -> Result<Self, IntegrityError>;

    fn to_packet(&self) -> Packet {
        Packet::new(self.to_payload())
    }

    fn from_packet(packet: Packet) -> Result<Self, IntegrityError> {
        if !packet.header.is_valid() {
            return Err(IntegrityError::BadHeader);
        }
        Self::from_payload(packet.payload)
    }
}

impl From<&Instruction> for InstructionRecord {
    fn from(instruction: &Instruction) -> Self {
        match *instruction {
            Instruction::Move(d) => Self {
                kind: InstructionKind::Move,
                args: vec![d.x, d.y, d.z],
            },
            Instruction::Turn(angle) => Self {
                kind: InstructionKind::Turn,
                args: vec![angle],
            },
            Instruction::Pitch(angle) => Self {
                kind: InstructionKind::Pitch,
                args: vec![angle],
            },
        }
    }
}

impl TryFrom<&InstructionRecord> for Instruction {
    type Error = &'static str;

    fn try_from(record: &InstructionRecord) -> Result<Self, Self::Error> {
        if record.args.len() != record.kind.arity() {
            return Err("wrong number of arguments");
        }
        if !record.args.iter().all(|a| a.is_finite()) {
            return Err("non-finite argument");
        }

        Ok(match record.kind {
            InstructionKind::Move => {
                Instruction::translate(record.args[0], record.args[1], record.args[2])
            }
            InstructionKind::Turn => Instruction::Turn(record.args[0]),
            InstructionKind::Pitch => Instruction::Pitch(record.args[0]),
        })
    }
}

impl From<&InstructionQueue> for QueueRecord {
    fn from(queue: &InstructionQueue) -> Self {
        Self {
            id: queue.id(),
            instructions: queue.iter().map(InstructionRecord::from).collect(),
        }
    }
}

impl TryFrom<QueueRecord> for InstructionQueue {
    type Error = IntegrityError;

    fn try_from(record: QueueRecord) -> Result<Self, Self::Error> {
        let instructions = record
            .instructions
            .iter()
            .enumerate()
            .map(|(index, r)| {
                Instruction::try_from(r)
                    .map_err(|reason| IntegrityError::InvalidInstruction { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InstructionQueue::with_instructions(record.id, instructions))
    }
}

impl WireState for InstructionQueue {
    fn to_payload(&self) -> PacketType {
        PacketType::Queue(QueueRecord::from(self))
    }

    fn from_payload(payload: PacketType) -> Result<Self, IntegrityError> {
        match payload {
            PacketType::Queue(record) => InstructionQueue::try_from(record),
            PacketType::Ready => Err(IntegrityError::UnexpectedPacket("ready")),
        }
    }
}
