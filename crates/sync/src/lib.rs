pub mod controller;
pub mod geometry;
pub mod instruction;
pub mod net;
pub mod state;
pub mod viewpoint;

pub use controller::{CameraController, CameraRig, MemoryRig};
pub use geometry::AxisAngle;
pub use instruction::{Instruction, ParseInstructionError};
pub use net::{
    DEFAULT_PORT, Packet, PacketError, PacketHeader, PacketType, SyncClient, SyncError,
    SyncHandle, SyncServer, SyncStatsSnapshot, WireState,
};
pub use state::{InstructionQueue, IntegrityError, MergeableState};
pub use viewpoint::{ViewPoint, ViewPointError, ViewPose};
