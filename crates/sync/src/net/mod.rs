mod client;
mod framing;
mod protocol;
mod server;
mod stats;

pub use client::SyncClient;
pub use framing::{SyncError, read_packet, write_packet};
pub use protocol::{
    DEFAULT_PORT, InstructionKind, InstructionRecord, MAX_FRAME_SIZE, PROTOCOL_MAGIC,
    PROTOCOL_VERSION, Packet, PacketError, PacketHeader, PacketType, QueueRecord, WireState,
};
pub use server::{SyncHandle, SyncServer};
pub use stats::{SyncStats, SyncStatsSnapshot};
