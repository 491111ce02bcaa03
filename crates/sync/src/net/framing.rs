//! Length-delimited frames over a byte stream.
//!
//! ```text
//! +----------------+----------------------------+
//! | len: u32 (LE)  | rkyv archive of a Packet   |
//! +----------------+----------------------------+
//! ```

use std::io::{self, Read, Write};

use rkyv::util::AlignedVec;

use super::protocol::{MAX_FRAME_SIZE, Packet, PacketError};
use crate::state::IntegrityError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("peer closed the connection")]
    Disconnected,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),
}

impl SyncError {
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

pub fn write_packet<W: Write>(writer: &mut W, packet: &Packet) -> Result<(), SyncError> {
    let data = packet.serialize()?;
    if data.len() > MAX_FRAME_SIZE {
        return Err(SyncError::FrameTooLarge {
            len: data.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    writer.write_all(&(data.len() as u32).to_le_bytes())?;
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame. End of stream before the first length byte is reported
/// as [`SyncError::Disconnected`]; anywhere else it is an I/O error.
pub fn read_packet<R: Read>(reader: &mut R) -> Result<Packet, SyncError> {
    let mut len_bytes = [0u8; 4];
    let first = loop {
        match reader.read(&mut len_bytes) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    };
    if first == 0 {
        return Err(SyncError::Disconnected);
    }
    reader.read_exact(&mut len_bytes[first..])?;

    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(SyncError::FrameTooLarge {
            len,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut buf: AlignedVec = AlignedVec::with_capacity(len);
    buf.resize(len, 0);
    reader.read_exact(&mut buf)?;

    Ok(Packet::deserialize(&buf)?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::instruction::Instruction;
    use crate::net::protocol::WireState;
    use crate::state::InstructionQueue;

    #[test]
    fn frames_are_read_back_in_order() {
        let queue = InstructionQueue::with_instructions(2, [Instruction::Turn(1.57)]);

        let mut wire = Vec::new();
        write_packet(&mut wire, &Packet::ready()).unwrap();
        write_packet(&mut wire, &queue.to_packet()).unwrap();

        let mut cursor = Cursor::new(wire);
        assert!(read_packet(&mut cursor).unwrap().is_ready());
        let received = InstructionQueue::from_packet(read_packet(&mut cursor).unwrap()).unwrap();
        assert_eq!(received, queue);
        assert!(read_packet(&mut cursor).unwrap_err().is_disconnect());
    }

    #[test]
    fn truncated_frame_is_a_fault() {
        let mut wire = Vec::new();
        write_packet(&mut wire, &Packet::ready()).unwrap();
        wire.truncate(wire.len() - 1);

        let err = read_packet(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, SyncError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn oversized_length_is_refused() {
        let wire = (MAX_FRAME_SIZE as u32 + 1).to_le_bytes().to_vec();

        let err = read_packet(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, SyncError::FrameTooLarge { .. }));
    }
}
