//! # Packet Cursor
//!
//! Walks the container's packet sequence, keeping only packets of the
//! selected stream. At most one packet is alive at a time.

use crate::traits::Container;
use crate::types::EncodedPacket;
use tracing::{trace, warn};

pub struct PacketCursor {
    container: Box<dyn Container>,
    stream_index: usize,
    current: Option<EncodedPacket>,
    exhausted: bool,
    packets_read: u64,
    packets_skipped: u64,
}

impl PacketCursor {
    pub fn new(container: Box<dyn Container>, stream_index: usize) -> Self {
        Self {
            container,
            stream_index,
            current: None,
            exhausted: false,
            packets_read: 0,
            packets_skipped: 0,
        }
    }

    /// Release the held packet and read the next one from the selected stream.
    ///
    /// Returns `None` once the container is exhausted. A read failure is
    /// treated as the end of the container.
    pub fn read(&mut self) -> Option<&mut EncodedPacket> {
        self.current = None;

        while !self.exhausted {
            match self.container.read_packet() {
                Ok(Some(packet)) if packet.stream_index() == self.stream_index => {
                    self.packets_read += 1;
                    trace!(
                        bytes = packet.len(),
                        pts = ?packet.pts(),
                        "Read packet"
                    );
                    self.current = Some(packet);
                    break;
                }
                Ok(Some(packet)) => {
                    self.packets_skipped += 1;
                    trace!(stream = packet.stream_index(), "Skipping packet from other stream");
                }
                Ok(None) => {
                    self.exhausted = true;
                }
                Err(e) => {
                    warn!("Packet read failed, treating as end of stream: {}", e);
                    self.exhausted = true;
                }
            }
        }

        self.current.as_mut()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Packets of the selected stream handed out so far.
    pub fn packets_read(&self) -> u64 {
        self.packets_read
    }

    /// Packets from other streams that were dropped.
    pub fn packets_skipped(&self) -> u64 {
        self.packets_skipped
    }
}
