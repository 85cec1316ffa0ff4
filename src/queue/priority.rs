//! Priority queue with drop-tail capacity.
//!
//! Control packets (ACKs, trimmed headers) get strict priority over bulk data.
//! Also serves as the host-side feeder queue on uplinks.

use std::collections::VecDeque;

use crate::net::Packet;

use super::{PacketQueue, QueueKind};

#[derive(Debug)]
pub struct PriorityQueue {
    max_bytes: u64,
    cur_bytes: u64,
    hi: VecDeque<Packet>,
    lo: VecDeque<Packet>,
}

impl PriorityQueue {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            cur_bytes: 0,
            hi: VecDeque::new(),
            lo: VecDeque::new(),
        }
    }
}

impl PacketQueue for PriorityQueue {
    fn kind(&self) -> QueueKind {
        QueueKind::Priority
    }

    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        let sz = pkt.size_bytes as u64;
        if self.cur_bytes.saturating_add(sz) > self.max_bytes {
            return Err(pkt);
        }
        self.cur_bytes = self.cur_bytes.saturating_add(sz);
        if pkt.is_control() {
            self.hi.push_back(pkt);
        } else {
            self.lo.push_back(pkt);
        }
        Ok(())
    }

    fn dequeue(&mut self) -> Option<Packet> {
        let pkt = self.hi.pop_front().or_else(|| self.lo.pop_front())?;
        self.cur_bytes = self.cur_bytes.saturating_sub(pkt.size_bytes as u64);
        Some(pkt)
    }

    fn len(&self) -> usize {
        self.hi.len().saturating_add(self.lo.len())
    }

    fn bytes(&self) -> u64 {
        self.cur_bytes
    }

    fn capacity_bytes(&self) -> u64 {
        self.max_bytes
    }
}
