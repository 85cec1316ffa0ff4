//! Composite 队列
//!
//! 数据队列满时不丢整包，而是裁剪成包头放进高优先级的包头队列，
//! 让接收端尽快得知丢失。包头队列也满时才真正丢弃。

use std::collections::VecDeque;

use crate::net::Packet;

use super::{DropTailQueue, PacketQueue, QueueKind};

#[derive(Debug)]
pub struct CompositeQueue {
    data: DropTailQueue,
    headers: VecDeque<Packet>,
    header_bytes: u64,
    max_header_bytes: u64,
    trimmed: u64,
}

impl CompositeQueue {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            data: DropTailQueue::new(max_bytes),
            headers: VecDeque::new(),
            header_bytes: 0,
            max_header_bytes: max_bytes,
            trimmed: 0,
        }
    }

    /// 被裁剪成包头的数据包数
    pub fn trimmed(&self) -> u64 {
        self.trimmed
    }

    fn push_header(&mut self, pkt: Packet) -> Result<(), Packet> {
        let sz = pkt.size_bytes as u64;
        if self.header_bytes.saturating_add(sz) > self.max_header_bytes {
            return Err(pkt);
        }
        self.header_bytes += sz;
        self.headers.push_back(pkt);
        Ok(())
    }
}

impl PacketQueue for CompositeQueue {
    fn kind(&self) -> QueueKind {
        QueueKind::Composite
    }

    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if pkt.is_control() {
            return self.push_header(pkt);
        }
        match self.data.enqueue(pkt) {
            Ok(()) => Ok(()),
            Err(pkt) => {
                self.push_header(pkt.trim())?;
                self.trimmed += 1;
                Ok(())
            }
        }
    }

    fn dequeue(&mut self) -> Option<Packet> {
        if let Some(pkt) = self.headers.pop_front() {
            self.header_bytes = self.header_bytes.saturating_sub(pkt.size_bytes as u64);
            return Some(pkt);
        }
        self.data.dequeue()
    }

    fn len(&self) -> usize {
        self.headers.len() + self.data.len()
    }

    fn bytes(&self) -> u64 {
        self.header_bytes.saturating_add(self.data.bytes())
    }

    fn capacity_bytes(&self) -> u64 {
        self.data.capacity_bytes()
    }
}
