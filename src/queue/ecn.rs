//! ECN 标记队列
//!
//! 尾丢弃容量之上，出队时若队列占用超过阈值则给 ECN capable 的包打 CE。

use crate::net::Packet;

use super::{DropTailQueue, PacketQueue, QueueKind};

#[derive(Debug)]
pub struct EcnQueue {
    inner: DropTailQueue,
    mark_threshold_bytes: u64,
    marked: u64,
}

impl EcnQueue {
    pub fn new(max_bytes: u64, mark_threshold_bytes: u64) -> Self {
        Self {
            inner: DropTailQueue::new(max_bytes),
            mark_threshold_bytes,
            marked: 0,
        }
    }

    pub fn mark_threshold_bytes(&self) -> u64 {
        self.mark_threshold_bytes
    }

    /// 已标记 CE 的包数
    pub fn marked(&self) -> u64 {
        self.marked
    }
}

impl PacketQueue for EcnQueue {
    fn kind(&self) -> QueueKind {
        QueueKind::Ecn
    }

    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        self.inner.enqueue(pkt)
    }

    fn dequeue(&mut self) -> Option<Packet> {
        let congested = self.inner.bytes() > self.mark_threshold_bytes;
        let mut pkt = self.inner.dequeue()?;
        if congested && pkt.mark_ce() {
            self.marked += 1;
        }
        Some(pkt)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn bytes(&self) -> u64 {
        self.inner.bytes()
    }

    fn capacity_bytes(&self) -> u64 {
        self.inner.capacity_bytes()
    }
}
