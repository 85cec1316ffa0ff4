//! 随机早丢队列
//!
//! 队列占用进入容量末尾的 `drop_window` 字节区间后，按占用深度线性增加丢包概率；
//! 超出容量时必丢。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::net::Packet;

use super::{DropTailQueue, PacketQueue, QueueKind};

#[derive(Debug)]
pub struct RandomQueue {
    inner: DropTailQueue,
    drop_window: u64,
    rng: StdRng,
}

impl RandomQueue {
    pub fn new(max_bytes: u64, drop_window: u64, seed: u64) -> Self {
        Self {
            inner: DropTailQueue::new(max_bytes),
            drop_window: drop_window.min(max_bytes),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn drop_probability(&self, after: u64) -> f64 {
        let start = self.inner.capacity_bytes() - self.drop_window;
        if self.drop_window == 0 || after <= start {
            return 0.0;
        }
        ((after - start) as f64 / self.drop_window as f64).min(1.0)
    }
}

impl PacketQueue for RandomQueue {
    fn kind(&self) -> QueueKind {
        QueueKind::Random
    }

    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        let sz = pkt.size_bytes as u64;
        if !self.inner.fits(sz) {
            return Err(pkt);
        }
        let p = self.drop_probability(self.inner.bytes().saturating_add(sz));
        if p > 0.0 && self.rng.gen_bool(p) {
            return Err(pkt);
        }
        self.inner.enqueue(pkt)
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.inner.dequeue()
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
