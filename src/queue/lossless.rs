//! Lossless 出端口队列
//!
//! `LosslessQueue` 用于交换机寻址的 lossless 策略：与对端队列互为 remote
//! endpoint，收到 Pause 后停止出队，直到 Resume。占用超过高水位时应让对端暂停。
//!
//! `LosslessOutputQueue` 用于输入队列寻址的变体：流控由接收侧的
//! `LosslessInputQueue` 发出，本队列只负责响应，并可选做 ECN 标记。

use tracing::warn;

use crate::net::Packet;

use super::{DropTailQueue, FlowControl, PacketQueue, QueueKind};

#[derive(Debug)]
pub struct LosslessQueue {
    inner: DropTailQueue,
    high_watermark: u64,
    low_watermark: u64,
    paused: bool,
}

impl LosslessQueue {
    /// 高/低水位分别取容量的 3/4 与 1/2
    pub fn new(max_bytes: u64) -> Self {
        Self {
            inner: DropTailQueue::new(max_bytes),
            high_watermark: max_bytes / 4 * 3,
            low_watermark: max_bytes / 2,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 占用是否超过高水位（应请求对端暂停）
    pub fn above_high_watermark(&self) -> bool {
        self.inner.bytes() > self.high_watermark
    }

    /// 占用是否回落到低水位以下（可请求对端恢复）
    pub fn below_low_watermark(&self) -> bool {
        self.inner.bytes() <= self.low_watermark
    }
}

impl PacketQueue for LosslessQueue {
    fn kind(&self) -> QueueKind {
        QueueKind::Lossless
    }

    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        self.inner.enqueue(pkt).inspect_err(|pkt| {
            warn!(pkt_id = pkt.id, "lossless 队列溢出，流控未及时生效");
        })
    }

    fn dequeue(&mut self) -> Option<Packet> {
        if self.paused {
            return None;
        }
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

    fn on_flow_control(&mut self, signal: FlowControl) {
        self.paused = signal == FlowControl::Pause;
    }
}

#[derive(Debug)]
pub struct LosslessOutputQueue {
    inner: DropTailQueue,
    ecn_threshold_bytes: Option<u64>,
    paused: bool,
}

impl LosslessOutputQueue {
    pub fn new(max_bytes: u64, ecn_threshold_bytes: Option<u64>) -> Self {
        Self {
            inner: DropTailQueue::new(max_bytes),
            ecn_threshold_bytes,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ecn_threshold_bytes(&self) -> Option<u64> {
        self.ecn_threshold_bytes
    }
}

impl PacketQueue for LosslessOutputQueue {
    fn kind(&self) -> QueueKind {
        QueueKind::LosslessOutput
    }

    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        self.inner.enqueue(pkt).inspect_err(|pkt| {
            warn!(pkt_id = pkt.id, "lossless 输出队列溢出");
        })
    }

    fn dequeue(&mut self) -> Option<Packet> {
        if self.paused {
            return None;
        }
        let congested = self
            .ecn_threshold_bytes
            .is_some_and(|k| self.inner.bytes() > k);
        let mut pkt = self.inner.dequeue()?;
        if congested {
            pkt.mark_ce();
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

    fn on_flow_control(&mut self, signal: FlowControl) {
        self.paused = signal == FlowControl::Pause;
    }
}
