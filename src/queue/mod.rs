//! 队列策略（Queue disciplines）
//!
//! 每种策略实现统一的 `PacketQueue` 能力；拓扑构建时通过 `QueueFactory`
//! 按策略标签分配具体实现。lossless 类策略额外响应 pause/resume 流控信号。

use crate::net::Packet;

mod composite;
mod discipline;
mod drop_tail;
mod ecn;
mod lossless;
mod lossless_input;
mod priority;
mod random;

pub use composite::CompositeQueue;
pub use discipline::{ParseDisciplineError, QueueDiscipline, QueueFactory, Role};
pub use drop_tail::DropTailQueue;
pub use ecn::EcnQueue;
pub use lossless::{LosslessOutputQueue, LosslessQueue};
pub use lossless_input::LosslessInputQueue;
pub use priority::PriorityQueue;
pub use random::RandomQueue;

pub const DEFAULT_PKT_BYTES: u64 = 1500;

/// 主机网卡速率（Mbps）
pub const HOST_NIC_MBPS: u64 = 100_000;
/// 主机发送端 feeder 缓冲（包数）
pub const FEEDER_BUFFER_PKTS: u64 = 2000;
/// 随机早丢窗口（包数）
pub const RANDOM_BUFFER_PKTS: u64 = 3;
/// ECN 标记阈值（包数）
pub const ECN_MARK_PKTS: u64 = 15;
pub const LOSSLESS_BUFFER_PKTS: u64 = 50;
pub const LOSSLESS_OUTPUT_BUFFER_PKTS: u64 = 200;
pub const SWITCH_BUFFER_PKTS: u64 = 100;

pub fn mem_from_pkt(pkts: u64) -> u64 {
    pkts.saturating_mul(DEFAULT_PKT_BYTES)
}

pub fn speed_from_mbps(mbps: u64) -> u64 {
    mbps.saturating_mul(1_000_000)
}

/// 具体队列实现的判别标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    DropTail,
    Random,
    Ecn,
    Composite,
    Priority,
    Lossless,
    LosslessOutput,
}

impl QueueKind {
    /// 是否为接收端驱动（credit/lossless）的实现
    pub fn is_lossless(self) -> bool {
        matches!(self, QueueKind::Lossless | QueueKind::LosslessOutput)
    }
}

/// lossless 流控信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    Pause,
    Resume,
}

/// Packet 队列抽象
pub trait PacketQueue: std::fmt::Debug + Send {
    fn kind(&self) -> QueueKind;
    /// 入队：成功返回 Ok；若被丢弃则返回 Err(pkt)
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    /// 出队：按队列策略返回下一个 packet
    fn dequeue(&mut self) -> Option<Packet>;

    fn len(&self) -> usize;
    fn bytes(&self) -> u64;
    fn capacity_bytes(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 对端发来的流控信号；非 lossless 策略忽略
    fn on_flow_control(&mut self, _signal: FlowControl) {}
}
