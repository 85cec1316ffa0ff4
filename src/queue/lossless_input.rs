//! 接收侧 lossless 输入队列
//!
//! 包裹一个出端口队列：统计经该链路到达、尚未被下游转走的字节数，
//! 越过高水位时向上游队列发 Pause，回落到低水位时发 Resume。
//! 它本身是路由上的一个元素（紧跟在对应边的 pipe 之后）。

use crate::net::{InputQueueId, QueueId};

use super::{FlowControl, LOSSLESS_BUFFER_PKTS, mem_from_pkt};

#[derive(Debug, Clone)]
pub struct LosslessInputQueue {
    id: InputQueueId,
    name: String,
    upstream: QueueId,
    high_watermark: u64,
    low_watermark: u64,
    cur_bytes: u64,
    pausing: bool,
}

impl LosslessInputQueue {
    pub fn new(id: InputQueueId, name: impl Into<String>, upstream: QueueId) -> Self {
        let buffer = mem_from_pkt(LOSSLESS_BUFFER_PKTS);
        Self {
            id,
            name: name.into(),
            upstream,
            high_watermark: buffer / 4 * 3,
            low_watermark: buffer / 2,
            cur_bytes: 0,
            pausing: false,
        }
    }

    pub fn id(&self) -> InputQueueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 被包裹的上游出端口队列（流控信号的接收者）
    pub fn upstream(&self) -> QueueId {
        self.upstream
    }

    pub fn bytes(&self) -> u64 {
        self.cur_bytes
    }

    pub fn is_pausing(&self) -> bool {
        self.pausing
    }

    /// 包到达：可能需要暂停上游
    pub fn on_arrival(&mut self, size_bytes: u32) -> Option<FlowControl> {
        self.cur_bytes = self.cur_bytes.saturating_add(size_bytes as u64);
        if !self.pausing && self.cur_bytes > self.high_watermark {
            self.pausing = true;
            return Some(FlowControl::Pause);
        }
        None
    }

    /// 包被下游转走：可能可以恢复上游
    pub fn on_departure(&mut self, size_bytes: u32) -> Option<FlowControl> {
        self.cur_bytes = self.cur_bytes.saturating_sub(size_bytes as u64);
        if self.pausing && self.cur_bytes <= self.low_watermark {
            self.pausing = false;
            return Some(FlowControl::Resume);
        }
        None
    }
}
