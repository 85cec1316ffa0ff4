//! 传播元素（Pipe）
//!
//! 每条单向边一个，只负责固定的单向传播时延。

use super::id::PipeId;
use crate::sim::SimTime;

/// 固定时延的传播元素
#[derive(Debug, Clone)]
pub struct Pipe {
    id: PipeId,
    name: String,
    delay: SimTime,
}

impl Pipe {
    pub fn new(id: PipeId, name: impl Into<String>, delay: SimTime) -> Self {
        Self {
            id,
            name: name.into(),
            delay,
        }
    }

    pub fn id(&self) -> PipeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }

    /// 在 `depart` 时刻进入 pipe 的包到达对端的时刻
    pub fn arrival(&self, depart: SimTime) -> SimTime {
        depart.saturating_add(self.delay)
    }
}
