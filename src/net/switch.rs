//! 交换机
//!
//! 只有 lossless（交换机寻址）类队列策略需要可寻址的交换机实体，
//! 交换机持有挂在它上面的出端口队列。

use super::id::{QueueId, SwitchId};

/// 交换机节点
#[derive(Debug, Clone)]
pub struct Switch {
    id: SwitchId,
    name: String,
    ports: Vec<QueueId>,
}

impl Switch {
    /// 创建新交换机
    pub fn new(id: SwitchId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ports: Vec::new(),
        }
    }

    pub fn id(&self) -> SwitchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 按挂接顺序返回端口队列
    pub fn ports(&self) -> &[QueueId] {
        &self.ports
    }

    pub(crate) fn add_port(&mut self, queue: QueueId) {
        self.ports.push(queue);
    }
}
