//! 队列策略标签与分配工厂
//!
//! 拓扑只持有一个 `QueueDiscipline` 标签，所有边上的队列都通过
//! `QueueFactory` 按标签和角色（接主机的 edge 侧 / 交换机间的 core 侧）分配。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    CompositeQueue, ECN_MARK_PKTS, EcnQueue, FEEDER_BUFFER_PKTS, LOSSLESS_BUFFER_PKTS,
    LOSSLESS_OUTPUT_BUFFER_PKTS, LosslessOutputQueue, LosslessQueue, PacketQueue, PriorityQueue,
    RANDOM_BUFFER_PKTS, RandomQueue, SWITCH_BUFFER_PKTS, mem_from_pkt,
};

/// 队列策略标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueDiscipline {
    /// 尾丢弃 + 随机早丢
    #[default]
    Random,
    Ecn,
    Composite,
    /// edge 侧 composite，core 侧 ECN
    CompositeEcn,
    /// 控制包严格优先
    CtrlPrio,
    /// 交换机寻址的 lossless：端口挂在交换机上，成对队列互为 remote endpoint
    Lossless,
    /// 输入队列寻址的 lossless：每个队列由接收侧输入队列包裹
    LosslessInput,
    LosslessInputEcn,
}

impl QueueDiscipline {
    pub const ALL: [QueueDiscipline; 8] = [
        QueueDiscipline::Random,
        QueueDiscipline::Ecn,
        QueueDiscipline::Composite,
        QueueDiscipline::CompositeEcn,
        QueueDiscipline::CtrlPrio,
        QueueDiscipline::Lossless,
        QueueDiscipline::LosslessInput,
        QueueDiscipline::LosslessInputEcn,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            QueueDiscipline::Random => "random",
            QueueDiscipline::Ecn => "ecn",
            QueueDiscipline::Composite => "composite",
            QueueDiscipline::CompositeEcn => "composite_ecn",
            QueueDiscipline::CtrlPrio => "ctrl_prio",
            QueueDiscipline::Lossless => "lossless",
            QueueDiscipline::LosslessInput => "lossless_input",
            QueueDiscipline::LosslessInputEcn => "lossless_input_ecn",
        }
    }

    /// 接收端驱动的策略：需要可寻址交换机，且每个队列都要有 remote endpoint
    pub fn is_lossless(self) -> bool {
        matches!(
            self,
            QueueDiscipline::Lossless
                | QueueDiscipline::LosslessInput
                | QueueDiscipline::LosslessInputEcn
        )
    }

    pub fn is_switch_addressed(self) -> bool {
        self == QueueDiscipline::Lossless
    }

    /// 路由中需要在每一跳后附带接收侧输入队列
    pub fn uses_input_queues(self) -> bool {
        matches!(
            self,
            QueueDiscipline::LosslessInput | QueueDiscipline::LosslessInputEcn
        )
    }
}

impl fmt::Display for QueueDiscipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown queue discipline `{0}`")]
pub struct ParseDisciplineError(pub String);

impl FromStr for QueueDiscipline {
    type Err = ParseDisciplineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        QueueDiscipline::ALL
            .into_iter()
            .find(|d| d.tag() == norm)
            .ok_or_else(|| ParseDisciplineError(s.to_string()))
    }
}

/// 队列所处位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// 交换机到主机（ToR 下行）
    Edge,
    /// 交换机之间
    Core,
}

/// 按策略标签分配队列
#[derive(Debug)]
pub struct QueueFactory {
    discipline: QueueDiscipline,
    seed: u64,
    allocated: u64,
}

impl QueueFactory {
    pub fn new(discipline: QueueDiscipline, seed: u64) -> Self {
        Self {
            discipline,
            seed,
            allocated: 0,
        }
    }

    pub fn discipline(&self) -> QueueDiscipline {
        self.discipline
    }

    fn next_seed(&mut self) -> u64 {
        let s = self.seed.wrapping_add(self.allocated);
        self.allocated = self.allocated.wrapping_add(1);
        s
    }

    /// 主机发送端队列：与策略无关的小 feeder 缓冲；lossless 策略下用 lossless 队列
    pub fn alloc_src_queue(&mut self) -> Box<dyn PacketQueue> {
        if self.discipline.is_lossless() {
            Box::new(LosslessQueue::new(mem_from_pkt(LOSSLESS_BUFFER_PKTS)))
        } else {
            Box::new(PriorityQueue::new(mem_from_pkt(FEEDER_BUFFER_PKTS)))
        }
    }

    /// 交换机出端口队列
    pub fn alloc_queue(&mut self, role: Role, queue_size_bytes: u64) -> Box<dyn PacketQueue> {
        let ecn_mark = mem_from_pkt(ECN_MARK_PKTS);
        match self.discipline {
            QueueDiscipline::Random => {
                let seed = self.next_seed();
                Box::new(RandomQueue::new(
                    queue_size_bytes,
                    mem_from_pkt(RANDOM_BUFFER_PKTS),
                    seed,
                ))
            }
            QueueDiscipline::Ecn => Box::new(EcnQueue::new(queue_size_bytes, ecn_mark)),
            QueueDiscipline::Composite => Box::new(CompositeQueue::new(queue_size_bytes)),
            QueueDiscipline::CompositeEcn => match role {
                Role::Edge => Box::new(CompositeQueue::new(queue_size_bytes)),
                Role::Core => Box::new(EcnQueue::new(
                    mem_from_pkt(2 * SWITCH_BUFFER_PKTS),
                    ecn_mark,
                )),
            },
            QueueDiscipline::CtrlPrio => Box::new(PriorityQueue::new(queue_size_bytes)),
            QueueDiscipline::Lossless => {
                Box::new(LosslessQueue::new(mem_from_pkt(LOSSLESS_BUFFER_PKTS)))
            }
            QueueDiscipline::LosslessInput => Box::new(LosslessOutputQueue::new(
                mem_from_pkt(LOSSLESS_OUTPUT_BUFFER_PKTS),
                None,
            )),
            QueueDiscipline::LosslessInputEcn => Box::new(LosslessOutputQueue::new(
                mem_from_pkt(LOSSLESS_OUTPUT_BUFFER_PKTS),
                Some(ecn_mark),
            )),
        }
    }
}
