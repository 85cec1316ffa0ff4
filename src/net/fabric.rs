//! Link fabric：所有排队元素、传播元素与输入队列的 arena
//!
//! 每条单向边由一个队列和一个 pipe 组成，按 `(边类别, 起点, 终点)` 建立索引。
//! remote endpoint 关联只保存 arena 下标，从不持有对端。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::id::{EdgeId, InputQueueId, PipeId, QueueId};
use super::pipe::Pipe;
use crate::queue::{LosslessInputQueue, PacketQueue, QueueKind, Role};
use crate::sim::SimTime;

/// 边类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    /// 主机 -> 交换机（`from` 为主机下标）
    HostUp,
    /// 交换机 -> 主机（`to` 为主机下标）
    HostDown,
    /// 交换机之间的组内链路与普通全局链路
    Switch,
    /// Plus 增强的补充全局链路
    Plus,
}

impl EdgeClass {
    pub fn is_switch_to_switch(self) -> bool {
        matches!(self, EdgeClass::Switch | EdgeClass::Plus)
    }
}

/// 单向边索引键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub class: EdgeClass,
    pub from: usize,
    pub to: usize,
}

impl EdgeKey {
    pub fn new(class: EdgeClass, from: usize, to: usize) -> Self {
        Self { class, from, to }
    }

    /// 反方向的边
    pub fn reversed(self) -> Self {
        let class = match self.class {
            EdgeClass::HostUp => EdgeClass::HostDown,
            EdgeClass::HostDown => EdgeClass::HostUp,
            c => c,
        };
        Self {
            class,
            from: self.to,
            to: self.from,
        }
    }
}

/// 对端引用：交换机寻址 lossless 下是成对的另一个队列，输入队列寻址下是包裹它的输入队列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteEndpoint {
    Queue(QueueId),
    Input(InputQueueId),
}

/// fabric 中的排队元素
#[derive(Debug)]
pub struct QueueElement {
    id: QueueId,
    name: String,
    edge: EdgeKey,
    role: Role,
    bandwidth_bps: u64,
    queue: Box<dyn PacketQueue>,
    remote: Option<RemoteEndpoint>,
}

impl QueueElement {
    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edge(&self) -> EdgeKey {
        self.edge
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn bandwidth_bps(&self) -> u64 {
        self.bandwidth_bps
    }

    pub fn kind(&self) -> QueueKind {
        self.queue.kind()
    }

    pub fn queue(&self) -> &dyn PacketQueue {
        self.queue.as_ref()
    }

    pub fn queue_mut(&mut self) -> &mut dyn PacketQueue {
        self.queue.as_mut()
    }

    pub fn remote_endpoint(&self) -> Option<RemoteEndpoint> {
        self.remote
    }

    /// 计算发送指定字节数所需的序列化时间
    pub fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if self.bandwidth_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128)
            + (self.bandwidth_bps as u128 - 1))
            / self.bandwidth_bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}

/// 单向边：一个队列加一个 pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub key: EdgeKey,
    pub queue: QueueId,
    pub pipe: PipeId,
    pub up: bool,
}

/// 新边的描述
#[derive(Debug)]
pub struct EdgeSpec {
    pub key: EdgeKey,
    pub role: Role,
    pub bandwidth_bps: u64,
    pub queue: Box<dyn PacketQueue>,
    pub queue_name: String,
    pub pipe_name: String,
    pub delay: SimTime,
}

#[derive(Debug, Default)]
pub struct Fabric {
    queues: Vec<QueueElement>,
    pipes: Vec<Pipe>,
    inputs: Vec<LosslessInputQueue>,
    edges: Vec<Edge>,
    index: HashMap<EdgeKey, EdgeId>,
}

impl Fabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一条单向边；同一键重复加入时返回已有边
    pub fn add_edge(&mut self, spec: EdgeSpec) -> Edge {
        if let Some(&id) = self.index.get(&spec.key) {
            return self.edges[id.0];
        }
        let queue = QueueId(self.queues.len());
        self.queues.push(QueueElement {
            id: queue,
            name: spec.queue_name,
            edge: spec.key,
            role: spec.role,
            bandwidth_bps: spec.bandwidth_bps,
            queue: spec.queue,
            remote: None,
        });
        let pipe = PipeId(self.pipes.len());
        self.pipes.push(Pipe::new(pipe, spec.pipe_name, spec.delay));

        let edge = Edge {
            id: EdgeId(self.edges.len()),
            key: spec.key,
            queue,
            pipe,
            up: true,
        };
        self.edges.push(edge);
        self.index.insert(spec.key, edge.id);
        edge
    }

    /// 用接收侧输入队列包裹 `queue`，并把它设为该队列的 remote endpoint
    pub(crate) fn wrap_with_input(
        &mut self,
        queue: QueueId,
        name: impl Into<String>,
    ) -> InputQueueId {
        let id = InputQueueId(self.inputs.len());
        self.inputs.push(LosslessInputQueue::new(id, name, queue));
        self.set_remote_endpoint(queue, RemoteEndpoint::Input(id));
        id
    }

    pub(crate) fn set_remote_endpoint(&mut self, queue: QueueId, peer: RemoteEndpoint) {
        if let Some(q) = self.queues.get_mut(queue.0) {
            q.remote = Some(peer);
        }
    }

    pub fn remote_endpoint(&self, queue: QueueId) -> Option<RemoteEndpoint> {
        self.queues.get(queue.0).and_then(|q| q.remote)
    }

    pub fn queue(&self, id: QueueId) -> Option<&QueueElement> {
        self.queues.get(id.0)
    }

    pub fn queue_mut(&mut self, id: QueueId) -> Option<&mut QueueElement> {
        self.queues.get_mut(id.0)
    }

    pub fn pipe(&self, id: PipeId) -> Option<&Pipe> {
        self.pipes.get(id.0)
    }

    pub fn input(&self, id: InputQueueId) -> Option<&LosslessInputQueue> {
        self.inputs.get(id.0)
    }

    pub fn input_mut(&mut self, id: InputQueueId) -> Option<&mut LosslessInputQueue> {
        self.inputs.get_mut(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// 按键查边，不论链路状态
    pub fn lookup(&self, key: EdgeKey) -> Option<&Edge> {
        self.index.get(&key).map(|id| &self.edges[id.0])
    }

    /// 按键查一条处于 up 状态的边
    pub fn live(&self, class: EdgeClass, from: usize, to: usize) -> Option<&Edge> {
        self.lookup(EdgeKey::new(class, from, to)).filter(|e| e.up)
    }

    /// 交换机间的一跳：普通链路优先，只有普通链路不存在（或 down）时才用 Plus 链路
    pub fn switch_hop(&self, from: usize, to: usize) -> Option<&Edge> {
        self.live(EdgeClass::Switch, from, to)
            .or_else(|| self.live(EdgeClass::Plus, from, to))
    }

    /// 设置链路 up/down，返回之前的状态
    pub(crate) fn set_edge_up(&mut self, key: EdgeKey, up: bool) -> Option<bool> {
        let id = *self.index.get(&key)?;
        let edge = &mut self.edges[id.0];
        let prev = edge.up;
        edge.up = up;
        Some(prev)
    }

    pub fn failed_links(&self) -> usize {
        self.edges.iter().filter(|e| !e.up).count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn edge_count(&self, class: EdgeClass) -> usize {
        self.edges.iter().filter(|e| e.key.class == class).count()
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}
