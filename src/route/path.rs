//! 路由类型
//!
//! 一次路径枚举产生的所有路由（正向与反向）归同一个 `PathSet` 所有，
//! 反向关系只是 arena 内的下标查找，不构成所有权。

use serde::{Deserialize, Serialize};

use crate::net::{PipeId, QueueId, RemoteEndpoint, TerminalSink};

/// 路由标识符（`PathSet` 内的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(pub usize);

/// 路由上的一个元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteElement {
    Queue(QueueId),
    Pipe(PipeId),
    /// 接收端驱动策略下紧跟在一跳之后的 remote endpoint
    Remote(RemoteEndpoint),
    Sink(TerminalSink),
}

impl RouteElement {
    pub fn as_queue(&self) -> Option<QueueId> {
        match self {
            RouteElement::Queue(q) => Some(*q),
            _ => None,
        }
    }

    pub fn as_pipe(&self) -> Option<PipeId> {
        match self {
            RouteElement::Pipe(p) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    id: RouteId,
    elements: Vec<RouteElement>,
    path_id: usize,
    path_count: usize,
    reverse: Option<RouteId>,
}

impl Route {
    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn elements(&self) -> &[RouteElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn at(&self, i: usize) -> Option<&RouteElement> {
        self.elements.get(i)
    }

    pub fn path_id(&self) -> usize {
        self.path_id
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn reverse_id(&self) -> Option<RouteId> {
        self.reverse
    }

    /// 按顺序返回路由经过的队列
    pub fn queues(&self) -> impl Iterator<Item = QueueId> + '_ {
        self.elements.iter().filter_map(RouteElement::as_queue)
    }

    /// 末尾的 sink 之前的最后一个队列
    pub fn last_queue(&self) -> Option<QueueId> {
        self.elements.iter().rev().find_map(RouteElement::as_queue)
    }

    pub fn sink(&self) -> Option<&TerminalSink> {
        match self.elements.last() {
            Some(RouteElement::Sink(s)) => Some(s),
            _ => None,
        }
    }

    pub fn sink_mut(&mut self) -> Option<&mut TerminalSink> {
        match self.elements.last_mut() {
            Some(RouteElement::Sink(s)) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<RouteElement> {
        &mut self.elements
    }

    pub(crate) fn set_path_id(&mut self, path_id: usize, path_count: usize) {
        self.path_id = path_id;
        self.path_count = path_count;
    }

    pub(crate) fn set_reverse(&mut self, reverse: Option<RouteId>) {
        self.reverse = reverse;
    }
}

/// 一对主机之间枚举出的全部路径
#[derive(Debug, Default, Clone)]
pub struct PathSet {
    routes: Vec<Route>,
    forward: Vec<RouteId>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一对互为反向的路由，返回正向路由的 id
    pub(crate) fn push_pair(
        &mut self,
        forward: Vec<RouteElement>,
        reverse: Vec<RouteElement>,
        path_id: usize,
        path_count: usize,
    ) -> RouteId {
        let fwd = RouteId(self.routes.len());
        let back = RouteId(fwd.0 + 1);
        self.routes.push(Route {
            id: fwd,
            elements: forward,
            path_id,
            path_count,
            reverse: Some(back),
        });
        self.routes.push(Route {
            id: back,
            elements: reverse,
            path_id,
            path_count,
            reverse: Some(fwd),
        });
        self.forward.push(fwd);
        fwd
    }

    /// 正向路径数
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// 按发现顺序遍历正向路由
    pub fn iter(&self) -> impl Iterator<Item = &Route> + '_ {
        self.forward.iter().map(|id| &self.routes[id.0])
    }

    /// 按 path id 取正向路由
    pub fn get(&self, path_id: usize) -> Option<&Route> {
        self.forward.get(path_id).map(|id| &self.routes[id.0])
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    pub(crate) fn route_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.routes.get_mut(id.0)
    }

    pub fn reverse(&self, route: &Route) -> Option<&Route> {
        route.reverse.and_then(|id| self.route(id))
    }

    /// 基于任意 key（如 flow id）的稳定选路
    pub fn pick(&self, key: u64) -> Option<&Route> {
        if self.forward.is_empty() {
            return None;
        }
        let idx = (mix64(key) % self.forward.len() as u64) as usize;
        self.get(idx)
    }
}

/// 一个简单、确定性的 64-bit mixing（splitmix64）
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
