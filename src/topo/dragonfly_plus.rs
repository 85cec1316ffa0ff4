//! DragonFly+ 拓扑构建
//!
//! 参数：
//! - p：每台交换机挂的主机数
//! - a：每组交换机数（组内全互联）
//! - h：每台交换机的全局链路数
//! - h′：每台交换机的补充（Plus）全局链路数
//!
//! 派生：组数 g = a·h + 1，交换机数 g·a，主机数 a·p·g。
//! 均衡配置取 p = k, a = 2k, h = k, h′ = k/2。

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::error::TopologyError;
use crate::net::{
    EdgeClass, EdgeKey, EdgeSpec, Fabric, LoggedKind, NameLogger, QueueId, RemoteEndpoint,
    Switch, SwitchId,
};
use crate::queue::{
    FEEDER_BUFFER_PKTS, HOST_NIC_MBPS, QueueDiscipline, QueueFactory, Role, mem_from_pkt,
    speed_from_mbps,
};
use crate::route::{PathSet, Route, RouteElement, RouteValidator};
use crate::sim::SimTime;

/// 固定 MTU
pub const MTU_BYTES: u32 = 1500;

/// DragonFly+ 基数参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DfpParams {
    pub p: usize,
    pub a: usize,
    pub h: usize,
    pub h_plus: usize,
}

impl DfpParams {
    /// 以基数 k 生成均衡配置
    pub fn balanced(k: usize) -> Self {
        Self {
            p: k,
            a: 2 * k,
            h: k,
            h_plus: k / 2,
        }
    }

    pub fn groups(&self) -> usize {
        self.a * self.h + 1
    }

    pub fn switches(&self) -> usize {
        self.groups() * self.a
    }

    pub fn nodes(&self) -> usize {
        self.a * self.p * self.groups()
    }

    fn checked_nodes(&self) -> Option<usize> {
        let groups = self.a.checked_mul(self.h)?.checked_add(1)?;
        self.a.checked_mul(self.p)?.checked_mul(groups)
    }

    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.p == 0 || self.a == 0 {
            return Err(TopologyError::InvalidParams(format!(
                "p and a must be at least 1 (p={}, a={})",
                self.p, self.a
            )));
        }
        if self.h > self.a || self.h_plus > self.a {
            return Err(TopologyError::InvalidParams(format!(
                "h={} and h'={} must not exceed a={}",
                self.h, self.h_plus, self.a
            )));
        }
        if self.checked_nodes().is_none() {
            return Err(TopologyError::InvalidParams(
                "derived node count overflows".to_string(),
            ));
        }
        Ok(())
    }

    /// 目标规模模式：找到第一个主机数不小于 `target` 的均衡配置，必须恰好等于 `target`
    pub fn for_node_count(target: usize) -> Result<Self, TopologyError> {
        if target == 0 {
            return Err(TopologyError::InvalidParams(
                "target node count must be at least 1".to_string(),
            ));
        }
        let mut k = 0usize;
        loop {
            k += 1;
            let params = Self::balanced(k);
            let nodes = params.checked_nodes().ok_or_else(|| {
                TopologyError::InvalidParams(format!("no balanced size reaches {target} nodes"))
            })?;
            if nodes < target {
                continue;
            }
            if nodes > target {
                return Err(TopologyError::UnsatisfiableNodeCount {
                    requested: target,
                    nearest: nodes,
                });
            }
            return Ok(params);
        }
    }
}

/// 拓扑规模：直接给参数，或给目标主机数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySize {
    Explicit(DfpParams),
    Nodes { count: usize },
}

impl TopologySize {
    pub fn resolve(&self) -> Result<DfpParams, TopologyError> {
        let params = match *self {
            TopologySize::Explicit(params) => params,
            TopologySize::Nodes { count } => DfpParams::for_node_count(count)?,
        };
        params.validate()?;
        Ok(params)
    }
}

/// DragonFly+ 构建选项
#[derive(Debug, Clone)]
pub struct DragonFlyPlusOpts {
    pub size: TopologySize,
    pub discipline: QueueDiscipline,
    /// 每条 pipe 的固定时延
    pub rtt: SimTime,
    pub queue_size_bytes: u64,
    pub link_speed_mbps: u64,
    /// 随机早丢队列的 RNG 种子
    pub seed: u64,
}

impl Default for DragonFlyPlusOpts {
    fn default() -> Self {
        Self {
            size: TopologySize::Explicit(DfpParams::balanced(2)),
            discipline: QueueDiscipline::Random,
            rtt: SimTime::from_micros(1),
            queue_size_bytes: mem_from_pkt(FEEDER_BUFFER_PKTS),
            link_speed_mbps: HOST_NIC_MBPS,
            seed: 13,
        }
    }
}

/// 构建完成的 DragonFly+ 拓扑，独占整个 fabric
#[derive(Debug)]
pub struct DragonFlyPlus {
    params: DfpParams,
    discipline: QueueDiscipline,
    rtt: SimTime,
    fabric: Fabric,
    switches: Vec<Switch>,
}

pub fn build_dragonfly_plus(opts: &DragonFlyPlusOpts) -> Result<DragonFlyPlus, TopologyError> {
    Builder::new(opts, None)?.build()
}

/// 同 `build_dragonfly_plus`，并把每个元素的名字交给 `logger`
pub fn build_dragonfly_plus_logged(
    opts: &DragonFlyPlusOpts,
    logger: &mut dyn NameLogger,
) -> Result<DragonFlyPlus, TopologyError> {
    Builder::new(opts, Some(logger))?.build()
}

struct Builder<'a> {
    params: DfpParams,
    opts: &'a DragonFlyPlusOpts,
    factory: QueueFactory,
    fabric: Fabric,
    switches: Vec<Switch>,
    logger: Option<&'a mut dyn NameLogger>,
}

impl<'a> Builder<'a> {
    fn new(
        opts: &'a DragonFlyPlusOpts,
        logger: Option<&'a mut dyn NameLogger>,
    ) -> Result<Self, TopologyError> {
        let params = opts.size.resolve()?;
        Ok(Self {
            params,
            opts,
            factory: QueueFactory::new(opts.discipline, opts.seed),
            fabric: Fabric::new(),
            switches: Vec::new(),
            logger,
        })
    }

    #[tracing::instrument(skip(self), fields(discipline = %self.opts.discipline))]
    fn build(mut self) -> Result<DragonFlyPlus, TopologyError> {
        let DfpParams { p, a, h, h_plus } = self.params;
        info!(
            p,
            a,
            h,
            h_plus,
            groups = self.params.groups(),
            switches = self.params.switches(),
            nodes = self.params.nodes(),
            "构建 DragonFly Plus 拓扑"
        );

        if self.opts.discipline.is_lossless() {
            for j in 0..self.params.switches() {
                let name = format!("Switch_{j}");
                self.log(LoggedKind::Switch, j, &name);
                self.switches.push(Switch::new(SwitchId(j), name));
            }
        }

        self.build_host_links();
        self.build_group_links();
        self.build_global_links();
        self.build_plus_links();

        debug!(
            host_up = self.fabric.edge_count(EdgeClass::HostUp),
            host_down = self.fabric.edge_count(EdgeClass::HostDown),
            switch = self.fabric.edge_count(EdgeClass::Switch),
            plus = self.fabric.edge_count(EdgeClass::Plus),
            input_queues = self.fabric.input_count(),
            "fabric 构建完成"
        );

        Ok(DragonFlyPlus {
            params: self.params,
            discipline: self.opts.discipline,
            rtt: self.opts.rtt,
            fabric: self.fabric,
            switches: self.switches,
        })
    }

    fn log(&mut self, kind: LoggedKind, id: usize, name: &str) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.write_name(kind, id, name);
        }
    }

    fn add_edge(&mut self, key: EdgeKey, role: Role, name: String, src_queue: bool) -> QueueId {
        let queue = if src_queue {
            self.factory.alloc_src_queue()
        } else {
            self.factory.alloc_queue(role, self.opts.queue_size_bytes)
        };
        let pipe_name = format!("Pipe-{name}");
        let edge = self.fabric.add_edge(EdgeSpec {
            key,
            role,
            bandwidth_bps: speed_from_mbps(self.opts.link_speed_mbps),
            queue,
            queue_name: name.clone(),
            pipe_name: pipe_name.clone(),
            delay: self.opts.rtt,
        });
        trace!(?key, queue = ?edge.queue, pipe = ?edge.pipe, "创建边");
        self.log(LoggedKind::Queue, edge.queue.0, &name);
        self.log(LoggedKind::Pipe, edge.pipe.0, &pipe_name);
        edge.queue
    }

    /// 按策略给一对反向队列接线；`owner_*` 为队列所在交换机（主机侧队列为 None）
    fn wire_pair(
        &mut self,
        fwd: QueueId,
        fwd_owner: Option<usize>,
        back: QueueId,
        back_owner: Option<usize>,
    ) {
        match self.opts.discipline {
            QueueDiscipline::Lossless => {
                for (q, owner) in [(fwd, fwd_owner), (back, back_owner)] {
                    if let Some(sw) = owner {
                        self.switches[sw].add_port(q);
                    }
                }
                self.fabric.set_remote_endpoint(fwd, RemoteEndpoint::Queue(back));
                self.fabric.set_remote_endpoint(back, RemoteEndpoint::Queue(fwd));
            }
            QueueDiscipline::LosslessInput | QueueDiscipline::LosslessInputEcn => {
                for q in [fwd, back] {
                    let name = match self.fabric.queue(q) {
                        Some(el) => format!("InputQueue-{}", el.name()),
                        None => continue,
                    };
                    let input = self.fabric.wrap_with_input(q, name.as_str());
                    self.log(LoggedKind::InputQueue, input.0, &name);
                }
            }
            _ => {}
        }
    }

    /// 1. 主机 <-> 交换机
    fn build_host_links(&mut self) {
        let p = self.params.p;
        for j in 0..self.params.switches() {
            for l in 0..p {
                let k = j * p + l;
                let down = self.add_edge(
                    EdgeKey::new(EdgeClass::HostDown, j, k),
                    Role::Edge,
                    format!("SW{j}->DST{k}"),
                    false,
                );
                let up = self.add_edge(
                    EdgeKey::new(EdgeClass::HostUp, k, j),
                    Role::Edge,
                    format!("SRC{k}->SW{j}"),
                    true,
                );
                self.wire_pair(down, Some(j), up, None);
            }
        }
    }

    /// 2. 组内全互联
    fn build_group_links(&mut self) {
        let a = self.params.a;
        for j in 0..self.params.switches() {
            let group_end = (j / a + 1) * a;
            for k in j + 1..group_end {
                self.connect_switches(EdgeClass::Switch, j, k, "");
            }
        }
    }

    /// 3. 组间全局链路：组 g1 的第 i 台连组 g2 的第 i 台
    fn build_global_links(&mut self) {
        let DfpParams { a, h, .. } = self.params;
        let groups = self.params.groups();
        for g1 in 0..groups {
            for g2 in g1 + 1..groups {
                for i in 0..h {
                    self.connect_switches(EdgeClass::Switch, g1 * a + i, g2 * a + i, "(Global)");
                }
            }
        }
    }

    /// 4. Plus 链路：组 g1 的第 i 台（i < h′）连组 g2 的第 a-i-1 台
    fn build_plus_links(&mut self) {
        let DfpParams { a, h_plus, .. } = self.params;
        let groups = self.params.groups();
        for g1 in 0..groups {
            for g2 in g1 + 1..groups {
                for i in 0..h_plus {
                    let src = g1 * a + i;
                    let dst = g2 * a + (a - i - 1);
                    self.connect_switches(EdgeClass::Plus, src, dst, "(Plus)");
                }
            }
        }
    }

    fn connect_switches(&mut self, class: EdgeClass, src: usize, dst: usize, suffix: &str) {
        let fwd = self.add_edge(
            EdgeKey::new(class, src, dst),
            Role::Core,
            format!("SW{src}->SW{dst}{suffix}"),
            false,
        );
        let back = self.add_edge(
            EdgeKey::new(class, dst, src),
            Role::Core,
            format!("SW{dst}->SW{src}{suffix}"),
            false,
        );
        self.wire_pair(fwd, Some(src), back, Some(dst));
    }
}

impl DragonFlyPlus {
    pub fn params(&self) -> DfpParams {
        self.params
    }

    pub fn discipline(&self) -> QueueDiscipline {
        self.discipline
    }

    pub fn rtt(&self) -> SimTime {
        self.rtt
    }

    pub fn node_count(&self) -> usize {
        self.params.nodes()
    }

    pub fn switch_count(&self) -> usize {
        self.params.switches()
    }

    pub fn group_count(&self) -> usize {
        self.params.groups()
    }

    pub fn mtu(&self) -> u32 {
        MTU_BYTES
    }

    /// 交换机所在的组
    pub fn group_of(&self, switch: usize) -> usize {
        switch / self.params.a
    }

    /// 主机所连的 ToR 交换机
    pub fn host_switch(&self, host: usize) -> usize {
        host / self.params.p
    }

    pub fn host_group(&self, host: usize) -> usize {
        host / (self.params.a * self.params.p)
    }

    pub fn fabric(&self) -> &Fabric {
        &self.fabric
    }

    /// 可寻址交换机；只有 lossless 类策略会创建
    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn switch(&self, id: SwitchId) -> Option<&Switch> {
        self.switches.get(id.0)
    }

    /// 按放置规则判断两台交换机之间是否应有 Plus 链路（对称）
    pub fn is_plus_link(&self, a_sw: usize, b_sw: usize) -> bool {
        let DfpParams { a, h_plus, .. } = self.params;
        let (ga, gb) = (self.group_of(a_sw), self.group_of(b_sw));
        if ga == gb {
            return false;
        }
        // 编号较小的组一侧取第 i 台，另一侧为第 a-i-1 台
        let (lo, hi) = if ga < gb { (a_sw, b_sw) } else { (b_sw, a_sw) };
        let i = lo % a;
        i < h_plus && hi % a == a - i - 1
    }

    /// 队列所在（出发）的交换机；主机侧上行队列返回 None
    pub fn switch_of_queue(&self, queue: QueueId) -> Option<usize> {
        let key = self.fabric.queue(queue)?.edge();
        match key.class {
            EdgeClass::HostUp => None,
            _ => Some(key.from),
        }
    }

    /// 设置一条单向链路的 up/down 状态，返回之前的状态；链路不存在时返回 None
    pub fn set_link_up(
        &mut self,
        class: EdgeClass,
        from: usize,
        to: usize,
        up: bool,
    ) -> Option<bool> {
        let prev = self.fabric.set_edge_up(EdgeKey::new(class, from, to), up)?;
        if prev != up {
            info!(?class, from, to, up, failed = self.fabric.failed_links(), "链路状态变化");
        }
        Some(prev)
    }

    pub fn failed_links(&self) -> usize {
        self.fabric.failed_links()
    }

    pub fn validator(&self) -> RouteValidator<'_> {
        RouteValidator::new(&self.fabric, self.discipline)
    }

    /// 诊断用：检查一条路由是否合法
    pub fn validate(&self, set: &PathSet, route: &Route) -> bool {
        self.validator().validate(set, route)
    }

    /// 元素名字（调试输出用）
    pub fn element_name<'r>(&'r self, el: &'r RouteElement) -> &'r str {
        let name = match el {
            RouteElement::Queue(q) => self.fabric.queue(*q).map(|q| q.name()),
            RouteElement::Pipe(p) => self.fabric.pipe(*p).map(|p| p.name()),
            RouteElement::Remote(RemoteEndpoint::Queue(q)) => {
                self.fabric.queue(*q).map(|q| q.name())
            }
            RouteElement::Remote(RemoteEndpoint::Input(i)) => {
                self.fabric.input(*i).map(|i| i.name())
            }
            RouteElement::Sink(s) => Some(s.name()),
        };
        name.unwrap_or("NULL")
    }

    /// 逐跳元素名，以空格分隔
    pub fn describe_route(&self, route: &Route) -> String {
        route
            .elements()
            .iter()
            .map(|el| self.element_name(el))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
