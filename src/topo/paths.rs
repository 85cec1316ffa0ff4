//! 路径枚举
//!
//! 对一对主机找出直达路径（0 或 1 跳交换机间链路）以及经过任一第三台交换机的
//! 两跳路径。先在 fabric 上把每条候选路径的正反向边全部解析出来，只有完整可建的
//! 路径才计入路径总数，然后再按发现顺序构建路由并编号。

use serde::Serialize;
use tracing::debug;

use super::dragonfly_plus::DragonFlyPlus;
use crate::net::{EdgeClass, EdgeId, TerminalSink};
use crate::route::{PathSet, Route, RouteElement};

/// 一条候选路径解析出的正反向边序列
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPlan {
    forward: Vec<EdgeId>,
    reverse: Vec<EdgeId>,
}

/// 路由的可序列化调试输出
#[derive(Debug, Clone, Serialize)]
pub struct RouteDump {
    pub path_id: usize,
    pub path_count: usize,
    pub forward: Vec<String>,
    pub reverse: Vec<String>,
}

/// 一对主机的全部路径
#[derive(Debug, Clone, Serialize)]
pub struct PathDump {
    pub src: usize,
    pub dst: usize,
    pub paths: Vec<RouteDump>,
}

impl DragonFlyPlus {
    /// 枚举 `src` 到 `dst` 的所有双向路径
    ///
    /// 主机越界或不可达时返回空集合；调用方应把它当作“不可达”，而不是可重试的错误。
    #[tracing::instrument(skip(self))]
    pub fn enumerate(&self, src: usize, dst: usize) -> PathSet {
        let nodes = self.node_count();
        if src >= nodes || dst >= nodes {
            debug!(nodes, "主机越界，无路径");
            return PathSet::new();
        }

        let src_sw = self.host_switch(src);
        let dst_sw = self.host_switch(dst);

        let mut plans = Vec::new();
        plans.extend(self.plan_path(src, dst, None));
        for via in 0..self.switch_count() {
            if via != src_sw && via != dst_sw {
                plans.extend(self.plan_path(src, dst, Some(via)));
            }
        }

        let path_count = plans.len();
        let mut set = PathSet::new();
        for (path_id, plan) in plans.iter().enumerate() {
            let mut forward = self.materialize(&plan.forward);
            let mut reverse = self.materialize(&plan.reverse);
            forward.push(RouteElement::Sink(TerminalSink::new(format!(
                "SinkOut_{path_id}"
            ))));
            reverse.push(RouteElement::Sink(TerminalSink::new(format!(
                "SinkBack_{path_id}"
            ))));
            set.push_pair(forward, reverse, path_id, path_count);
        }

        debug!(src_sw, dst_sw, path_count, "路径枚举完成");
        set
    }

    /// 解析一条候选路径；`via` 为 None 时是直达路径。任何一段边缺失（或 down）都返回 None。
    fn plan_path(&self, src: usize, dst: usize, via: Option<usize>) -> Option<PathPlan> {
        let fabric = self.fabric();
        let src_sw = self.host_switch(src);
        let dst_sw = self.host_switch(dst);

        let mut forward = vec![fabric.live(EdgeClass::HostUp, src, src_sw)?.id];
        let mut reverse = vec![fabric.live(EdgeClass::HostUp, dst, dst_sw)?.id];

        match via {
            None => {
                if src_sw != dst_sw {
                    forward.push(fabric.switch_hop(src_sw, dst_sw)?.id);
                    reverse.push(fabric.switch_hop(dst_sw, src_sw)?.id);
                }
            }
            Some(i) => {
                forward.push(fabric.switch_hop(src_sw, i)?.id);
                forward.push(fabric.switch_hop(i, dst_sw)?.id);
                reverse.push(fabric.switch_hop(dst_sw, i)?.id);
                reverse.push(fabric.switch_hop(i, src_sw)?.id);
            }
        }

        forward.push(fabric.live(EdgeClass::HostDown, dst_sw, dst)?.id);
        reverse.push(fabric.live(EdgeClass::HostDown, src_sw, src)?.id);
        Some(PathPlan { forward, reverse })
    }

    /// 把边序列展开为 queue/pipe（以及输入队列寻址下的 remote）元素
    fn materialize(&self, edges: &[EdgeId]) -> Vec<RouteElement> {
        let fabric = self.fabric();
        let carry_remote = self.discipline().uses_input_queues();
        let mut out = Vec::with_capacity(edges.len() * 3 + 1);
        for edge in edges.iter().filter_map(|id| fabric.edge(*id)) {
            out.push(RouteElement::Queue(edge.queue));
            out.push(RouteElement::Pipe(edge.pipe));
            if carry_remote {
                if let Some(remote) = fabric.remote_endpoint(edge.queue) {
                    out.push(RouteElement::Remote(remote));
                }
            }
        }
        out
    }

    /// 路由经过的交换机序列（由各跳队列所在的边推出）
    pub fn route_switches(&self, route: &Route) -> Vec<usize> {
        let fabric = self.fabric();
        let mut out = Vec::new();
        for key in route.queues().filter_map(|q| fabric.queue(q)).map(|q| q.edge()) {
            if key.class != EdgeClass::HostDown {
                out.push(key.to);
            }
        }
        out
    }

    /// 一对主机全部路径的调试输出
    pub fn dump_paths(&self, src: usize, dst: usize, set: &PathSet) -> PathDump {
        let names = |r: &Route| {
            r.elements()
                .iter()
                .map(|el| self.element_name(el).to_string())
                .collect::<Vec<_>>()
        };
        let paths = set
            .iter()
            .map(|r| RouteDump {
                path_id: r.path_id(),
                path_count: r.path_count(),
                forward: names(r),
                reverse: set.reverse(r).map(&names).unwrap_or_default(),
            })
            .collect();
        PathDump { src, dst, paths }
    }
}
