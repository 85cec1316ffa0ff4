//! 路由合法性检查
//!
//! 路径枚举在构造时已保证这些不变量；这里用于捕获之后的破坏，
//! 例如上层在拿到路由后改动了它。检查按顺序进行，遇到第一个失败即返回。

use tracing::warn;

use super::path::{PathSet, Route, RouteElement};
use crate::net::{Fabric, RemoteEndpoint};
use crate::queue::QueueDiscipline;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route is empty")]
    Empty,
    #[error("element {position} does not resolve to a fabric element")]
    Dangling { position: usize },
    #[error("element {position} breaks the queue/pipe alternation")]
    Alternation { position: usize },
    #[error("queue at element {position} has no remote endpoint")]
    MissingRemote { position: usize },
    #[error("remote endpoint of the hop starting at element {position} is not carried by the route")]
    RemoteNotCarried { position: usize },
    #[error("route has no reverse")]
    NoReverse,
    #[error("reverse route does not point back to this route")]
    ReverseMismatch,
    #[error("path id {path_id} is out of range for {path_count} paths")]
    PathIdOutOfRange { path_id: usize, path_count: usize },
    #[error("path id/count {forward:?} differs from reverse {reverse:?}")]
    PathIdMismatch {
        forward: (usize, usize),
        reverse: (usize, usize),
    },
}

/// 针对某个 fabric 与队列策略的路由检查器
#[derive(Debug, Clone, Copy)]
pub struct RouteValidator<'a> {
    fabric: &'a Fabric,
    discipline: QueueDiscipline,
}

impl<'a> RouteValidator<'a> {
    pub fn new(fabric: &'a Fabric, discipline: QueueDiscipline) -> Self {
        Self { fabric, discipline }
    }

    /// 合法返回 true；不合法时记录原因并返回 false
    pub fn validate(&self, set: &PathSet, route: &Route) -> bool {
        match self.check(set, route) {
            Ok(()) => true,
            Err(err) => {
                warn!(route = ?route.id(), path_id = route.path_id(), %err, "非法路由");
                false
            }
        }
    }

    pub fn check(&self, set: &PathSet, route: &Route) -> Result<(), RouteError> {
        let elements = route.elements();
        if elements.is_empty() {
            return Err(RouteError::Empty);
        }
        self.check_present(elements)?;
        check_alternation(elements)?;
        if self.discipline.is_lossless() {
            self.check_remotes(elements)?;
        }

        let reverse = set.reverse(route).ok_or(RouteError::NoReverse)?;
        if reverse.reverse_id() != Some(route.id()) {
            return Err(RouteError::ReverseMismatch);
        }

        for r in [route, reverse] {
            if r.path_id() >= r.path_count() {
                return Err(RouteError::PathIdOutOfRange {
                    path_id: r.path_id(),
                    path_count: r.path_count(),
                });
            }
        }
        if route.path_id() != reverse.path_id() || route.path_count() != reverse.path_count() {
            return Err(RouteError::PathIdMismatch {
                forward: (route.path_id(), route.path_count()),
                reverse: (reverse.path_id(), reverse.path_count()),
            });
        }
        Ok(())
    }

    fn check_present(&self, elements: &[RouteElement]) -> Result<(), RouteError> {
        for (position, el) in elements.iter().enumerate() {
            let present = match el {
                RouteElement::Queue(q) => self.fabric.queue(*q).is_some(),
                RouteElement::Pipe(p) => self.fabric.pipe(*p).is_some(),
                RouteElement::Remote(RemoteEndpoint::Queue(q)) => self.fabric.queue(*q).is_some(),
                RouteElement::Remote(RemoteEndpoint::Input(i)) => self.fabric.input(*i).is_some(),
                RouteElement::Sink(_) => true,
            };
            if !present {
                return Err(RouteError::Dangling { position });
            }
        }
        Ok(())
    }

    fn check_remotes(&self, elements: &[RouteElement]) -> Result<(), RouteError> {
        for (position, el) in elements.iter().enumerate() {
            let Some(q) = el.as_queue() else {
                continue;
            };
            let remote = self
                .fabric
                .remote_endpoint(q)
                .ok_or(RouteError::MissingRemote { position })?;
            // 输入队列寻址时 remote 必须紧跟在这一跳的 pipe 之后
            if self.discipline.uses_input_queues()
                && elements.get(position + 2) != Some(&RouteElement::Remote(remote))
            {
                return Err(RouteError::RemoteNotCarried { position });
            }
        }
        Ok(())
    }
}

/// 去掉 remote 元素后，偶数位必须是队列（最后一位是 sink），奇数位必须是 pipe；
/// remote 只能紧跟在 pipe 之后。
fn check_alternation(elements: &[RouteElement]) -> Result<(), RouteError> {
    let last = elements.len() - 1;
    let mut slot = 0usize;
    for (position, el) in elements.iter().enumerate() {
        let ok = match el {
            RouteElement::Remote(_) => {
                if position == 0 || elements[position - 1].as_pipe().is_none() {
                    return Err(RouteError::Alternation { position });
                }
                continue;
            }
            RouteElement::Queue(_) => slot % 2 == 0,
            RouteElement::Sink(_) => slot % 2 == 0 && position == last,
            RouteElement::Pipe(_) => slot % 2 == 1,
        };
        if !ok {
            return Err(RouteError::Alternation { position });
        }
        slot += 1;
    }
    if !matches!(elements[last], RouteElement::Sink(_)) {
        return Err(RouteError::Alternation { position: last });
    }
    Ok(())
}
