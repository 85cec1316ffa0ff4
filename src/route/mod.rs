//! 路由与路径集合
//!
//! `Route` 是交替排列的队列/pipe 序列，以独占的 sink 结尾；
//! 正反向路由成对存放在 `PathSet` 中，互相以 `RouteId` 引用。

mod path;
mod validate;

pub use path::{PathSet, Route, RouteElement, RouteId};
pub use validate::{RouteError, RouteValidator};
