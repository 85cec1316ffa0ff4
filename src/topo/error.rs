//! 拓扑构建错误
//!
//! 这些都是配置错误：请求的 fabric 无法构建，重试不会有不同结果。

use std::path::PathBuf;

use crate::queue::ParseDisciplineError;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("can't have a DragonFly Plus with {requested} nodes (nearest balanced size is {nearest})")]
    UnsatisfiableNodeCount { requested: usize, nearest: usize },
    #[error(transparent)]
    UnknownDiscipline(#[from] ParseDisciplineError),
    #[error("invalid DragonFly Plus parameters: {0}")]
    InvalidParams(String),
    #[error("failed to read topology config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed topology config: {0}")]
    Config(#[from] serde_json::Error),
}
