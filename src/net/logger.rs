//! 元素命名日志
//!
//! 构建 fabric 时把每个 queue/pipe/输入队列/交换机的名字交给可选的 logger，
//! 便于离线把日志中的 id 还原为名字。是否挂 logger 不影响构建结果。

use serde::{Deserialize, Serialize};

/// 被记录对象的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggedKind {
    Queue,
    Pipe,
    InputQueue,
    Switch,
}

/// 接收命名对象的 logger
pub trait NameLogger {
    fn write_name(&mut self, kind: LoggedKind, id: usize, name: &str);
}

/// 一条命名记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub kind: LoggedKind,
    pub id: usize,
    pub name: String,
}

/// 内存中的命名日志
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NameLog {
    pub entries: Vec<NameEntry>,
}

impl NameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: LoggedKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn lookup(&self, kind: LoggedKind, id: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.id == id)
            .map(|e| e.name.as_str())
    }
}

impl NameLogger for NameLog {
    fn write_name(&mut self, kind: LoggedKind, id: usize, name: &str) {
        self.entries.push(NameEntry {
            kind,
            id,
            name: name.to_string(),
        });
    }
}
