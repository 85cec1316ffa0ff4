//! 统计信息
//!
//! 定义终端接收端的统计数据结构。

/// 接收统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
}
