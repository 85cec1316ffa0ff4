//! 终端接收端
//!
//! 每条枚举出的路由以一个独占的 sink 结尾：收包、计数、丢弃。

use super::packet::Packet;
use super::stats::Stats;
use tracing::trace;

/// 接收并丢弃的终端 sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSink {
    name: String,
    stats: Stats,
}

impl TerminalSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Stats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// 消费一个到达的包
    pub fn receive(&mut self, pkt: Packet) {
        trace!(sink = %self.name, pkt_id = pkt.id, size_bytes = pkt.size_bytes, "sink 收包");
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += pkt.size_bytes as u64;
    }
}
