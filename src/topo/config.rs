//! 拓扑配置文件（JSON）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dragonfly_plus::{DragonFlyPlusOpts, TopologySize};
use super::error::TopologyError;
use crate::queue::{QueueDiscipline, mem_from_pkt};
use crate::sim::SimTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub topology: TopologySize,
    /// 队列策略标签，见 `QueueDiscipline::tag`
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub rtt_us: Option<u64>,
    #[serde(default)]
    pub queue_size_pkts: Option<u64>,
    #[serde(default)]
    pub link_speed_mbps: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TopologyConfig {
    pub fn from_json_str(s: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, TopologyError> {
        let text = fs::read_to_string(path).map_err(|source| TopologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// 解析为构建选项；未给出的字段取默认值
    pub fn to_opts(&self) -> Result<DragonFlyPlusOpts, TopologyError> {
        let defaults = DragonFlyPlusOpts::default();
        let discipline = match &self.discipline {
            Some(tag) => tag.parse::<QueueDiscipline>()?,
            None => defaults.discipline,
        };
        Ok(DragonFlyPlusOpts {
            size: self.topology,
            discipline,
            rtt: self.rtt_us.map(SimTime::from_micros).unwrap_or(defaults.rtt),
            queue_size_bytes: self
                .queue_size_pkts
                .map(mem_from_pkt)
                .unwrap_or(defaults.queue_size_bytes),
            link_speed_mbps: self.link_speed_mbps.unwrap_or(defaults.link_speed_mbps),
            seed: self.seed.unwrap_or(defaults.seed),
        })
    }
}
