//! 拓扑构建
//!
//! DragonFly+ 拓扑：参数求解、fabric 构建与多路径枚举。

pub mod config;
pub mod dragonfly_plus;
mod error;
mod paths;

pub use config::TopologyConfig;
pub use dragonfly_plus::{
    DfpParams, DragonFlyPlus, DragonFlyPlusOpts, MTU_BYTES, TopologySize, build_dragonfly_plus,
    build_dragonfly_plus_logged,
};
pub use error::TopologyError;
pub use paths::{PathDump, RouteDump};
