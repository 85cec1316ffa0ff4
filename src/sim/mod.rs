//! 仿真核心模块
//!
//! 拓扑构建与路径枚举只依赖仿真时间；事件调度由上层仿真器负责。

mod time;

pub use time::SimTime;
