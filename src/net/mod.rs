//! 网络组件模块
//!
//! 此模块包含 link fabric 的组成部分：排队元素与传播元素的 arena、交换机、
//! 终端 sink、数据包以及命名日志。

// 子模块声明
mod fabric;
mod id;
mod logger;
mod packet;
mod pipe;
mod sink;
mod stats;
mod switch;

// 重新导出公共接口
pub use fabric::{Edge, EdgeClass, EdgeKey, EdgeSpec, Fabric, QueueElement, RemoteEndpoint};
pub use id::{EdgeId, InputQueueId, PipeId, QueueId, SwitchId};
pub use logger::{LoggedKind, NameEntry, NameLog, NameLogger};
pub use packet::{Ecn, HEADER_BYTES, Packet, PacketKind};
pub use pipe::Pipe;
pub use sink::TerminalSink;
pub use stats::Stats;
pub use switch::Switch;
