//! 数据包类型
//!
//! 队列策略只关心大小、类别和 ECN 位，路由由 `Route` 在包外携带。

/// ECN 码点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ecn {
    #[default]
    NotEct,
    Ect,
    Ce,
}

/// 包的类别，决定优先级队列中的调度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketKind {
    #[default]
    Data,
    Ack,
    /// 被 composite 队列裁剪后只剩包头的数据包
    Header,
}

pub const HEADER_BYTES: u32 = 64;

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    pub size_bytes: u32,
    pub kind: PacketKind,
    pub ecn: Ecn,
}

impl Packet {
    /// 创建数据包（ECN capable）
    pub fn data(id: u64, flow_id: u64, size_bytes: u32) -> Self {
        Self {
            id,
            flow_id,
            size_bytes,
            kind: PacketKind::Data,
            ecn: Ecn::Ect,
        }
    }

    /// 创建 ACK
    pub fn ack(id: u64, flow_id: u64) -> Self {
        Self {
            id,
            flow_id,
            size_bytes: HEADER_BYTES,
            kind: PacketKind::Ack,
            ecn: Ecn::NotEct,
        }
    }

    /// 控制类包（ACK、被裁剪的包头）享有高优先级
    pub fn is_control(&self) -> bool {
        matches!(self.kind, PacketKind::Ack | PacketKind::Header)
    }

    /// 裁剪为只剩包头
    pub fn trim(mut self) -> Self {
        self.kind = PacketKind::Header;
        self.size_bytes = self.size_bytes.min(HEADER_BYTES);
        self
    }

    /// 标记拥塞（只对 ECN capable 的包生效）
    pub fn mark_ce(&mut self) -> bool {
        if self.ecn == Ecn::Ect {
            self.ecn = Ecn::Ce;
            true
        } else {
            false
        }
    }
}
