use crate::net::{Ecn, HEADER_BYTES, Packet, PacketKind};

#[test]
fn data_packets_are_ecn_capable_and_acks_are_control() {
    let data = Packet::data(1, 9, 1500);
    assert_eq!(data.kind, PacketKind::Data);
    assert_eq!(data.ecn, Ecn::Ect);
    assert!(!data.is_control());

    let ack = Packet::ack(2, 9);
    assert_eq!(ack.size_bytes, HEADER_BYTES);
    assert_eq!(ack.ecn, Ecn::NotEct);
    assert!(ack.is_control());
}

#[test]
fn trim_keeps_identity_and_shrinks_to_header() {
    let pkt = Packet::data(3, 4, 1500).trim();
    assert_eq!(pkt.id, 3);
    assert_eq!(pkt.flow_id, 4);
    assert_eq!(pkt.size_bytes, HEADER_BYTES);
    assert_eq!(pkt.kind, PacketKind::Header);
    assert!(pkt.is_control());

    let small = Packet::data(5, 4, 20).trim();
    assert_eq!(small.size_bytes, 20);
}

#[test]
fn mark_ce_only_applies_to_ect_packets() {
    let mut data = Packet::data(1, 0, 100);
    assert!(data.mark_ce());
    assert_eq!(data.ecn, Ecn::Ce);
    assert!(!data.mark_ce());

    let mut ack = Packet::ack(2, 0);
    assert!(!ack.mark_ce());
    assert_eq!(ack.ecn, Ecn::NotEct);
}
