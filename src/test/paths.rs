use std::collections::BTreeSet;

use crate::net::{EdgeClass, Packet};
use crate::queue::QueueDiscipline;
use crate::route::{PathSet, RouteElement};
use crate::topo::{DfpParams, DragonFlyPlus, DragonFlyPlusOpts, TopologySize, build_dragonfly_plus};

fn build(params: DfpParams, discipline: QueueDiscipline) -> DragonFlyPlus {
    build_dragonfly_plus(&DragonFlyPlusOpts {
        size: TopologySize::Explicit(params),
        discipline,
        ..DragonFlyPlusOpts::default()
    })
    .expect("build")
}

/// 7 组、21 台交换机，每台 1 个主机；同下标的全局链路与 Plus 链路会重叠
fn overlapping() -> DragonFlyPlus {
    build(
        DfpParams {
            p: 1,
            a: 3,
            h: 2,
            h_plus: 2,
        },
        QueueDiscipline::Random,
    )
}

fn hop_classes(topo: &DragonFlyPlus, set: &PathSet, path_id: usize) -> Vec<EdgeClass> {
    let route = set.get(path_id).expect("route");
    route
        .queues()
        .map(|q| topo.fabric().queue(q).expect("q").edge().class)
        .collect()
}

fn sink_name(route: &crate::route::Route) -> String {
    route.sink().expect("sink").name().to_string()
}

#[test]
fn end_to_end_first_to_last_host() {
    let topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    let set = topo.enumerate(0, 71);

    // 直达路径走 Plus 链路 0<->35，另有 8 台与两端都相邻的中转交换机
    assert_eq!(set.len(), 9);
    let direct = set.get(0).expect("direct");
    assert_eq!(topo.route_switches(direct), vec![0, 35]);
    for route in set.iter() {
        let first = route.queues().next().expect("first queue");
        let edge = topo.fabric().queue(first).expect("q").edge();
        assert_eq!((edge.class, edge.to), (EdgeClass::HostUp, 0));
        let last = route.last_queue().expect("last queue");
        assert_eq!(topo.switch_of_queue(last), Some(71 / 2));
        let edge = topo.fabric().queue(last).expect("q").edge();
        assert_eq!((edge.class, edge.to), (EdgeClass::HostDown, 71));
    }
    assert_eq!(
        topo.describe_route(direct),
        "SRC0->SW0 Pipe-SRC0->SW0 SW0->SW35(Plus) Pipe-SW0->SW35(Plus) \
         SW35->DST71 Pipe-SW35->DST71 SinkOut_0"
    );

    let vias: Vec<usize> = set
        .iter()
        .skip(1)
        .map(|r| topo.route_switches(r)[1])
        .collect();
    assert_eq!(vias, vec![4, 8, 12, 16, 20, 24, 28, 32]);

    let ids: BTreeSet<usize> = set.iter().map(|r| r.path_id()).collect();
    assert_eq!(ids, (0..9).collect());
    for route in set.iter() {
        let rev = set.reverse(route).expect("reverse");
        assert_eq!(route.path_count(), 9);
        assert_eq!(rev.path_count(), 9);
        assert_eq!(rev.path_id(), route.path_id());
        assert_eq!(set.reverse(rev).map(|r| r.id()), Some(route.id()));

        let mut back = topo.route_switches(rev);
        back.reverse();
        assert_eq!(back, topo.route_switches(route));

        assert_eq!(sink_name(route), format!("SinkOut_{}", route.path_id()));
        assert_eq!(sink_name(rev), format!("SinkBack_{}", route.path_id()));
        assert!(topo.validate(&set, route));
        assert!(topo.validate(&set, rev));
    }
}

#[test]
fn path_count_matches_brute_force_common_neighbours() {
    let topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    let fabric = topo.fabric();
    for (src, dst) in [(0, 71), (3, 40), (10, 11), (17, 64)] {
        let (s, d) = (topo.host_switch(src), topo.host_switch(dst));
        let direct = usize::from(s == d || fabric.switch_hop(s, d).is_some());
        let vias = (0..topo.switch_count())
            .filter(|&i| i != s && i != d)
            .filter(|&i| fabric.switch_hop(s, i).is_some() && fabric.switch_hop(i, d).is_some())
            .count();
        assert_eq!(topo.enumerate(src, dst).len(), direct + vias, "{src}->{dst}");
    }
}

#[test]
fn hosts_on_the_same_switch_get_direct_and_bounce_paths() {
    let topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    let set = topo.enumerate(0, 1);
    let direct = set.get(0).expect("direct");
    assert_eq!(direct.len(), 5);
    assert_eq!(topo.route_switches(direct), vec![0]);

    let neighbours = (1..topo.switch_count())
        .filter(|&i| topo.fabric().switch_hop(0, i).is_some())
        .count();
    assert_eq!(set.len(), 1 + neighbours);
    for route in set.iter().skip(1) {
        let sws = topo.route_switches(route);
        assert_eq!(sws.len(), 3);
        assert_eq!(sws[0], 0);
        assert_eq!(sws[2], 0);
    }
}

#[test]
fn ordinary_link_is_preferred_over_parallel_plus_link() {
    let topo = overlapping();
    assert!(topo.is_plus_link(1, 4));
    assert!(topo.is_plus_link(0, 5));
    assert!(!topo.is_plus_link(0, 3));

    let set = topo.enumerate(1, 4);
    assert_eq!(
        hop_classes(&topo, &set, 0),
        vec![EdgeClass::HostUp, EdgeClass::Switch, EdgeClass::HostDown]
    );

    let set = topo.enumerate(0, 5);
    assert_eq!(
        hop_classes(&topo, &set, 0),
        vec![EdgeClass::HostUp, EdgeClass::Plus, EdgeClass::HostDown]
    );
    let rev = set.reverse(set.get(0).expect("route")).expect("reverse");
    let rev_classes: Vec<_> = rev
        .queues()
        .map(|q| topo.fabric().queue(q).expect("q").edge().class)
        .collect();
    assert_eq!(
        rev_classes,
        vec![EdgeClass::HostUp, EdgeClass::Plus, EdgeClass::HostDown]
    );
}

#[test]
fn failed_links_remove_or_reroute_paths() {
    let mut topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    assert_eq!(topo.set_link_up(EdgeClass::Plus, 0, 35, false), Some(true));
    let set = topo.enumerate(0, 71);
    assert_eq!(set.len(), 8);
    assert_eq!(topo.route_switches(set.get(0).expect("route")), vec![0, 4, 35]);
    assert!(set.iter().all(|r| r.path_count() == 8));

    let mut topo = overlapping();
    topo.set_link_up(EdgeClass::Switch, 1, 4, false);
    let set = topo.enumerate(1, 4);
    assert_eq!(
        hop_classes(&topo, &set, 0),
        vec![EdgeClass::HostUp, EdgeClass::Plus, EdgeClass::HostDown]
    );
    // 反向仍走普通链路
    let rev = set.reverse(set.get(0).expect("route")).expect("reverse");
    let second = rev.queues().nth(1).expect("switch hop");
    assert_eq!(
        topo.fabric().queue(second).expect("q").edge().class,
        EdgeClass::Switch
    );
}

#[test]
fn downed_host_link_leaves_no_route() {
    let mut topo = build(DfpParams::balanced(1), QueueDiscipline::Random);
    assert!(!topo.enumerate(0, 2).is_empty());
    topo.set_link_up(EdgeClass::HostDown, 2, 2, false);
    assert!(topo.enumerate(0, 2).is_empty());
    // 反向路由也要经过这条下行链路
    assert!(topo.enumerate(2, 0).is_empty());
}

#[test]
fn unreachable_and_out_of_range_pairs_are_empty() {
    let topo = build(DfpParams::balanced(1), QueueDiscipline::Random);
    // 交换机 1 和 3 都没有全局链路，且没有共同邻居
    assert!(topo.enumerate(1, 3).is_empty());
    assert!(topo.enumerate(0, 6).is_empty());
    assert!(topo.enumerate(6, 0).is_empty());
    assert!(topo.enumerate(0, usize::MAX).is_empty());
    assert!(topo.enumerate(1, 3).pick(7).is_none());

    // balanced(2)：第 2 台交换机既无全局链路也无 Plus 链路，跨组时没有共同邻居
    let topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    assert!(topo.enumerate(4, 12).is_empty());
    assert!(!topo.enumerate(4, 5).is_empty());
}

#[test]
fn enumeration_is_repeatable() {
    let topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    let describe = |set: &PathSet| {
        set.iter()
            .map(|r| topo.describe_route(r))
            .collect::<Vec<_>>()
    };
    let a = topo.enumerate(5, 50);
    let b = topo.enumerate(5, 50);
    assert!(!a.is_empty());
    assert_eq!(describe(&a), describe(&b));
}

#[test]
fn every_discipline_produces_valid_routes() {
    let params = DfpParams {
        p: 1,
        a: 4,
        h: 2,
        h_plus: 1,
    };
    for discipline in QueueDiscipline::ALL {
        let topo = build(params, discipline);
        let validator = topo.validator();
        let mut total = 0;
        for src in [0, 5, 17, 35] {
            for dst in 0..topo.node_count() {
                let set = topo.enumerate(src, dst);
                for route in set.iter() {
                    let rev = set.reverse(route).expect("reverse");
                    assert_eq!(validator.check(&set, route), Ok(()), "{discipline} {src}->{dst}");
                    assert_eq!(validator.check(&set, rev), Ok(()), "{discipline} {dst}->{src}");
                }
                total += set.len();
            }
        }
        assert!(total > 0, "{discipline}");
    }
}

#[test]
fn input_addressed_routes_carry_remote_after_each_pipe() {
    let topo = build(DfpParams::balanced(1), QueueDiscipline::LosslessInput);
    let set = topo.enumerate(0, 2);
    let route = set.get(0).expect("route");
    let hops = route.queues().count();
    assert_eq!(route.len(), hops * 3 + 1);
    for (i, el) in route.elements().iter().enumerate() {
        if let RouteElement::Remote(remote) = el {
            assert!(route.elements()[i - 1].as_pipe().is_some());
            let q = route.elements()[i - 2].as_queue().expect("queue");
            assert_eq!(topo.fabric().remote_endpoint(q), Some(*remote));
        }
    }
    let described = topo.describe_route(route);
    assert!(described.contains("InputQueue-SRC0->SW0"), "{described}");

    // 交换机寻址时 remote 不放进路由
    let topo = build(DfpParams::balanced(1), QueueDiscipline::Lossless);
    let set = topo.enumerate(0, 2);
    let route = set.get(0).expect("route");
    assert!(
        !route
            .elements()
            .iter()
            .any(|el| matches!(el, RouteElement::Remote(_)))
    );
}

#[test]
fn pick_is_stable_and_in_range() {
    let topo = build(DfpParams::balanced(2), QueueDiscipline::Random);
    let set = topo.enumerate(0, 71);
    for key in 0..64u64 {
        let a = set.pick(key).expect("route");
        let b = set.pick(key).expect("route");
        assert_eq!(a.id(), b.id());
        assert!(a.path_id() < set.len());
    }
    let distinct: BTreeSet<usize> = (0..256u64)
        .filter_map(|k| set.pick(k).map(|r| r.path_id()))
        .collect();
    assert!(distinct.len() > 1);
}

#[test]
fn dump_paths_names_every_element() {
    let topo = build(DfpParams::balanced(1), QueueDiscipline::Random);
    let set = topo.enumerate(0, 2);
    let dump = topo.dump_paths(0, 2, &set);
    assert_eq!(dump.src, 0);
    assert_eq!(dump.dst, 2);
    assert_eq!(dump.paths.len(), set.len());
    let first = &dump.paths[0];
    assert_eq!(first.path_count, set.len());
    assert_eq!(first.forward.first().map(String::as_str), Some("SRC0->SW0"));
    assert_eq!(first.forward.last().map(String::as_str), Some("SinkOut_0"));
    assert_eq!(first.reverse.first().map(String::as_str), Some("SRC2->SW2"));
    assert_eq!(first.reverse.last().map(String::as_str), Some("SinkBack_0"));

    let json = serde_json::to_value(&dump).expect("json");
    assert_eq!(json["paths"][0]["path_id"], 0);
}

#[test]
fn sinks_are_owned_per_route() {
    let topo = build(DfpParams::balanced(1), QueueDiscipline::Random);
    let mut set = topo.enumerate(0, 2);
    let id = set.get(0).expect("route").id();
    set.route_mut(id)
        .and_then(|r| r.sink_mut())
        .expect("sink")
        .receive(Packet::data(1, 0, 1500));

    let route = set.route(id).expect("route");
    assert_eq!(route.sink().expect("sink").stats().delivered_pkts, 1);
    let rev = set.reverse(route).expect("reverse");
    assert_eq!(rev.sink().expect("sink").stats().delivered_pkts, 0);
}
