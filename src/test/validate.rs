use crate::net::{InputQueueId, QueueId, RemoteEndpoint, TerminalSink};
use crate::queue::QueueDiscipline;
use crate::route::{PathSet, RouteError, RouteElement, RouteId, RouteValidator};
use crate::topo::{DfpParams, DragonFlyPlus, DragonFlyPlusOpts, TopologySize, build_dragonfly_plus};

fn build(discipline: QueueDiscipline) -> DragonFlyPlus {
    build_dragonfly_plus(&DragonFlyPlusOpts {
        size: TopologySize::Explicit(DfpParams::balanced(1)),
        discipline,
        ..DragonFlyPlusOpts::default()
    })
    .expect("build")
}

/// 主机 0 到主机 2：直达一条，经交换机 4 一条
fn paths(topo: &DragonFlyPlus) -> (PathSet, RouteId, RouteId) {
    let set = topo.enumerate(0, 2);
    assert_eq!(set.len(), 2);
    let fwd = set.get(0).expect("route").id();
    let rev = set.get(1).expect("route").id();
    (set, fwd, rev)
}

fn check(topo: &DragonFlyPlus, set: &PathSet, id: RouteId) -> Result<(), RouteError> {
    topo.validator().check(set, set.route(id).expect("route"))
}

fn edit(set: &mut PathSet, id: RouteId, f: impl FnOnce(&mut Vec<RouteElement>)) {
    f(set.route_mut(id).expect("route").elements_mut());
}

#[test]
fn fresh_routes_are_valid() {
    let topo = build(QueueDiscipline::Random);
    let (set, fwd, other) = paths(&topo);
    assert_eq!(check(&topo, &set, fwd), Ok(()));
    assert_eq!(check(&topo, &set, other), Ok(()));
    assert!(topo.validate(&set, set.route(fwd).expect("route")));
}

#[test]
fn empty_route_is_rejected() {
    let topo = build(QueueDiscipline::Random);
    let (mut set, fwd, _) = paths(&topo);
    edit(&mut set, fwd, |els| els.clear());
    assert_eq!(check(&topo, &set, fwd), Err(RouteError::Empty));
    assert!(!topo.validate(&set, set.route(fwd).expect("route")));
}

#[test]
fn dangling_ids_are_rejected() {
    let topo = build(QueueDiscipline::Random);
    let (mut set, fwd, _) = paths(&topo);
    edit(&mut set, fwd, |els| els[0] = RouteElement::Queue(QueueId(99_999)));
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::Dangling { position: 0 })
    );

    let (mut set, fwd, _) = paths(&topo);
    edit(&mut set, fwd, |els| {
        els.insert(2, RouteElement::Remote(RemoteEndpoint::Input(InputQueueId(0))))
    });
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::Dangling { position: 2 })
    );
}

#[test]
fn broken_alternation_is_rejected() {
    let topo = build(QueueDiscipline::Random);

    let (mut set, fwd, _) = paths(&topo);
    edit(&mut set, fwd, |els| els.swap(0, 1));
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::Alternation { position: 0 })
    );

    let (mut set, fwd, _) = paths(&topo);
    let len = set.route(fwd).expect("route").len();
    edit(&mut set, fwd, |els| {
        els.pop();
    });
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::Alternation { position: len - 2 })
    );

    let (mut set, fwd, _) = paths(&topo);
    edit(&mut set, fwd, |els| {
        els.insert(2, RouteElement::Sink(TerminalSink::new("stray")))
    });
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::Alternation { position: 2 })
    );
}

#[test]
fn remote_must_follow_a_pipe() {
    let topo = build(QueueDiscipline::Lossless);
    let (mut set, fwd, _) = paths(&topo);
    let first = set.route(fwd).expect("route").elements()[0].as_queue().expect("queue");
    let peer = topo.fabric().remote_endpoint(first).expect("remote");
    edit(&mut set, fwd, |els| els.insert(1, RouteElement::Remote(peer)));
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::Alternation { position: 1 })
    );
}

#[test]
fn lossless_queues_need_remote_endpoints() {
    let plain = build(QueueDiscipline::Random);
    let (set, fwd, _) = paths(&plain);
    let strict = RouteValidator::new(plain.fabric(), QueueDiscipline::Lossless);
    assert_eq!(
        strict.check(&set, set.route(fwd).expect("route")),
        Err(RouteError::MissingRemote { position: 0 })
    );
}

#[test]
fn input_addressed_routes_must_carry_the_remote() {
    let topo = build(QueueDiscipline::LosslessInput);
    let (mut set, fwd, _) = paths(&topo);
    assert_eq!(check(&topo, &set, fwd), Ok(()));
    edit(&mut set, fwd, |els| {
        els.remove(2);
    });
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::RemoteNotCarried { position: 0 })
    );
}

#[test]
fn reverse_linkage_is_checked() {
    let topo = build(QueueDiscipline::Random);

    let (mut set, fwd, _) = paths(&topo);
    set.route_mut(fwd).expect("route").set_reverse(None);
    assert_eq!(check(&topo, &set, fwd), Err(RouteError::NoReverse));

    let (mut set, fwd, other) = paths(&topo);
    let rev = set.route(fwd).and_then(|r| r.reverse_id()).expect("reverse");
    set.route_mut(rev).expect("route").set_reverse(Some(other));
    assert_eq!(check(&topo, &set, fwd), Err(RouteError::ReverseMismatch));
}

#[test]
fn path_ids_are_checked() {
    let topo = build(QueueDiscipline::Random);

    let (mut set, fwd, _) = paths(&topo);
    set.route_mut(fwd).expect("route").set_path_id(5, 2);
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::PathIdOutOfRange {
            path_id: 5,
            path_count: 2
        })
    );

    let (mut set, fwd, _) = paths(&topo);
    set.route_mut(fwd).expect("route").set_path_id(1, 2);
    assert_eq!(
        check(&topo, &set, fwd),
        Err(RouteError::PathIdMismatch {
            forward: (1, 2),
            reverse: (0, 2)
        })
    );
}
