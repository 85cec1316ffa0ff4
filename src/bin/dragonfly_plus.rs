//! DragonFly+ 拓扑与多路径枚举
//!
//! 构建拓扑，随机生成若干主机对，为每一对枚举全部双向路径并校验选中的路由。
//! 传输层的绑定不在这里做。

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use dfplus_sim::queue::{FEEDER_BUFFER_PKTS, QueueDiscipline, mem_from_pkt};
use dfplus_sim::route::RouteError;
use dfplus_sim::sim::SimTime;
use dfplus_sim::topo::{
    DfpParams, DragonFlyPlusOpts, PathDump, TopologyConfig, TopologyError, TopologySize,
    build_dragonfly_plus,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "dragonfly_plus", about = "DragonFly+ 拓扑构建与多路径枚举")]
struct Args {
    /// JSON 拓扑配置文件；给出时忽略下面的拓扑参数
    #[arg(long)]
    config: Option<PathBuf>,
    /// 目标主机数（目标规模模式）
    #[arg(long)]
    nodes: Option<usize>,
    /// 每台交换机的主机数；未给出时取均衡配置 k=2
    #[arg(long)]
    p: Option<usize>,
    #[arg(long)]
    a: Option<usize>,
    #[arg(long)]
    h: Option<usize>,
    #[arg(long)]
    h_plus: Option<usize>,
    #[arg(long, default_value = "random")]
    discipline: String,
    /// 每条 pipe 的时延（微秒）
    #[arg(long, default_value_t = 1)]
    rtt_us: u64,
    #[arg(long, default_value_t = FEEDER_BUFFER_PKTS)]
    queue_pkts: u64,
    /// 随机主机对的数量
    #[arg(long, default_value_t = 16)]
    conns: usize,
    #[arg(long, default_value_t = 13)]
    seed: u64,
    /// 任一主机对不可达即失败退出
    #[arg(long)]
    require_routes: bool,
    /// 按 flow 编号哈希选路（默认使用第一条路径）
    #[arg(long)]
    pick_by_flow: bool,
    /// 打印每条路由的逐跳元素名
    #[arg(long)]
    print_paths: bool,
    /// 把所有主机对的路径写成 JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("No route from node {src} to node {dst}")]
    NoRoute { src: usize, dst: usize },
    #[error("Invalid route from node {src} to node {dst}: {source}")]
    InvalidRoute {
        src: usize,
        dst: usize,
        #[source]
        source: RouteError,
    },
    #[error("failed to write path dump: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode path dump: {0}")]
    Json(#[from] serde_json::Error),
}

fn opts_from_args(args: &Args) -> Result<DragonFlyPlusOpts, DriverError> {
    if let Some(path) = &args.config {
        return Ok(TopologyConfig::load(path)?.to_opts()?);
    }
    let size = match args.nodes {
        Some(count) => TopologySize::Nodes { count },
        None => {
            let base = DfpParams::balanced(args.p.unwrap_or(2));
            TopologySize::Explicit(DfpParams {
                p: base.p,
                a: args.a.unwrap_or(base.a),
                h: args.h.unwrap_or(base.h),
                h_plus: args.h_plus.unwrap_or(base.h_plus),
            })
        }
    };
    let discipline = args
        .discipline
        .parse::<QueueDiscipline>()
        .map_err(TopologyError::from)?;
    Ok(DragonFlyPlusOpts {
        size,
        discipline,
        rtt: SimTime::from_micros(args.rtt_us),
        queue_size_bytes: mem_from_pkt(args.queue_pkts),
        seed: args.seed,
        ..DragonFlyPlusOpts::default()
    })
}

fn run(args: &Args) -> Result<(), DriverError> {
    let opts = opts_from_args(args)?;
    let topo = build_dragonfly_plus(&opts)?;
    let nodes = topo.node_count();
    info!(
        nodes,
        switches = topo.switch_count(),
        groups = topo.group_count(),
        discipline = %topo.discipline(),
        "拓扑构建完成"
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut dumps: Vec<PathDump> = Vec::new();
    let mut total_paths = 0usize;
    let mut unreachable = 0usize;
    let conns = if nodes < 2 {
        warn!(nodes, "主机数不足，跳过连接");
        0
    } else {
        args.conns
    };

    for flow in 0..conns {
        let src = rng.gen_range(0..nodes);
        let mut dst = rng.gen_range(0..nodes);
        while dst == src {
            dst = rng.gen_range(0..nodes);
        }

        let paths = topo.enumerate(src, dst);
        if paths.is_empty() {
            if args.require_routes {
                return Err(DriverError::NoRoute { src, dst });
            }
            warn!(src, dst, "不可达，跳过");
            println!("No route from node {src} to node {dst}");
            unreachable += 1;
            continue;
        }
        println!(
            "Found {} route(s) from node {} to node {}",
            paths.len(),
            src,
            dst
        );
        total_paths += paths.len();

        if args.print_paths {
            for route in paths.iter() {
                println!(
                    "Route {} (size={}): {}",
                    route.path_id(),
                    route.len(),
                    topo.describe_route(route)
                );
                if let Some(rev) = paths.reverse(route) {
                    println!(
                        "Reverse route {} (size={}): {}",
                        rev.path_id(),
                        rev.len(),
                        topo.describe_route(rev)
                    );
                }
            }
        }

        let chosen = if args.pick_by_flow {
            paths.pick(flow as u64)
        } else {
            paths.get(0)
        };
        let Some(route) = chosen else {
            return Err(DriverError::NoRoute { src, dst });
        };
        let validator = topo.validator();
        validator
            .check(&paths, route)
            .map_err(|source| DriverError::InvalidRoute { src, dst, source })?;
        if let Some(rev) = paths.reverse(route) {
            validator
                .check(&paths, rev)
                .map_err(|source| DriverError::InvalidRoute { src, dst, source })?;
        }
        debug!(flow, src, dst, path_id = route.path_id(), "选定路由");

        if args.dump_json.is_some() {
            dumps.push(topo.dump_paths(src, dst, &paths));
        }
    }

    if let Some(path) = &args.dump_json {
        serde_json::to_writer_pretty(File::create(path)?, &dumps)?;
        info!(path = %path.display(), pairs = dumps.len(), "路径已写出");
    }

    println!(
        "done: nodes={} switches={} groups={} conns={} unreachable={} total_paths={}",
        nodes,
        topo.switch_count(),
        topo.group_count(),
        conns,
        unreachable,
        total_paths
    );
    Ok(())
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!(%err, "运行失败");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
