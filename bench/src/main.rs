use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::info;
use neurograph_core::{Graph, NodeId, NodeInfo, RefineConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: neurograph-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all        Run all generators and benchmark each (default)");
        println!("  arbor      Branching tree with long internodes and short spurs");
        println!("  dla        Diffusion-limited aggregation (organic branching, some loops)");
        println!("  crossing   Pairs of arbors fused at a shared hub");
        println!();
        println!("Default node_count: 100000");
        return;
    }

    println!("neurograph-bench");
    println!("================");
    println!();

    let generators: Vec<(&str, fn(u64) -> Graph)> = match mode {
        "arbor" => vec![("Arbor (long internodes)", gen_arbor)],
        "dla" => vec![("DLA (organic branching)", gen_dla)],
        "crossing" => vec![("Crossing arbors", gen_crossing)],
        "all" => vec![
            ("Arbor (long internodes)", gen_arbor as fn(u64) -> Graph),
            ("DLA (organic branching)", gen_dla),
            ("Crossing arbors", gen_crossing),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count);
    }
}

fn run_benchmark(name: &str, generator: fn(u64) -> Graph, node_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let graph = generator(node_count);
    let gen_time = t.elapsed();
    let summary = graph.degree_summary();
    println!(
        "Generated in {:.2}s: {} nodes, {} edges, {} junctions, {} leaves, ~{:.0}MB",
        gen_time.as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        summary.junctions,
        summary.leaves,
        graph.memory_usage() as f64 / 1_048_576.0
    );

    let config = RefineConfig::default();

    println!();
    println!("{:>22} {:>12} {:>10}", "pass", "result", "time");
    println!("{:->22} {:->12} {:->10}", "", "", "");

    let (removed, elapsed) = timed(|| {
        let mut g = graph.clone();
        neurograph_core::prune_short_leaf_branches(&mut g, config.min_branch_length)
    });
    report("leaf branches", format!("-{} nodes", removed), elapsed);

    let (cut, elapsed) = timed(|| {
        let mut g = graph.clone();
        neurograph_core::prune_short_connectors(&mut g, config.min_connector_length).len()
    });
    report("connectors", format!("-{} edges", cut), elapsed);

    let (excised, elapsed) =
        timed(|| neurograph_core::detect_crossovers(&graph, config.crossover_depth).len());
    report("crossover detection", format!("{} nodes", excised), elapsed);

    let (components, elapsed) = timed(|| {
        neurograph_core::refine_crossovers(vec![graph.clone()], config.crossover_depth).len()
    });
    report("refine_crossovers", format!("{} parts", components), elapsed);

    let (components, elapsed) = timed(|| {
        neurograph_core::refine_pruning(vec![graph.clone()], config.min_connector_length).len()
    });
    report("refine_pruning", format!("{} parts", components), elapsed);

    let (lengths, elapsed) =
        timed(|| neurograph_core::branch_length_statistics(std::slice::from_ref(&graph)));
    report("branch statistics", format!("{} runs", lengths.len()), elapsed);

    if let Some(mean) = mean_run_length(&lengths) {
        info!("{}: mean junction-to-junction run {:.1} edges", name, mean);
    }
    println!();
}

fn mean_run_length(lengths: &[usize]) -> Option<f64> {
    (!lengths.is_empty()).then(|| lengths.iter().sum::<usize>() as f64 / lengths.len() as f64)
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let t = Instant::now();
    let out = f();
    (out, t.elapsed())
}

fn report(pass: &str, result: String, elapsed: Duration) {
    println!(
        "{:>22} {:>12} {:>8.1}ms",
        pass,
        result,
        elapsed.as_secs_f64() * 1000.0
    );
}

// ---------------------------------------------------------------------------
// Generators: O(n), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Add a node one unit step away from `from` in a random axis direction.
fn grow(graph: &mut Graph, rng: &mut FastRng, from: NodeId, id: NodeId) {
    let mut position = graph.node(from).map(|n| n.position).unwrap_or_default();
    position[rng.next(3) as usize] += if rng.next_f64() < 0.5 { -1.0 } else { 1.0 };
    graph.add_node(id, NodeInfo::new(position, [0, 0, 0]));
    graph.add_edge(from, id);
}

/// Branching tree with long internodes.
///
/// Each growing tip extends by a 10-40 node segment, then either forks in
/// two or stops. Short 1-4 node spurs sprout along segments, the artifacts
/// leaf-branch pruning is meant to remove.
fn gen_arbor(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(42);
    arbor_into(&mut graph, &mut rng, 0, node_count);
    graph
}

/// Grow an arbor of about `budget` nodes with ids starting at `first_id`.
fn arbor_into(graph: &mut Graph, rng: &mut FastRng, first_id: NodeId, budget: u64) {
    let end = first_id + budget;
    graph.add_node(first_id, NodeInfo::default());
    let mut next_id = first_id + 1;
    let mut tips: VecDeque<NodeId> = VecDeque::from([first_id]);

    while next_id < end {
        let Some(mut tip) = tips.pop_front() else {
            // everything stopped early: restart from the newest node
            tips.push_back(next_id - 1);
            continue;
        };

        let segment = 10 + rng.next(31);
        for _ in 0..segment {
            if next_id >= end {
                return;
            }
            grow(graph, rng, tip, next_id);
            tip = next_id;
            next_id += 1;

            if rng.next(25) == 0 {
                let mut spur_tip = tip;
                for _ in 0..1 + rng.next(4) {
                    if next_id >= end {
                        return;
                    }
                    grow(graph, rng, spur_tip, next_id);
                    spur_tip = next_id;
                    next_id += 1;
                }
            }
        }

        if rng.next(10) < 8 {
            tips.push_back(tip);
            tips.push_back(tip);
        }
    }
}

/// DLA (Diffusion-Limited Aggregation): organic branching growth.
///
/// Each new node attaches to a random recent "surface" node, with an
/// occasional second connection that closes a loop.
fn gen_dla(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(77777);

    graph.add_node(0, NodeInfo::default());

    // VecDeque for O(1) pop_front when evicting oldest surface nodes.
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(1001);
    surface.push_back(0);
    let surface_max = 1000usize;

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u64) as usize];
        grow(&mut graph, &mut rng, attach_to, new_node);

        // 2% chance of a second connection (loops / fused contacts)
        if rng.next(50) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            if other != attach_to {
                graph.add_edge(new_node, other);
            }
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    graph
}

/// Pairs of independent arbors fused through one hub node that also carries
/// two straight arms, so the hub sees four directions: the pattern
/// crossover detection looks for.
fn gen_crossing(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(31337);
    let arbor_size = 2_000u64;
    let arm_length = 20u64;
    let block = 1 + 2 * arbor_size + 2 * arm_length;

    let mut next_id = 0u64;
    while next_id + block <= node_count {
        let hub = next_id;
        graph.add_node(hub, NodeInfo::default());
        let a = hub + 1;
        let b = a + arbor_size;
        arbor_into(&mut graph, &mut rng, a, arbor_size);
        arbor_into(&mut graph, &mut rng, b, arbor_size);
        graph.add_edge(hub, a);
        graph.add_edge(hub, b);

        let mut id = b + arbor_size;
        for _ in 0..2 {
            let mut tip = hub;
            for _ in 0..arm_length {
                grow(&mut graph, &mut rng, tip, id);
                tip = id;
                id += 1;
            }
        }
        next_id = id;
    }

    graph
}
