//! The CLI entry point: one executable, a `--mode` flag choosing among the
//! four schedulers, per spec.md §6's stated implementation choice.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use futoshiki_solver::cluster::{make_thread_cluster, ClusterHandle, LocalCluster};
use futoshiki_solver::precolor::pre_color;
use futoshiki_solver::runtime::{RuntimeContext, Verbosity};
use futoshiki_solver::solver::{self, Mode};
use futoshiki_solver::{parser, Puzzle};

/// A two-tier parallel/distributed Futoshiki solver.
#[derive(Debug, Parser)]
#[command(name = "futoshiki-solver", version, about)]
struct Cli {
    /// Path to the puzzle file (spec.md §6 grammar).
    puzzle: PathBuf,

    /// Which scheduler to run.
    #[arg(long, default_value = "sequential")]
    mode: Mode,

    /// Skip pre-coloring (C3) and hand C4/C7/C8/C9 the unconstrained
    /// candidate lists directly.
    #[arg(short = 'n', long = "no-precolor")]
    no_precolor: bool,

    /// Worker threads per rank (C7/C9). Falls back to
    /// `FUTOSHIKI_NUM_THREADS`, then to the number of logical CPUs.
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Number of thread-simulated ranks to run `inter`/`hybrid` over when
    /// not built with `mpi-transport` (ignored otherwise: real MPI
    /// determines the rank count from how the process was launched).
    #[arg(long = "ranks", default_value_t = 4)]
    ranks: usize,

    /// Write the solved grid to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// C6's task-count multiplier for `intra`/`inter` (and `hybrid`'s
    /// master tier unless `-mf` overrides it): target task count is
    /// `max(1, ceil(workers * f))`. Defaults to 1.0.
    #[arg(short = 'f', long = "factor")]
    factor: Option<f64>,

    /// `hybrid`-only override of `-f` for the master's own calibration
    /// pass across worker ranks.
    #[arg(long = "mf")]
    master_factor: Option<f64>,

    /// `hybrid`-only factor for each worker rank's own thread-pool
    /// refinement. Defaults to 4.0.
    #[arg(long = "of")]
    worker_factor: Option<f64>,

    #[command(flatten)]
    verbosity: VerbosityFlags,
}

#[derive(Debug, clap::Args)]
#[group(multiple = false)]
struct VerbosityFlags {
    /// Only report errors.
    #[arg(short = 'q', long)]
    quiet: bool,
    /// Per-scheduler progress (units dispatched, workers retired, solution found).
    #[arg(short = 'v', long)]
    verbose: bool,
    /// Per-work-unit dispatch/receipt and message-tag traffic.
    #[arg(short = 'd', long)]
    debug: bool,
}

impl VerbosityFlags {
    fn level(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.debug {
            Verbosity::Debug
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Essential
        }
    }
}

fn resolve_threads(explicit: Option<usize>) -> usize {
    explicit
        .or_else(|| std::env::var("FUTOSHIKI_NUM_THREADS").ok().and_then(|v| v.parse().ok()))
        .unwrap_or_else(num_cpus::get)
        .max(1)
}

/// Resolves spec.md §6's `-f`/`-mf`/`-of` into the three factors
/// `RuntimeContext` carries: `factor` (intra/inter, and hybrid's master tier
/// absent `-mf`), `master_factor`, `worker_factor`.
fn resolve_factors(cli: &Cli) -> (f64, f64, f64) {
    let factor = cli.factor.unwrap_or(1.0);
    let master_factor = cli.master_factor.unwrap_or(factor);
    let worker_factor = cli.worker_factor.unwrap_or(4.0);
    (factor, master_factor, worker_factor)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.verbosity.level().filter_directive()))
        .with_writer(std::io::stderr)
        .init();

    let mut puzzle = parser::parse_file(&cli.puzzle)
        .with_context(|| format!("failed to load puzzle {}", cli.puzzle.display()))?;

    let pre_start = Instant::now();
    let colors_removed = if cli.no_precolor {
        puzzle.reset_candidates_unconstrained();
        0
    } else {
        pre_color(&mut puzzle)
    };
    let pre_coloring_time = pre_start.elapsed();

    let threads = resolve_threads(cli.threads);
    let (factor, master_factor, worker_factor) = resolve_factors(&cli);

    #[cfg(feature = "mpi-transport")]
    if matches!(cli.mode, Mode::Inter | Mode::Hybrid) {
        let cluster = Arc::new(
            futoshiki_solver::cluster::MpiClusterHandle::init().context("failed to initialize MPI")?,
        );
        let is_master = cluster.is_master();
        let ctx = RuntimeContext::with_factors(cluster, threads, factor, master_factor, worker_factor);
        let mut stats = solver::solve(cli.mode, &puzzle, &ctx);
        stats.colors_removed = colors_removed;
        stats.pre_coloring_time = pre_coloring_time;
        stats.remaining_colors = puzzle.total_candidates();
        return if is_master {
            report(&puzzle, &stats, cli.output.as_deref())
        } else {
            Ok(())
        };
    }

    if matches!(cli.mode, Mode::Sequential | Mode::Intra) {
        let ctx = RuntimeContext::with_factors(
            Arc::new(LocalCluster),
            threads,
            factor,
            master_factor,
            worker_factor,
        );
        let mut stats = solver::solve(cli.mode, &puzzle, &ctx);
        stats.colors_removed = colors_removed;
        stats.pre_coloring_time = pre_coloring_time;
        stats.remaining_colors = puzzle.total_candidates();
        return report(&puzzle, &stats, cli.output.as_deref());
    }

    // `inter`/`hybrid` without `mpi-transport`: simulate the cluster with
    // `crossbeam-channel`-backed threads standing in for processes
    // (`SPEC_FULL.md`, C14) — every virtual rank runs the same scheduler,
    // just on an OS thread instead of in its own process.
    let mut result_stats = None;
    std::thread::scope(|scope| {
        let mut handles = make_thread_cluster(cli.ranks.max(2));
        let rank0 = handles.remove(0);
        let mut joins = Vec::new();
        for handle in handles {
            let puzzle = &puzzle;
            joins.push(scope.spawn(move || {
                let ctx = RuntimeContext::with_factors(
                    Arc::new(handle),
                    threads,
                    factor,
                    master_factor,
                    worker_factor,
                );
                solver::solve(cli.mode, puzzle, &ctx)
            }));
        }

        let ctx = RuntimeContext::with_factors(
            Arc::new(rank0),
            threads,
            factor,
            master_factor,
            worker_factor,
        );
        let mut stats = solver::solve(cli.mode, &puzzle, &ctx);
        stats.colors_removed = colors_removed;
        stats.pre_coloring_time = pre_coloring_time;
        stats.remaining_colors = puzzle.total_candidates();
        for join in joins {
            let _ = join.join();
        }
        result_stats = Some(stats);
    });

    report(&puzzle, &result_stats.expect("rank 0 always produces stats"), cli.output.as_deref())
}

fn report(puzzle: &Puzzle, stats: &futoshiki_solver::SolverStats, output: Option<&std::path::Path>) -> Result<()> {
    use std::io::Write;

    tracing::info!(
        schedule = %stats.schedule,
        colors_removed = stats.colors_removed,
        remaining_colors = stats.remaining_colors,
        work_units = stats.work_units,
        total_processed = stats.total_processed,
        calibrated_depth = stats.calibrated_depth,
        pre_coloring_ms = stats.pre_coloring_time.as_millis(),
        coloring_ms = stats.coloring_time.as_millis(),
        "solve finished"
    );

    let mut rendered = String::new();
    match &stats.solution {
        Some(solution) => {
            for row in &solution.grid {
                let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                rendered.push_str(&line.join(" "));
                rendered.push('\n');
            }
        }
        None => {
            tracing::error!(puzzle = %puzzle.size(), "puzzle has no solution");
            rendered.push_str("UNSOLVABLE\n");
        }
    }

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            print!("{rendered}");
            std::io::stdout().flush().ok();
        }
    }

    if stats.solution.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
