//! Concurrent stress harness for the duplicate detector
//!
//! Runs many comparisons against one shared detector from a pool of worker
//! threads and reports throughput and latency.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p impress-dedup --features cli --bin dedup-stress -- --threads 30 --operations 1000
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use impress_dedup::{ComparisonMode, DedupConfig, DuplicateDetector, Entry, EntryType};

const TITLES: &[&str] = &[
    "Deep Learning Approaches",
    "Introduction to Algorithms",
    "Quantum Computing Fundamentals",
    "A Survey of Graph Neural Networks",
    "Attention Is All You Need",
    "The Structure of Scientific Revolutions",
    "Bayesian Methods for Hackers",
    "On the Electrodynamics of Moving Bodies",
];

const AUTHORS: &[&str] = &[
    "Brown, Alice",
    "Smith, John and Doe, Jane",
    "Cormen, Thomas H. and Leiserson, Charles E.",
    "M\\\"{u}ller, Hans",
    "Vaswani, Ashish and Shazeer, Noam",
    "Kuhn, Thomas",
];

const JOURNALS: &[&str] = &[
    "ACM Computing Surveys",
    "Physical Review Letters",
    "IEEE Transactions on Software Engineering",
    "Nature",
    "Journal of Machine Learning Research",
];

/// Duplicate detector stress harness
#[derive(Parser, Debug)]
#[command(name = "dedup-stress")]
#[command(about = "Run concurrent duplicate-detection comparisons and report throughput")]
struct Args {
    /// Number of worker threads
    #[arg(short, long, default_value = "30")]
    threads: usize,

    /// Comparisons per worker
    #[arg(short, long, default_value = "1000")]
    operations: u64,

    /// Field-name dialect (bibtex or biblatex)
    #[arg(short, long, default_value = "bibtex")]
    mode: ComparisonMode,

    /// TOML configuration with thresholds and weights
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write per-worker metrics to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Progress sampling interval in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// Shared counters, owned by the harness rather than the detector
#[derive(Default)]
struct Metrics {
    operations: AtomicU64,
    duplicates: AtomicU64,
    errors: AtomicU64,
    latency_ns: AtomicU64,
}

impl Metrics {
    fn record(&self, elapsed: Duration, duplicate: Option<bool>) {
        self.operations.fetch_add(1, Ordering::Relaxed);
        self.latency_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        match duplicate {
            Some(true) => {
                self.duplicates.fetch_add(1, Ordering::Relaxed);
            }
            Some(false) => {}
            None => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[derive(Debug, Default)]
struct WorkerStats {
    worker: usize,
    operations: u64,
    duplicates: u64,
    errors: u64,
    total_latency: Duration,
    max_latency: Duration,
}

impl WorkerStats {
    fn mean_latency_us(&self) -> f64 {
        if self.operations == 0 {
            return 0.0;
        }
        self.total_latency.as_secs_f64() * 1e6 / self.operations as f64
    }
}

/// The kinds of pair a worker generates
#[derive(Debug, Clone, Copy)]
enum PairKind {
    Identical,
    Perturbed,
    Unrelated,
    CrossType,
    YearShift,
}

impl PairKind {
    fn random(rng: &mut StdRng) -> Self {
        match rng.gen_range(0..5) {
            0 => Self::Identical,
            1 => Self::Perturbed,
            2 => Self::Unrelated,
            3 => Self::CrossType,
            _ => Self::YearShift,
        }
    }
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn random_entry(rng: &mut StdRng, mode: ComparisonMode) -> Entry {
    let journal_field = match mode {
        ComparisonMode::BibTeX => "journal",
        ComparisonMode::BibLaTeX => "journaltitle",
    };
    Entry::new(EntryType::Article)
        .with_field("title", pick(rng, TITLES))
        .with_field("author", pick(rng, AUTHORS))
        .with_field(journal_field, pick(rng, JOURNALS))
        .with_field("year", rng.gen_range(1990..2025).to_string())
}

/// Swap two adjacent letters of the title and brace-protect its first word
fn perturb(rng: &mut StdRng, entry: &Entry) -> Entry {
    let mut copy = entry.clone();
    if let Some(title) = entry.title() {
        let mut chars: Vec<char> = title.chars().collect();
        if chars.len() > 2 {
            let i = rng.gen_range(1..chars.len() - 1);
            chars.swap(i, i + 1);
        }
        let swapped: String = chars.into_iter().collect();
        let protected = match swapped.split_once(' ') {
            Some((first, rest)) => format!("{{{}}} {}", first, rest),
            None => format!("{{{}}}", swapped),
        };
        copy.set_field("title", protected);
    }
    copy
}

fn make_pair(rng: &mut StdRng, mode: ComparisonMode) -> (Entry, Entry) {
    let base = random_entry(rng, mode);
    match PairKind::random(rng) {
        PairKind::Identical => (base.clone(), base),
        PairKind::Perturbed => {
            let other = perturb(rng, &base);
            (base, other)
        }
        PairKind::Unrelated => {
            let other = random_entry(rng, mode);
            (base, other)
        }
        PairKind::CrossType => {
            let mut other = base.clone();
            other.entry_type = EntryType::InProceedings;
            (base, other)
        }
        PairKind::YearShift => {
            let year: i64 = base.year().and_then(|y| y.parse().ok()).unwrap_or(2000);
            let other = base.clone().with_field("year", (year + 2).to_string());
            (base, other)
        }
    }
}

fn run_worker(
    worker: usize,
    args: &Args,
    detector: &DuplicateDetector,
    metrics: &Metrics,
) -> WorkerStats {
    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(worker as u64));
    let mut stats = WorkerStats {
        worker,
        ..Default::default()
    };

    for _ in 0..args.operations {
        let (a, b) = make_pair(&mut rng, args.mode);

        let start = Instant::now();
        let verdict = detector.is_duplicate(&a, &b, args.mode);
        let elapsed = start.elapsed();

        let duplicate = match verdict {
            Ok(duplicate) => Some(duplicate),
            Err(e) => {
                tracing::error!("Worker {} comparison failed: {}", worker, e);
                None
            }
        };

        metrics.record(elapsed, duplicate);
        stats.operations += 1;
        stats.total_latency += elapsed;
        stats.max_latency = stats.max_latency.max(elapsed);
        match duplicate {
            Some(true) => stats.duplicates += 1,
            Some(false) => {}
            None => stats.errors += 1,
        }
    }

    tracing::debug!("Worker {} finished {} operations", worker, stats.operations);
    stats
}

/// One CSV row per worker
#[derive(Debug, Serialize)]
struct WorkerRow {
    worker: usize,
    operations: u64,
    duplicates: u64,
    errors: u64,
    mean_latency_us: f64,
    max_latency_us: f64,
}

impl From<&WorkerStats> for WorkerRow {
    fn from(stats: &WorkerStats) -> Self {
        Self {
            worker: stats.worker,
            operations: stats.operations,
            duplicates: stats.duplicates,
            errors: stats.errors,
            mean_latency_us: round2(stats.mean_latency_us()),
            max_latency_us: round2(stats.max_latency.as_secs_f64() * 1e6),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn write_csv(path: &Path, stats: &[WorkerStats]) -> csv::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    for s in stats {
        writer.serialize(WorkerRow::from(s))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => DedupConfig::from_toml(&fs::read_to_string(path)?)?,
        None => DedupConfig::default(),
    };
    let detector = DuplicateDetector::with_config(config)?;

    let target = args.threads as u64 * args.operations;
    println!("=== Duplicate Detection Stress Test ===");
    println!("Threads: {}", args.threads);
    println!("Operations per thread: {}", args.operations);
    println!("Target operations: {}", target);
    println!("Mode: {}", args.mode);
    println!();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.max(1))
        .build()?;

    let metrics = Metrics::default();
    let done = AtomicBool::new(false);
    let started = Instant::now();
    let interval = Duration::from_millis(args.interval_ms.max(1));

    let stats: Vec<WorkerStats> = thread::scope(|scope| {
        scope.spawn(|| {
            let mut last = 0;
            while !done.load(Ordering::Acquire) {
                thread::sleep(interval);
                let total = metrics.operations.load(Ordering::Relaxed);
                let rate = (total - last) as f64 / interval.as_secs_f64();
                last = total;
                tracing::info!("[Progress] Ops: {}/{}, Throughput: {:.0}/sec", total, target, rate);
            }
        });

        let stats = pool.install(|| {
            (0..args.threads)
                .into_par_iter()
                .map(|worker| run_worker(worker, &args, &detector, &metrics))
                .collect::<Vec<_>>()
        });
        done.store(true, Ordering::Release);
        stats
    });

    let elapsed = started.elapsed();
    let completed = metrics.operations.load(Ordering::Relaxed);
    let duplicates = metrics.duplicates.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let mean_latency_us = if completed > 0 {
        metrics.latency_ns.load(Ordering::Relaxed) as f64 / completed as f64 / 1e3
    } else {
        0.0
    };

    println!();
    println!("Duration: {:.1} ms", elapsed.as_secs_f64() * 1e3);
    println!("Actual operations: {} / {}", completed, target);
    println!(
        "Throughput: {:.2} ops/sec",
        completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("Avg response time: {:.2} us", mean_latency_us);
    println!("Duplicates found: {}", duplicates);
    println!("Errors: {}", errors);

    if let Some(path) = &args.csv {
        write_csv(path, &stats)?;
        println!("Worker metrics saved to: {}", path.display());
    }

    if completed < target {
        eprintln!("WARNING: Not all operations completed!");
        std::process::exit(1);
    }

    Ok(())
}
