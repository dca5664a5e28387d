//! `copkm`: cluster a vector file under optional pairwise constraints.
//!
//! Usage:
//!     copkm 3 vectors.tsv
//!     copkm 3 vectors.tsv constraints.tsv --seed 42 -o clusters.tsv
//!     RUST_LOG=debug copkm 3 vectors.tsv

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use copkm::cluster::DEFAULT_MAX_ITER;
use copkm::io::{load_vectors, write_vectors};
use copkm::{CopKmeans, Init, Metric};

/// Constrained k-means (COP-KMeans) over tab-separated sparse vectors.
#[derive(Parser, Debug)]
#[command(name = "copkm", version, about)]
struct Cli {
    /// Number of clusters (1..=number of points)
    ncluster: usize,

    /// Vector records: label<TAB>feature<TAB>value...
    data: PathBuf,

    /// Constraint records: label<TAB>label<TAB>m|c
    constraints: Option<PathBuf>,

    /// Maximum assign/update iterations
    #[arg(short = 'i', long, default_value_t = DEFAULT_MAX_ITER)]
    max_iter: usize,

    /// Random seed (OS entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Centroid initialization
    #[arg(long, value_enum, default_value_t = InitArg::KmeansPlusPlus)]
    init: InitArg,

    /// Point-to-centroid dissimilarity
    #[arg(long, value_enum, default_value_t = MetricArg::Sqeuclid)]
    metric: MetricArg,

    /// Write assignments here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the ingested vectors and exit
    #[arg(long)]
    dump_vectors: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InitArg {
    /// Probability-weighted seeding
    #[value(name = "kmeans++")]
    KmeansPlusPlus,
    /// Uniform random seeding
    Random,
}

impl From<InitArg> for Init {
    fn from(arg: InitArg) -> Self {
        match arg {
            InitArg::KmeansPlusPlus => Init::KmeansPlusPlus,
            InitArg::Random => Init::Random,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    /// Squared Euclidean distance
    Sqeuclid,
    /// One minus cosine similarity
    Cosine,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Sqeuclid => Metric::SquaredEuclidean,
            MetricArg::Cosine => Metric::Cosine,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("copkm: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    if cli.dump_vectors {
        let dataset = load_vectors(&cli.data)?;
        return write_vectors(io::stdout().lock(), &dataset).context("writing vectors");
    }

    let mut model = CopKmeans::new(cli.ncluster)
        .with_max_iter(cli.max_iter)
        .with_init(cli.init.into())
        .with_metric(cli.metric.into());
    if let Some(seed) = cli.seed {
        model = model.with_seed(seed);
    }

    let report = copkm::run(&model, &cli.data, cli.constraints.as_deref())
        .with_context(|| {
            format!(
                "clustering {} into {} clusters",
                cli.data.display(),
                cli.ncluster
            )
        })?;

    if !report.fit.converged {
        info!(max_iter = model.max_iter(), "iteration cap reached before convergence");
    }

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            report
                .write_to(BufWriter::new(file))
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => report
            .write_to(io::stdout().lock())
            .context("writing assignments")?,
    }
    Ok(())
}
