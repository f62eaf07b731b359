//! AllocBench CLI — simulate, allocate, and bench commands.
//!
//! Commands:
//! - `simulate` — run the Monte Carlo engine and print per-stock metrics
//! - `allocate` — run one strategy and print its allocation
//! - `bench` — benchmark all three strategies, print the comparison, and
//!   write the record table as CSV + JSON
//!
//! Every command accepts either a TOML config file (`--config`) or a CSV
//! path plus inline flags; flags override file values.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use allocbench_core::{allocate_whole_shares, PortfolioSummary, Strategy};
use allocbench_runner::{
    export_records_csv, export_records_json, load_price_table, profiling, report,
    run_bench_session, simulate_from_config, simulate_table, strategies_from_config, BenchConfig,
    DataConfig, MetricsCache,
};

#[derive(Parser)]
#[command(
    name = "allocbench",
    about = "AllocBench CLI — Monte Carlo portfolio allocation benchmarking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    EqualWeight,
    Greedy,
    Knapsack,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Monte Carlo simulation and print the per-stock metrics table.
    Simulate {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run a single allocation strategy and print its weights.
    Allocate {
        #[command(flatten)]
        common: CommonArgs,

        /// Strategy to run.
        #[arg(long, value_enum)]
        strategy: StrategyArg,

        /// Greedy only: keep at most this many stocks.
        #[arg(long)]
        top_k: Option<usize>,

        /// Also print a whole-share purchase plan for this budget (USD),
        /// priced at the dataset's last closes.
        #[arg(long)]
        budget: Option<f64>,
    },
    /// Benchmark all three strategies and export the record table.
    Bench {
        #[command(flatten)]
        common: CommonArgs,

        /// Repeated invocations per strategy.
        #[arg(long)]
        runs: Option<usize>,

        /// Output directory for benchmark.csv / benchmark.json.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Skip the simulation cache entirely.
        #[arg(long, default_value_t = false)]
        no_cache: bool,

        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Price CSV (wide format: Date column + one column per stock).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Number of simulation paths per stock.
    #[arg(long)]
    simulations: Option<usize>,

    /// Trading days per simulated year.
    #[arg(long)]
    days: Option<usize>,

    /// Annual risk-free rate (e.g. 0.04).
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Master seed for reproducible simulation.
    #[arg(long)]
    seed: Option<u64>,
}

impl CommonArgs {
    /// Resolve the effective config: file values first, flags override.
    fn resolve(&self) -> Result<BenchConfig> {
        let mut config = match (&self.config, &self.data) {
            (Some(path), _) => BenchConfig::from_toml_file(path)
                .with_context(|| format!("loading config '{}'", path.display()))?,
            (None, Some(csv_path)) => BenchConfig {
                data: DataConfig {
                    csv_path: csv_path.clone(),
                },
                simulation: Default::default(),
                allocation: Default::default(),
                benchmark: Default::default(),
            },
            (None, None) => bail!("either --config or --data is required"),
        };
        if let Some(data) = &self.data {
            config.data.csv_path = data.clone();
        }
        if let Some(n) = self.simulations {
            config.simulation.num_simulations = n;
        }
        if let Some(d) = self.days {
            config.simulation.trading_days_per_year = d;
        }
        if let Some(r) = self.risk_free_rate {
            config.simulation.risk_free_rate = r;
            config.allocation.limits.risk_free_rate = r;
        }
        if let Some(s) = self.seed {
            config.simulation.seed = Some(s);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    profiling::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { common } => run_simulate(&common),
        Commands::Allocate {
            common,
            strategy,
            top_k,
            budget,
        } => run_allocate(&common, strategy, top_k, budget),
        Commands::Bench {
            common,
            runs,
            output_dir,
            no_cache,
            cache_dir,
        } => run_bench(&common, runs, output_dir, no_cache, cache_dir),
    }
}

fn run_simulate(common: &CommonArgs) -> Result<()> {
    let config = common.resolve()?;
    let data = simulate_from_config(&config, None)?;

    println!(
        "Simulated {} stocks x {} paths ({} trading days, dataset {})",
        data.universe.len(),
        config.simulation.num_simulations,
        config.simulation.trading_days_per_year,
        &data.dataset_hash[..12],
    );
    println!();
    print!("{}", report::render_metrics_table(&data.universe));
    Ok(())
}

fn run_allocate(
    common: &CommonArgs,
    strategy: StrategyArg,
    top_k: Option<usize>,
    budget: Option<f64>,
) -> Result<()> {
    let mut config = common.resolve()?;
    if let Some(k) = top_k {
        config.allocation.greedy.top_k = Some(k);
    }
    let table = load_price_table(&config.data.csv_path)?;
    let data = simulate_table(&table, &config, None)?;

    let strategy = match strategy {
        StrategyArg::EqualWeight => Strategy::EqualWeight,
        StrategyArg::Greedy => Strategy::GreedyRatio(config.allocation.greedy),
        StrategyArg::Knapsack => Strategy::DpKnapsack(config.allocation.knapsack),
    };
    let allocation = strategy
        .allocate(&data.universe, &config.allocation.limits)
        .with_context(|| format!("strategy '{}' failed", strategy.name()))?;
    let summary = PortfolioSummary::compute(
        &allocation,
        &data.universe,
        config.allocation.limits.risk_free_rate,
    );

    print!(
        "{}",
        report::render_allocation(strategy.name(), &allocation, &summary, &data.universe)
    );

    if let Some(budget) = budget {
        let last_closes: HashMap<String, f64> = table
            .series
            .iter()
            .filter_map(|s| s.closes.last().map(|c| (s.symbol.clone(), *c)))
            .collect();
        let plan = allocate_whole_shares(&allocation, &last_closes, budget)
            .context("share planning failed")?;
        println!();
        print!("{}", report::render_share_plan(&plan, &data.universe));
    }
    Ok(())
}

fn run_bench(
    common: &CommonArgs,
    runs: Option<usize>,
    output_dir: PathBuf,
    no_cache: bool,
    cache_dir: PathBuf,
) -> Result<()> {
    let mut config = common.resolve()?;
    if let Some(runs) = runs {
        config.benchmark.num_runs = runs;
    }
    config.validate()?;

    let cache = if no_cache {
        None
    } else {
        Some(MetricsCache::new(&cache_dir).context("creating cache directory")?)
    };

    let session = run_bench_session(&config, cache.as_ref())?;

    println!(
        "Benchmarked {} strategies x {} runs on {} stocks",
        strategies_from_config(&config).len(),
        config.benchmark.num_runs,
        session.universe.len(),
    );
    println!();
    print!("{}", report::render_comparison(&session.report));

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output dir '{}'", output_dir.display()))?;
    let csv_path = output_dir.join("benchmark.csv");
    let json_path = output_dir.join("benchmark.json");
    std::fs::write(
        &csv_path,
        export_records_csv(&session.report.records)?,
    )
    .with_context(|| format!("writing '{}'", csv_path.display()))?;
    std::fs::write(
        &json_path,
        export_records_json(&session.dataset_hash, &session.report.records)?,
    )
    .with_context(|| format!("writing '{}'", json_path.display()))?;

    println!();
    println!(
        "Wrote {} and {}",
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}
