mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use lotto_engine::audit::{ac_distribution, backtest_kills, recent_targets, rule_survival};
use lotto_engine::display::{
    display_ac_distribution, display_batches, display_comparison, display_exclusions, display_history,
    display_kill_backtest, display_prediction, display_rule_survival, display_scores, display_simulation,
    display_ticket_check,
};
use lotto_engine::report::export_csv;
use lotto_engine::simulation::{PrizeTable, rank};
use lotto_engine::{
    Candidate, Preset, PredictorConfig, Predictor, SimulationHarness, SimulationReport, SimulationSettings,
    Strategy, Target,
};
use lotto_history::{Draw, History};

use crate::display::{display_config, display_import_summary};
use crate::import::{import_into, load_or_empty};

#[derive(Parser)]
#[command(name = "lotto", about = "Lotto 6/45 heuristic predictor and backtester")]
struct Cli {
    /// Draw history (JSON array of draws)
    #[arg(long, global = true, default_value = "data/history.json")]
    history: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct StrategyArgs {
    /// Predictor generation
    #[arg(short, long, value_enum, default_value_t = Preset::Hybrid)]
    preset: Preset,

    /// Kill list size (kill and hybrid presets; 5 enables challenge mode)
    #[arg(short, long)]
    kills: Option<usize>,

    /// Full predictor configuration (JSON), overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,
}

impl StrategyArgs {
    fn resolve(&self) -> Result<PredictorConfig> {
        let config = match &self.config {
            Some(path) => PredictorConfig::load(path)?,
            None => PredictorConfig::preset(self.preset),
        };
        let config = match self.kills {
            Some(k) => config.with_kill_count(k),
            None => config,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Tickets to simulate
    #[arg(short = 'n', long, default_value = "10000")]
    iterations: usize,

    /// Tickets per reported batch
    #[arg(long, default_value = "1000")]
    batch_size: usize,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Play this draw every time, trained on the draws before it
    #[arg(short, long)]
    target: Option<u32>,

    /// Minimum earlier draws for randomly chosen targets
    #[arg(long, default_value = "50")]
    lookback: usize,
}

impl RunArgs {
    fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            iterations: self.iterations,
            batch_size: self.batch_size,
            seed: self.seed,
            target: match self.target {
                Some(id) => Target::Fixed(id),
                None => Target::Randomized { min_lookback: self.lookback },
            },
            prizes: PrizeTable::default(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Merge draws from a CSV file (draw_id,date,n1..n6,bonus[,first_prize]) into the history
    Import {
        file: PathBuf,
    },

    /// List the latest draws
    History {
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Per-number scores
    Scores {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Show only the best N numbers
        #[arg(long)]
        top: Option<usize>,

        /// Use only the draws before this one
        #[arg(long)]
        before: Option<u32>,
    },

    /// Kill list with the rule behind each number
    Kills {
        #[command(flatten)]
        strategy: StrategyArgs,

        #[arg(long)]
        before: Option<u32>,
    },

    /// Predict the next draw
    Predict {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Number of tickets
        #[arg(short, long, default_value = "1")]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        before: Option<u32>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Backtest one strategy against recorded draws
    Simulate {
        #[command(flatten)]
        strategy: StrategyArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Also run the uniform random baseline
        #[arg(long)]
        baseline: bool,

        /// Show per-batch sub-totals
        #[arg(long)]
        batches: bool,

        /// Write <preset>_batches.csv and <preset>_summary.csv into this directory
        #[arg(long)]
        export: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Every preset and the random baseline on the same targets
    Compare {
        #[command(flatten)]
        run: RunArgs,

        /// Kill list size for the kill and hybrid presets
        #[arg(short, long)]
        kills: Option<usize>,
    },

    /// Rank a ticket against a recorded draw
    Check {
        /// Six numbers
        #[arg(num_args = 6, required = true)]
        numbers: Vec<u8>,

        /// Draw to check against (latest by default)
        #[arg(short, long)]
        draw: Option<u32>,
    },

    /// Kill list backtest, exclusion rule survival and AC distribution
    Audit {
        /// Backtest the kill list on this many latest draws
        #[arg(long, default_value = "5")]
        recent: usize,

        #[arg(short, long, default_value = "5")]
        kills: usize,

        /// Flag draws with AC at or below this value
        #[arg(long, default_value = "4")]
        low_ac: u32,
    },

    /// Print a preset configuration, or write it as JSON
    Config {
        #[arg(short, long, value_enum, default_value_t = Preset::Hybrid)]
        preset: Preset,

        #[arg(short, long)]
        kills: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Import { file } => cmd_import(&cli.history, &file),
        Command::History { last } => cmd_history(&cli.history, last),
        Command::Scores { strategy, top, before } => cmd_scores(&cli.history, &strategy, top, before),
        Command::Kills { strategy, before } => cmd_kills(&cli.history, &strategy, before),
        Command::Predict { strategy, count, seed, before, json } => {
            cmd_predict(&cli.history, &strategy, count, seed, before, json)
        }
        Command::Simulate { strategy, run, baseline, batches, export, json } => {
            cmd_simulate(&cli.history, &strategy, &run, baseline, batches, export.as_deref(), json)
        }
        Command::Compare { run, kills } => cmd_compare(&cli.history, &run, kills),
        Command::Check { numbers, draw } => cmd_check(&cli.history, &numbers, draw),
        Command::Audit { recent, kills, low_ac } => cmd_audit(&cli.history, recent, kills, low_ac),
        Command::Config { preset, kills, output } => cmd_config(preset, kills, output.as_deref()),
    }
}

fn load_history(path: &Path) -> Result<History> {
    let history = load_or_empty(path)?;
    if history.is_empty() {
        bail!("History {:?} is empty. Run first: lotto import <file.csv>", path);
    }
    Ok(history)
}

/// Draws used for training: everything, or only those before `before`.
fn window(history: &History, before: Option<u32>) -> Result<&[Draw]> {
    match before {
        Some(id) => {
            history
                .find(id)
                .with_context(|| format!("Draw {} not found in history", id))?;
            Ok(history.before(id))
        }
        None => Ok(history.draws()),
    }
}

fn cmd_import(history_path: &Path, file: &Path) -> Result<()> {
    let (history, result) = import_into(history_path, file)?;
    display_import_summary(&result, history.len());
    Ok(())
}

fn cmd_history(history_path: &Path, last: usize) -> Result<()> {
    let history = load_history(history_path)?;
    display_history(history.recent(last));
    Ok(())
}

fn cmd_scores(history_path: &Path, strategy: &StrategyArgs, top: Option<usize>, before: Option<u32>) -> Result<()> {
    let history = load_history(history_path)?;
    let predictor = Predictor::from_window(window(&history, before)?, strategy.resolve()?);
    display_scores(&predictor.all_scores(), top);
    Ok(())
}

fn cmd_kills(history_path: &Path, strategy: &StrategyArgs, before: Option<u32>) -> Result<()> {
    let history = load_history(history_path)?;
    let predictor = Predictor::from_window(window(&history, before)?, strategy.resolve()?);
    display_exclusions(predictor.exclusions());
    Ok(())
}

fn cmd_predict(
    history_path: &Path,
    strategy: &StrategyArgs,
    count: usize,
    seed: Option<u64>,
    before: Option<u32>,
    json: bool,
) -> Result<()> {
    let history = load_or_empty(history_path)?;
    let predictor = Predictor::from_window(window(&history, before)?, strategy.resolve()?);

    let results: Vec<_> = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..count).map(|_| predictor.predict_with(&mut rng)).collect()
        }
        None => (0..count).map(|_| predictor.predict()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    for result in &results {
        display_prediction(result, &predictor.scores_for(result.numbers.numbers()));
    }
    Ok(())
}

fn progress_bar(len: u64, label: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    pb.set_message(label.to_string());
    Ok(pb)
}

fn run_with_bar(harness: &SimulationHarness<'_>, strategy: &Strategy) -> Result<SimulationReport> {
    let pb = progress_bar(harness.settings().iterations as u64, &strategy.label())?;
    let report = harness.run_with_progress(strategy, |n| pb.inc(n))?;
    pb.finish_and_clear();
    Ok(report)
}

fn cmd_simulate(
    history_path: &Path,
    strategy: &StrategyArgs,
    run: &RunArgs,
    baseline: bool,
    batches: bool,
    export: Option<&Path>,
    json: bool,
) -> Result<()> {
    let history = load_history(history_path)?;
    let config = strategy.resolve()?;
    let harness = SimulationHarness::new(&history, run.settings())?;

    let mut strategies = vec![Strategy::Predictor(config)];
    if baseline {
        strategies.push(Strategy::Random);
    }
    let reports = strategies
        .iter()
        .map(|s| run_with_bar(&harness, s))
        .collect::<Result<Vec<_>>>()?;

    if let Some(dir) = export {
        for report in &reports {
            let stem = report.strategy.replace([' ', '(', ')', '='], "");
            let (batches_path, summary_path) = export_csv(report, dir, &stem)?;
            println!("Exported {} and {}", batches_path.display(), summary_path.display());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in &reports {
        display_simulation(report);
        if batches {
            display_batches(report);
        }
    }
    if reports.len() > 1 {
        display_comparison(&reports);
    }
    Ok(())
}

fn cmd_compare(history_path: &Path, run: &RunArgs, kills: Option<usize>) -> Result<()> {
    let history = load_history(history_path)?;
    let mut strategies: Vec<Strategy> = Preset::ALL
        .iter()
        .map(|&p| {
            let config = PredictorConfig::preset(p);
            Strategy::Predictor(match kills {
                Some(k) => config.with_kill_count(k),
                None => config,
            })
        })
        .collect();
    strategies.push(Strategy::Random);

    let settings = run.settings();
    let pb = progress_bar((settings.iterations * strategies.len()) as u64, "all strategies")?;
    let harness = SimulationHarness::new(&history, settings)?;
    let reports = strategies
        .iter()
        .map(|s| {
            pb.set_message(s.label());
            harness.run_with_progress(s, |n| pb.inc(n))
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();

    display_comparison(&reports);
    Ok(())
}

fn cmd_check(history_path: &Path, numbers: &[u8], draw: Option<u32>) -> Result<()> {
    let history = load_history(history_path)?;
    let ticket = Candidate::new(numbers).with_context(|| format!("Invalid ticket {:?}: six distinct numbers in 1-45", numbers))?;
    let target = match draw {
        Some(id) => history.find(id).with_context(|| format!("Draw {} not found in history", id))?,
        None => history.latest().context("History is empty")?,
    };
    let rank = rank(ticket.numbers(), target);
    let prize = PrizeTable::default().for_draw(target).prize(rank);
    display_ticket_check(&ticket, target, rank, prize);
    Ok(())
}

fn cmd_audit(history_path: &Path, recent: usize, kills: usize, low_ac: u32) -> Result<()> {
    let history = load_history(history_path)?;
    let config = PredictorConfig::preset(Preset::Kill).with_kill_count(kills);
    config.validate()?;

    let targets = recent_targets(&history, recent);
    let results = backtest_kills(&history, &config.exclusion, &targets)?;
    display_kill_backtest(&results);
    display_rule_survival(&rule_survival(&history));
    display_ac_distribution(&ac_distribution(&history, low_ac), low_ac);
    Ok(())
}

fn cmd_config(preset: Preset, kills: Option<usize>, output: Option<&Path>) -> Result<()> {
    let config = PredictorConfig::preset(preset);
    let config = match kills {
        Some(k) => config.with_kill_count(k),
        None => config,
    };
    config.validate()?;

    match output {
        Some(path) => {
            config.save(path)?;
            println!("Configuration written to {}", path.display());
        }
        None => display_config(&config),
    }
    Ok(())
}
