#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use ipmw::weighting::aggregate::{WeightSummary, unweighted_mean, weighted_mean};
use ipmw::weighting::config::RunConfig;
use ipmw::weighting::data::load_dataset;
use ipmw::weighting::estimator::IpmwEstimator;
use ipmw::weighting::logit::FitOptions;
use ipmw::weighting::summary::{ConsoleReporter, FitReporter, LogReporter};

#[derive(Parser)]
#[command(
    name = "ipmw",
    about = "Inverse probability of missing weights for a single missing variable",
    long_about = "Fits a logistic regression for the probability that a variable is observed \
                  and writes one inverse-probability weight per record."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the observation models and write weights, configured by flags
    #[command(about = "Fit IPMW from command-line options (outputs: weights.tsv)")]
    Fit(FitArgs),

    /// Fit the observation models and write weights, configured by a TOML file
    #[command(about = "Fit IPMW from a TOML run configuration")]
    Run {
        /// Path to the run configuration (.toml)
        config: String,
    },
}

#[derive(Args)]
struct FitArgs {
    /// Path to a delimited data file with a header row
    data: PathBuf,

    /// Column with missing values to be weighted
    #[arg(long = "missing", value_name = "COLUMN")]
    missing_variable: String,

    /// Denominator model term: `name`, `name^k` or `a:b` (repeatable)
    #[arg(long = "denominator", value_name = "TERM", required = true)]
    denominator: Vec<String>,

    /// Numerator model term for stabilized weights (repeatable; default intercept-only)
    #[arg(long = "numerator", value_name = "TERM")]
    numerator: Vec<String>,

    /// Compute stabilized weights
    #[arg(long)]
    stabilized: bool,

    /// Column whose complete-case and weighted means are reported
    #[arg(long, value_name = "COLUMN")]
    outcome: Option<String>,

    /// Field separator of the data file
    #[arg(long, default_value = "\t")]
    separator: char,

    /// Output path for the weights
    #[arg(long, default_value = "weights.tsv")]
    output: PathBuf,

    /// Optional output path for the fitted models (.toml)
    #[arg(long)]
    models_output: Option<PathBuf>,

    /// Do not print the regression summaries
    #[arg(long)]
    quiet: bool,

    /// Maximum number of IRLS iterations
    #[arg(long, default_value = "100")]
    max_iterations: usize,

    /// Convergence tolerance for the relative deviance change
    #[arg(long, default_value = "1e-8")]
    tolerance: f64,
}

impl From<FitArgs> for RunConfig {
    fn from(args: FitArgs) -> Self {
        RunConfig {
            data: args.data,
            separator: args.separator,
            missing_variable: args.missing_variable,
            outcome: args.outcome,
            stabilized: args.stabilized,
            denominator: args.denominator,
            numerator: args.numerator,
            output: args.output,
            models_output: args.models_output,
            print_results: !args.quiet,
            solver: FitOptions {
                max_iterations: args.max_iterations,
                tolerance: args.tolerance,
            },
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fit(args) => run(&RunConfig::from(args)),
        Commands::Run { config } => {
            RunConfig::load(&config)
                .map_err(Into::into)
                .and_then(|config| run(&config))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn run(config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let separator = config.separator_byte()?;
    let denominator = config.denominator_formula()?;
    let numerator = config.numerator_formula()?;

    let data = load_dataset(path_str(&config.data)?, separator)?;
    println!(
        "Loaded {} records with columns: {}",
        data.n_records(),
        data.column_names().join(", ")
    );

    let outcome_values = match &config.outcome {
        Some(outcome) => Some((outcome.clone(), data.values(outcome)?.to_vec())),
        None => None,
    };

    let mut estimator = IpmwEstimator::new(data, &config.missing_variable, config.stabilized)?
        .with_fit_options(config.solver);

    let mut console = ConsoleReporter;
    let mut log_only = LogReporter;
    let reporter: &mut dyn FitReporter = if config.print_results {
        &mut console
    } else {
        &mut log_only
    };
    let models = estimator
        .regression_models(&denominator, numerator.as_ref(), Some(reporter))?
        .clone();

    let weights = estimator.fit()?.clone();
    write_weights(&config.output, estimator.observed(), &weights)?;
    println!(
        "Weights for {} records saved to: {}",
        weights.len(),
        config.output.display()
    );

    if let Some(path) = &config.models_output {
        models.save(path_str(path)?)?;
        println!("Fitted models saved to: {}", path.display());
    }

    if let Some(observed_weights) = estimator.observed_weights() {
        let summary = WeightSummary::from_weights(observed_weights.view())?;
        println!("Observed-record weights: {summary}");
    }

    if let Some((outcome, values)) = outcome_values {
        println!(
            "Complete-case mean of '{}': {:.4}",
            outcome,
            unweighted_mean(&values)?
        );
        println!(
            "IPMW-weighted mean of '{}': {:.4}",
            outcome,
            weighted_mean(&values, weights.view())?
        );
    }

    Ok(())
}

fn path_str(path: &Path) -> Result<&str, String> {
    path.to_str()
        .ok_or_else(|| format!("path '{}' is not valid UTF-8", path.display()))
}

/// Writes `record\tobserved\tweight`, one line per input record.
fn write_weights(
    path: &Path,
    observed: &ndarray::Array1<f64>,
    weights: &ndarray::Array1<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(["record", "observed", "weight"])?;
    for (i, (&r, &w)) in observed.iter().zip(weights.iter()).enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            (r as u8).to_string(),
            format!("{w:.10}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
