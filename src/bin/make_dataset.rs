// make_dataset - assemble a consolidated feature dataset for one experiment
//
// Thin I/O collaborator around the extraction core: reads experiment
// inputs from a JSON container, runs the pipeline, and writes the
// flattened feature bundle as JSON. The output is written to a temporary
// file and renamed into place so a failed run never leaves a partial
// dataset behind.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use courtship_features::{assemble, DatasetConfig, ExperimentInputs};
use log::info;

#[derive(Parser, Debug)]
#[command(
    name = "make_dataset",
    about = "Gather one experiment's courtship features into a single dataset file"
)]
struct Cli {
    /// Path to the experiment inputs JSON (tracks, trigger, segmentation)
    #[arg(short = 'e', long)]
    expt_file: PathBuf,
    /// Output path; a directory or a full path ending in .json
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Overwrite the output file if it already exists
    #[arg(long)]
    overwrite: bool,
    /// Optional JSON config overriding the default parameters
    #[arg(long)]
    config: Option<PathBuf>,
    /// Include the raw merged audio trace in the output
    #[arg(long)]
    with_audio: bool,
    /// Skip all song processing; tracking features only
    #[arg(long)]
    skip_audio: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = cli
        .config
        .as_ref()
        .map(DatasetConfig::load_from_file)
        .unwrap_or_default();
    config.with_audio |= cli.with_audio;
    config.skip_audio |= cli.skip_audio;

    let contents = fs::read_to_string(&cli.expt_file)
        .with_context(|| format!("reading experiment inputs from {:?}", cli.expt_file))?;
    let inputs: ExperimentInputs =
        serde_json::from_str(&contents).context("parsing experiment inputs")?;

    let output_path = resolve_output_path(cli.output, &inputs.expt_name);
    if output_path.exists() && !cli.overwrite {
        info!(
            "Output path {:?} already exists and --overwrite is not set",
            output_path
        );
        return Ok(ExitCode::SUCCESS);
    }

    let dataset = assemble(&inputs, &config)
        .with_context(|| format!("extracting features for '{}'", inputs.expt_name))?;

    if let Some(dir) = output_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {:?}", dir))?;
    }

    // Write to a sibling temp file and rename so no partial dataset is
    // ever finalized.
    let tmp_path = output_path.with_extension("json.tmp");
    let serialized = serde_json::to_vec(&dataset.to_feature_map())
        .context("serializing feature bundle")?;
    fs::write(&tmp_path, serialized)
        .with_context(|| format!("writing {:?}", tmp_path))?;
    fs::rename(&tmp_path, &output_path)
        .with_context(|| format!("finalizing {:?}", output_path))?;

    info!("Saved features for '{}' to {:?}", inputs.expt_name, output_path);
    Ok(ExitCode::SUCCESS)
}

/// Resolve the output file path from an optional directory or full path.
fn resolve_output_path(output: Option<PathBuf>, expt_name: &str) -> PathBuf {
    let base = output.unwrap_or_else(|| PathBuf::from("."));
    if base.extension().map(|e| e == "json").unwrap_or(false) {
        base
    } else {
        base.join(format!("{}.json", expt_name))
    }
}
