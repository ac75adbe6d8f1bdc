// Command-line entry point for Callflow: runs a small demo workload under
// the recorder and prints its log lines and flow tree.

use anyhow::{Context, Result};
use callflow::infrastructure::ColorMode;
use callflow::ports::flowchart_exporter::FlowchartExporter;
use callflow::{CallflowConfig, Diagnostics, SamplingMode};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Dot,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enabled categories, comma separated (info,error,warn,res,flow_checker,all)
    #[arg(short, long)]
    levels: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Terminal decoration
    #[arg(long, value_enum)]
    color: Option<ColorMode>,

    /// When to sample the stack
    #[arg(long, value_enum)]
    sampling: Option<SamplingMode>,

    /// Deepest tree level to render
    #[arg(long)]
    max_depth: Option<usize>,

    /// Flow tree format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Write the flow tree here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Make the demo workload panic halfway through
    #[arg(long)]
    fail: bool,
}

fn load_config(cli: &Cli) -> Result<CallflowConfig> {
    let mut config = match &cli.config {
        Some(path) => CallflowConfig::from_path(path)
            .with_context(|| format!("Cannot load config {}", path))?,
        None => CallflowConfig::default(),
    };
    config.apply_env();
    if let Some(levels) = &cli.levels {
        config.apply_levels_str(levels);
    }
    if let Some(color) = cli.color {
        config.color = color;
    }
    if let Some(sampling) = cli.sampling {
        config.sampling = sampling;
    }
    if cli.max_depth.is_some() {
        config.max_depth = cli.max_depth;
    }
    Ok(config)
}

#[inline(never)]
fn checksum(diag: &Diagnostics, data: &[u8]) -> u32 {
    let _flow = callflow::flow_check!(diag => data.len());
    let sum = data.iter().fold(0u32, |acc, b| acc.rotate_left(5) ^ u32::from(*b));
    callflow::log_res!(diag => "checksum {:#010x}", sum);
    sum
}

#[inline(never)]
fn parse_records(diag: &Diagnostics, input: &str, fail: bool) -> Vec<String> {
    let _flow = callflow::flow_check!(diag => input.len(), fail);
    let records: Vec<String> = input.split(';').map(|r| r.trim().to_string()).collect();
    if fail {
        callflow::log_error!(diag => "record {} is malformed", records.len());
        panic!("malformed record");
    }
    callflow::log_info!(diag => "parsed {} records", records.len());
    records
}

#[inline(never)]
fn pipeline(diag: &Diagnostics, fail: bool) {
    let _flow = callflow::flow_check!(diag => fail);
    let records = parse_records(diag, "alpha; beta; gamma", fail);
    for record in &records {
        if record.is_empty() {
            callflow::log_warn!(diag => "empty record skipped");
            continue;
        }
        checksum(diag, record.as_bytes());
    }
}

fn main() -> Result<()> {
    callflow::logging::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let diag = Diagnostics::from_config(&config);

    let report = diag.run_traced_report(|| pipeline(&diag, cli.fail));
    if let Some(failure) = &report.failure {
        eprintln!("[WARN] {}", failure);
    }

    let rendered = match cli.format {
        Format::Text => report.tree,
        Format::Dot => FlowchartExporter::to_dot(&diag.recorder().flow_tree(&report.root)),
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("Cannot write {}", path))?;
            println!("Flow tree written to {} (format: {:?})", path, cli.format);
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
