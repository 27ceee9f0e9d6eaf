//! Extract command - pull fields out of one piece of receipt text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcpt_core::{
    AmountStrategyKind, Candidate, DateStrategyKind, ExtractionConfig, FieldKind, ParsedText,
    TextParser,
};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file (default: stdin, also "-")
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Amount strategies tried in order, e.g. "total,largest"
    #[arg(long, value_delimiter = ',')]
    amount_strategy: Vec<AmountStrategyKind>,

    /// Date strategy: earliest or first
    #[arg(long)]
    date_strategy: Option<DateStrategyKind>,

    /// Fields to extract, e.g. "amount,date"
    #[arg(long, value_delimiter = ',')]
    fields: Vec<FieldKind>,

    /// Year assumed for dates printed without one
    #[arg(long)]
    reference_year: Option<i32>,

    /// Include every candidate considered
    #[arg(long)]
    show_candidates: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?.extraction;
    apply_overrides(&mut config, &args);

    let parser = TextParser::from_config(&config)?;
    debug!("Using {:?}", parser);

    let input = read_input(&args)?;
    let parsed = parser.parse_bytes(&input)?;

    let output = format_parsed(&parsed, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(config: &mut ExtractionConfig, args: &ExtractArgs) {
    if !args.amount_strategy.is_empty() {
        config.amount.strategies = args.amount_strategy.clone();
    }
    if let Some(strategy) = args.date_strategy {
        config.date.strategy = strategy;
    }
    if !args.fields.is_empty() {
        config.fields = args.fields.clone();
    }
    if args.reference_year.is_some() {
        config.date.reference_year = args.reference_year;
    }
    if args.show_candidates {
        config.verbose = true;
    }
}

fn read_input(args: &ExtractArgs) -> anyhow::Result<Vec<u8>> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            info!("Reading {}", path.display());
            Ok(fs::read(path)?)
        }
        _ => {
            info!("Reading stdin");
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn format_parsed(parsed: &ParsedText, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(parsed)?),
        OutputFormat::Csv => format_csv(parsed),
        OutputFormat::Text => Ok(format_text(parsed)),
    }
}

fn format_csv(parsed: &ParsedText) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(parsed.fields.keys())?;
    wtr.write_record(
        parsed
            .fields
            .values()
            .map(|matched| matched.as_deref().unwrap_or_default()),
    )?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data.trim_end().to_string())
}

fn format_text(parsed: &ParsedText) -> String {
    let mut output = String::new();

    for (field, matched) in &parsed.fields {
        let value = matched.as_deref().unwrap_or("not found");
        output.push_str(&format!("{}: {}\n", field, value));
    }

    if let Some(verbose) = &parsed.verbose {
        for (field, report) in &verbose.fields {
            output.push_str(&format!("\n{} candidates ({}):\n", field, report.matches.len()));
            for candidate in &report.matches {
                output.push_str(&format!("  {}\n", describe(candidate)));
            }
        }
    }

    output.trim_end().to_string()
}

fn describe(candidate: &Candidate) -> String {
    match candidate {
        Candidate::Amount(amount) => match &amount.currency {
            Some(currency) => format!("{}{} = {}", currency, amount.text, amount.value),
            None => format!("{} = {}", amount.text, amount.value),
        },
        Candidate::Date(date) => format!("{} = {}", date.text, date.date),
        Candidate::Other(value) => value.to_string(),
    }
}
