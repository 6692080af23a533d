use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile and analyze ad-hoc query result sets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full six-step analysis over a CSV result set
    Analyze(AnalyzeArgs),
    /// Infer and print a semantic role for every column
    Classify(ClassifyArgs),
    /// Extract the (date, value) time series a chart builder would consume
    Series(SeriesArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input CSV file holding the query result set
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    pub delimiter: u8,
    /// Original natural-language question, used to mark suitable analyses
    #[arg(short, long, default_value = "")]
    pub prompt: String,
    /// Emit the report as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Input CSV file holding the query result set
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    pub delimiter: u8,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Input CSV file holding the query result set
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    pub delimiter: u8,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "," => Ok(b','),
        ";" => Ok(b';'),
        "|" => Ok(b'|'),
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        other => Err(format!("Unsupported delimiter '{other}'")),
    }
}
