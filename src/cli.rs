use clap::Parser;
use std::path::PathBuf;

use crate::types::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pdf2x")]
#[command(about = "Convert PDFs to Markdown, text, or JSON via LlamaParse")]
pub struct Cli {
    /// PDF files or directories containing PDF files
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Output file (single input file) or flat output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Scan subdirectories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel workers (1-4)
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub workers: u8,

    /// Overwrite outputs that already exist
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["pdf2x", "report.pdf"]);
        assert_eq!(cli.input, vec![PathBuf::from("report.pdf")]);
        assert_eq!(cli.format, OutputFormat::Markdown);
        assert_eq!(cli.output, None);
        assert_eq!(cli.workers, 2);
        assert!(!cli.recursive);
        assert!(!cli.force);
    }

    #[test]
    fn test_format_and_output() {
        let cli = Cli::parse_from(["pdf2x", "a.pdf", "-f", "json", "-o", "out.json"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_multiple_inputs() {
        let cli = Cli::parse_from(["pdf2x", "a.pdf", "docs/", "-r"]);
        assert_eq!(cli.input.len(), 2);
        assert!(cli.recursive);
    }

    #[test]
    fn test_workers_out_of_range() {
        assert!(Cli::try_parse_from(["pdf2x", "a.pdf", "-w", "9"]).is_err());
        assert!(Cli::try_parse_from(["pdf2x", "a.pdf", "-w", "0"]).is_err());
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["pdf2x"]).is_err());
    }
}
