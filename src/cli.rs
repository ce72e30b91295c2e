use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "adoptmap")]
#[command(about = "Explainable adoption recommendations and churn risk for customer success", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one customer: recommendations, churn risk, onboarding, trend
    Analyze {
        /// Customer id to analyze
        customer_id: String,

        /// JSON dataset with customers, features, and usage (defaults to the demo data)
        #[arg(long, env = "ADOPTMAP_DATA")]
        data: Option<PathBuf>,

        /// Rules file (defaults to the nearest .adoptmap.toml, then built-in rules)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// JSON file holding risk history between runs
        #[arg(long = "trend-file", env = "ADOPTMAP_TREND_FILE")]
        trend_file: Option<PathBuf>,

        /// Analyze as of this RFC 3339 instant instead of now
        #[arg(long = "as-of", value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,
    },

    /// List known customers
    List {
        /// JSON dataset with customers, features, and usage (defaults to the demo data)
        #[arg(long, env = "ADOPTMAP_DATA")]
        data: Option<PathBuf>,
    },

    /// Write the default rules to .adoptmap.toml
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
        }
    }
}

fn parse_as_of(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp such as 2026-03-01T00:00:00Z: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            crate::io::output::OutputFormat::from(OutputFormat::Json),
            crate::io::output::OutputFormat::Json
        );
        assert_eq!(
            crate::io::output::OutputFormat::from(OutputFormat::Terminal),
            crate::io::output::OutputFormat::Terminal
        );
    }

    #[test]
    fn test_cli_parsing_analyze_command() {
        let cli = Cli::try_parse_from([
            "adoptmap",
            "-vv",
            "analyze",
            "cust_003",
            "--format",
            "json",
            "--trend-file",
            "trend.json",
            "--as-of",
            "2026-03-01T00:00:00Z",
        ])
        .unwrap();

        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Analyze {
                customer_id,
                format,
                trend_file,
                as_of,
                ..
            } => {
                assert_eq!(customer_id, "cust_003");
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(trend_file, Some(PathBuf::from("trend.json")));
                assert_eq!(
                    as_of,
                    Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
                );
            }
            other => panic!("Expected Analyze command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_timestamp() {
        let result = Cli::try_parse_from(["adoptmap", "analyze", "c1", "--as-of", "yesterday"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_init_command() {
        let cli = Cli::try_parse_from(["adoptmap", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
