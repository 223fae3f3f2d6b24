// trialflow/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use trialflow_core::domain::model::InstantSpec;

#[derive(Parser)]
#[command(name = "trialflow")]
#[command(about = "Loads, validates and imports trial entities to their endpoints", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the import pipeline (Load -> Validate -> Jobs)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Run only one entity (ex: "TrialB")
        #[arg(long, short)]
        select: Option<String>,

        /// Instant used to resolve active phases (offset, YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<i64>,
    },

    /// ✅ Loads and validates entities without importing them
    Validate {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, short)]
        select: Option<String>,
    },

    /// 🔍 Prints the summary of one entity
    Inspect {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Entity id
        #[arg(long, short)]
        entity: String,

        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<i64>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// 📋 Lists the registered entity kinds and their field mappings
    Kinds,

    /// 🧹 Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

fn parse_as_of(raw: &str) -> Result<i64, String> {
    let spec: InstantSpec = raw.parse()?;
    spec.resolve()
        .ok_or_else(|| format!("Unreadable instant: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["trialflow", "run"]);
        match args.command {
            Commands::Run {
                project_dir,
                select,
                as_of,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(select, None);
                assert_eq!(as_of, None);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_select() -> Result<()> {
        let args = Cli::parse_from([
            "trialflow",
            "run",
            "--select",
            "TrialB",
            "--project-dir",
            "/tmp",
            "--as-of",
            "2024-01-01",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                select,
                as_of,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(select, Some("TrialB".to_string()));
                assert_eq!(as_of, Some(1_704_067_200));
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_rejects_unreadable_instant() {
        let res = Cli::try_parse_from(["trialflow", "run", "--as-of", "next week"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from([
            "trialflow",
            "inspect",
            "--entity",
            "TrialB",
            "--format",
            "json",
            "--as-of",
            "5",
        ]);
        match args.command {
            Commands::Inspect {
                entity,
                format,
                as_of,
                project_dir,
            } => {
                assert_eq!(entity, "TrialB");
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(as_of, Some(5));
                assert_eq!(project_dir.to_string_lossy(), ".");
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }
}
