use clap::{Parser, Subcommand, ValueEnum};

use crate::utils::types::{DataFormat, SortOrder};

/// Datatable CLI - query a read-only set of user records
#[derive(Parser, Debug)]
#[command(name = "datatable")]
#[command(about = "Column selection, filtering, search, sorting and pagination over user records")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Data file or glob pattern, overriding the configured path
    #[arg(short, long, global = true)]
    pub data: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query over the records
    Query {
        /// Comma-separated columns (e.g. "id,name,address.city")
        #[arg(long)]
        columns: Option<String>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,

        /// Items per page
        #[arg(long)]
        limit: Option<u32>,

        /// Case-insensitive search term
        #[arg(short, long)]
        search: Option<String>,

        /// Filter expression (e.g. "id:>=3,company.name:tech")
        #[arg(long)]
        filters: Option<String>,

        /// Field to sort by
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction
        #[arg(long, default_value = "asc")]
        sort_order: SortOrder,

        /// Row shape
        #[arg(short, long, default_value = "nested")]
        format: DataFormat,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },

    /// Show a single record by id
    Get {
        /// Record id
        id: i64,

        /// Output format
        #[arg(short, long, default_value = "json")]
        output: OutputFormat,
    },

    /// Search every searchable field
    Search {
        /// Search term
        query: String,

        /// Comma-separated columns
        #[arg(long)]
        columns: Option<String>,

        /// Row shape
        #[arg(short, long, default_value = "nested")]
        format: DataFormat,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },

    /// List selectable columns
    Columns {
        /// Restrict to one category (basic, address, company)
        #[arg(long)]
        category: Option<String>,
    },

    /// Dataset statistics
    Stats {
        #[arg(value_enum, default_value = "overview")]
        kind: StatsKind,
    },

    /// Start the HTTP server
    Serve {
        /// Listen host, overriding the configured one
        #[arg(long)]
        host: Option<String>,

        /// Listen port, overriding the configured one
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Output format options
#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    /// Formatted table output
    Table,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

/// Statistics views
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKind {
    Overview,
    Summary,
    Cities,
    Companies,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let args = CliArgs::parse_from([
            "datatable",
            "--data",
            "users.json",
            "query",
            "--columns",
            "id,name",
            "--page",
            "2",
            "--limit",
            "5",
            "--sort-by",
            "name",
            "--sort-order",
            "desc",
            "--format",
            "flat",
            "--output",
            "csv",
        ]);

        assert_eq!(args.data.as_deref(), Some("users.json"));
        match args.command {
            Commands::Query {
                columns,
                page,
                limit,
                sort_order,
                format,
                output,
                ..
            } => {
                assert_eq!(columns.as_deref(), Some("id,name"));
                assert_eq!(page, Some(2));
                assert_eq!(limit, Some(5));
                assert_eq!(sort_order, SortOrder::Desc);
                assert_eq!(format, DataFormat::Flat);
                assert!(matches!(output, OutputFormat::Csv));
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_parse_stats_default_kind() {
        let args = CliArgs::parse_from(["datatable", "stats"]);
        match args.command {
            Commands::Stats { kind } => assert_eq!(kind, StatsKind::Overview),
            _ => panic!("Expected Stats command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["datatable", "get", "3", "--config", "engine.json", "-v"]);
        assert_eq!(args.config.as_deref(), Some("engine.json"));
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Get { id: 3, .. }));
    }
}
