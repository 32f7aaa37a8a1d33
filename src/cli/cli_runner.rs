use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Commands, OutputFormat, OutputFormatter, StatsKind};
use crate::engine::{ColumnCategory, Engine};
use crate::server::HttpServer;
use crate::utils::{
    config::EngineConfig,
    error::{EngineResult, RequestError},
    types::{parse_column_list, DataFormat, QueryRequest},
};

/// Main CLI runner that handles command execution
pub struct CliRunner {
    engine: Engine,
}

impl CliRunner {
    /// Load the record store described by `config`
    pub async fn new(config: EngineConfig) -> EngineResult<Self> {
        let engine = Engine::initialize(config).await?;
        Ok(Self { engine })
    }

    /// Wrap an already built engine
    pub fn with_engine(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Validate and execute a query, returning formatted results
    pub fn execute_query(&self, request: &QueryRequest, output: &OutputFormat) -> EngineResult<String> {
        request.validate(self.engine.config().query.max_limit)?;

        let response = self.engine.execute_query(request);
        tracing::debug!(total = response.total, rows = response.row_count(), "query executed");

        OutputFormatter::format_response(&response, output)
    }

    /// Show one record
    pub fn get_record(&self, id: i64, output: &OutputFormat) -> EngineResult<String> {
        let record = self.engine.find_by_id(id)?;
        let row = match serde_json::to_value(record) {
            Ok(serde_json::Value::Object(row)) => row,
            _ => serde_json::Map::new(),
        };
        OutputFormatter::format_rows(&[row], output)
    }

    /// Free-text search
    pub fn search(
        &self,
        term: &str,
        columns: Option<&str>,
        format: DataFormat,
        output: &OutputFormat,
    ) -> EngineResult<String> {
        let columns = columns.filter(|c| !c.is_empty()).map(parse_column_list);
        let response = self.engine.search(term, columns, format);
        OutputFormatter::format_response(&response, output)
    }

    /// List selectable columns, optionally for one category
    pub fn list_columns(&self, category: Option<&str>) -> EngineResult<String> {
        let category = category
            .map(|name| {
                ColumnCategory::parse(name).ok_or_else(|| {
                    RequestError::invalid("category", format!("'{}' must be one of basic, address, company", name))
                })
            })
            .transpose()?;

        let columns = self.engine.columns(category);

        let mut output = String::new();
        let title = match category {
            Some(category) => format!("{} columns:", category.as_str()),
            None => "Available columns:".to_string(),
        };
        output.push_str(&format!("{}\n", title.bold()));

        let width = columns.keys().map(|k| k.len()).max().unwrap_or(0);
        for (path, description) in &columns {
            output.push_str(&format!(
                "  {} {} {}\n",
                "•".green(),
                format!("{:<width$}", path, width = width).cyan(),
                description.as_str().unwrap_or_default()
            ));
        }
        output.push_str(&format!("\n{} {}\n", columns.len().to_string().green().bold(), "columns"));

        Ok(output)
    }

    /// Dataset statistics as JSON
    pub fn stats(&self, kind: StatsKind) -> EngineResult<String> {
        match kind {
            StatsKind::Overview => OutputFormatter::to_pretty_json(&self.engine.stats_overview()),
            StatsKind::Summary => OutputFormatter::to_pretty_json(&self.engine.stats_summary()),
            StatsKind::Cities => OutputFormatter::to_pretty_json(&self.engine.city_stats()),
            StatsKind::Companies => OutputFormatter::to_pretty_json(&self.engine.company_stats()),
        }
    }

    /// Serve the engine over HTTP until the process is stopped
    pub async fn serve(self, host: Option<String>, port: Option<u16>) -> EngineResult<()> {
        let mut config = self.engine.config().server.clone();
        if let Some(host) = host {
            config.host = host;
        }
        if let Some(port) = port {
            config.port = port;
        }

        eprintln!(
            "{}",
            OutputFormatter::format_info(&format!(
                "Serving {} records on http://{}",
                self.engine.store().len(),
                config.socket_addr()
            ))
        );
        HttpServer::with_config(self.engine, config).start().await
    }
}

/// Resolve configuration from the config file and CLI overrides
pub fn load_config(args: &CliArgs) -> EngineResult<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    if let Some(data) = &args.data {
        config.data.path = data.clone();
    }

    Ok(config)
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &EngineConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn exit_with_error(error: &crate::utils::error::EngineError) -> ! {
    eprintln!("{}", OutputFormatter::format_error(error));
    std::process::exit(1);
}

/// Main entry point for CLI execution
pub async fn run_cli() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => exit_with_error(&e),
    };
    init_tracing(&config, args.verbose);

    // Initialize CLI runner
    let runner = match CliRunner::new(config).await {
        Ok(runner) => runner,
        Err(e) => exit_with_error(&e),
    };

    // Execute the command
    let result = match args.command {
        Commands::Query {
            columns,
            page,
            limit,
            search,
            filters,
            sort_by,
            sort_order,
            format,
            output,
        } => {
            let request = QueryRequest {
                columns: columns.as_deref().filter(|c| !c.is_empty()).map(parse_column_list),
                page,
                limit,
                search,
                filters,
                sort_by,
                sort_order,
                format,
            };
            runner.execute_query(&request, &output)
        }

        Commands::Get { id, output } => runner.get_record(id, &output),

        Commands::Search {
            query,
            columns,
            format,
            output,
        } => runner.search(&query, columns.as_deref(), format, &output),

        Commands::Columns { category } => runner.list_columns(category.as_deref()),

        Commands::Stats { kind } => runner.stats(kind),

        Commands::Serve { host, port } => match runner.serve(host, port).await {
            Ok(()) => return Ok(()),
            Err(e) => exit_with_error(&e),
        },
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => exit_with_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::MemorySource;
    use crate::utils::error::{EngineError, LookupError};

    async fn runner() -> CliRunner {
        let engine = Engine::from_source(EngineConfig::default(), &MemorySource::with_sample_data())
            .await
            .unwrap();
        CliRunner::with_engine(engine)
    }

    #[tokio::test]
    async fn test_execute_query_rejects_limit_over_max() {
        let runner = runner().await;
        let request = QueryRequest::new().with_page(1, 500);

        match runner.execute_query(&request, &OutputFormat::Json) {
            Err(EngineError::Request(RequestError::InvalidParameter { name, .. })) => assert_eq!(name, "limit"),
            _ => panic!("Expected InvalidParameter error"),
        }
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let runner = runner().await;
        assert!(matches!(
            runner.get_record(42, &OutputFormat::Json),
            Err(EngineError::Lookup(LookupError::NotFound(42)))
        ));
    }

    #[tokio::test]
    async fn test_list_columns_by_category() {
        colored::control::set_override(false);
        let runner = runner().await;

        let output = runner.list_columns(Some("company")).unwrap();
        assert!(output.contains("company.catchPhrase"));
        assert!(output.contains("Company Slogan"));
        assert!(!output.contains("address.city"));

        assert!(runner.list_columns(Some("geo")).is_err());
    }

    #[tokio::test]
    async fn test_stats_output_is_json() {
        let runner = runner().await;
        let output = runner.stats(StatsKind::Summary).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total_users"], serde_json::json!(10));
    }

    #[test]
    fn test_load_config_applies_data_override() {
        let args = CliArgs::parse_from(["datatable", "--data", "other.json", "stats"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.data.path, "other.json");
        assert_eq!(config.server.port, 8000);
    }
}
