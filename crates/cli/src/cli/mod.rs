//! CLI command definitions.

pub mod args;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dynoquery::{ClientConfig, KeyValue, SecondaryIndex};

pub use args::{parse_assignment, parse_index, FilterArgs, PageArgs, SortArgs};

/// Query, scan and count items in a DynamoDB table.
#[derive(Debug, Parser)]
#[command(name = "dynoquery-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub table: TableArgs,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Table layout and connection settings.
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Table name.
    #[arg(long, env = "DYNOQUERY_TABLE_NAME")]
    pub table: String,

    /// Partition key attribute.
    #[arg(long, env = "DYNOQUERY_PARTITION_KEY", default_value = "pk")]
    pub partition_key: String,

    /// Sort key attribute.
    #[arg(long, env = "DYNOQUERY_SORT_KEY")]
    pub sort_key: Option<String>,

    /// Separator inside composite discriminator values.
    #[arg(long, env = "DYNOQUERY_KEY_SEPARATOR")]
    pub key_separator: Option<String>,

    /// Secondary index as `name=partition_key[:sort_key]`. Repeatable.
    #[arg(long = "index-def", value_parser = parse_index)]
    pub indexes: Vec<SecondaryIndex>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Endpoint override, e.g. http://localhost:8000.
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Transport-level attempts per request.
    #[arg(long, env = "DYNOQUERY_MAX_RETRIES", default_value = "5")]
    pub max_retries: u32,
}

impl TableArgs {
    pub fn to_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.table, &self.partition_key)
            .with_region(&self.region)
            .with_max_retries(self.max_retries);
        if let Some(sort_key) = &self.sort_key {
            config = config.with_sort_key(sort_key);
        }
        if let Some(separator) = &self.key_separator {
            config = config.with_key_separator(separator);
        }
        if let Some(endpoint) = &self.endpoint_url {
            config = config.with_endpoint_url(endpoint);
        }
        for index in &self.indexes {
            config = config.with_index(index.clone());
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Indented JSON with a summary line.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch one item by its full key.
    Get {
        /// Partition key value.
        #[arg(long)]
        pk: String,
        /// Sort key value.
        #[arg(long)]
        sk: Option<String>,
        /// Attributes to return, comma separated.
        #[arg(long, value_delimiter = ',')]
        project: Vec<String>,
    },
    /// Query one partition of the table or an index.
    Query {
        /// Partition key value.
        #[arg(long)]
        pk: String,
        /// Query this secondary index.
        #[arg(long)]
        index: Option<String>,
        #[command(flatten)]
        sort: SortArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
        /// Return the sort key in descending order.
        #[arg(long)]
        reverse: bool,
    },
    /// Scan the whole table or an index.
    Scan {
        /// Scan this secondary index.
        #[arg(long)]
        index: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count matching items.
    Count {
        /// Count one partition instead of the whole table.
        #[arg(long)]
        pk: Option<String>,
        /// Count through this secondary index (requires --pk).
        #[arg(long, requires = "pk")]
        index: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Stop once this many items have matched.
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Typed key value from a command-line string: integers become numbers.
pub fn key_value(raw: &str) -> KeyValue {
    raw.parse::<i64>()
        .map(KeyValue::from)
        .unwrap_or_else(|_| KeyValue::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "dynoquery-cli",
            "--table",
            "rooms",
            "--sort-key",
            "sk",
            "--index-def",
            "by-type=_type:name",
            "query",
            "--pk",
            "building#1",
            "--sk-begins-with",
            "room#",
            "--filter",
            "status=open",
            "--limit",
            "10",
        ])
        .unwrap();

        let config = cli.table.to_config();
        assert_eq!(config.table_name, "rooms");
        assert_eq!(config.indexes[0].sort_key.as_deref(), Some("name"));

        let Commands::Query {
            pk, sort, filters, page, ..
        } = cli.command
        else {
            panic!("expected query");
        };
        assert_eq!(pk, "building#1");
        assert_eq!(sort.sk_begins_with.as_deref(), Some("room#"));
        assert_eq!(filters.filter, vec![("status".to_string(), KeyValue::from("open"))]);
        assert_eq!(page.limit, Some(10));
    }

    #[test]
    fn test_count_index_requires_pk() {
        let result = Cli::try_parse_from([
            "dynoquery-cli",
            "--table",
            "rooms",
            "count",
            "--index",
            "by-type",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_key_value_typing() {
        assert_eq!(key_value("42"), KeyValue::from(42));
        assert_eq!(key_value("room#1"), KeyValue::from("room#1"));
    }
}
