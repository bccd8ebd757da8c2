//! dynoquery-cli entry point.

use anyhow::{Context, Result};
use clap::Parser;
use dynoquery::{Client, ItemBuilder};
use dynoquery_cli::cli::{key_value, Cli, Commands, FilterArgs, OutputFormat, PageArgs};
use dynoquery_cli::output::{format_output, pretty, CountOutput, ItemsOutput};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dynoquery=info,dynoquery_cli=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn apply_filters(mut builder: ItemBuilder, filters: FilterArgs) -> ItemBuilder {
    for (index, (attribute, value)) in filters.filter.into_iter().enumerate() {
        let predicate = dynoquery::expression::equal(value);
        builder = if index == 0 {
            builder.filter(attribute, predicate)
        } else {
            builder.and_filter(attribute, predicate)
        };
    }
    builder
}

fn apply_page(mut builder: ItemBuilder, page: PageArgs) -> ItemBuilder {
    if let Some(limit) = page.limit {
        builder = builder.limit(limit);
    }
    if !page.start_key.is_empty() {
        builder = builder.start_key(page.start_key);
    }
    if !page.project.is_empty() {
        builder = builder.project(page.project);
    }
    builder
}

fn print_items(output: &dynoquery::Output, format: OutputFormat) -> Result<()> {
    let rendered = ItemsOutput::from_output(output)?;
    match format {
        OutputFormat::Json => println!("{}", format_output(&rendered, format)),
        OutputFormat::Pretty => println!("{}", pretty::format_items(&rendered)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = cli.table.to_config();
    let client = Client::connect(&config)
        .await
        .context("failed to create client")?;

    match cli.command {
        Commands::Get { pk, sk, project } => {
            let mut builder = client.pk(key_value(&pk));
            if let Some(sk) = sk {
                builder = builder.sk(dynoquery::SortCondition::equal(key_value(&sk)));
            }
            if !project.is_empty() {
                builder = builder.project(project);
            }

            match builder.get::<serde_json::Value>().await? {
                Some(item) => println!("{}", format_output(&item, cli.format)),
                None => eprintln!("Item not found."),
            }
        }
        Commands::Query {
            pk,
            index,
            sort,
            filters,
            page,
            reverse,
        } => {
            let value = key_value(&pk);
            let mut builder = match &index {
                Some(name) => client.index(name, value),
                None => client.pk(value),
            };
            if let Some(condition) = sort.condition() {
                builder = builder.sk(condition);
            }
            builder = apply_filters(builder, filters);
            builder = apply_page(builder, page).scan_forward(!reverse);

            let output = builder.query().await?;
            print_items(&output, cli.format)?;
        }
        Commands::Scan {
            index,
            filters,
            page,
        } => {
            let builder = match &index {
                Some(name) => client.index_scan(name),
                None => client.table_scan(),
            };
            let builder = apply_page(apply_filters(builder, filters), page);

            let output = builder.scan().await?;
            print_items(&output, cli.format)?;
        }
        Commands::Count {
            pk,
            index,
            filters,
            limit,
        } => {
            let builder = match (&pk, &index) {
                (Some(pk), Some(name)) => client.index(name, key_value(pk)),
                (Some(pk), None) => client.pk(key_value(pk)),
                (None, _) => client.table_scan(),
            };
            let builder = apply_filters(builder, filters);

            let counts = match limit {
                Some(limit) => builder.count_with_limit(limit).await?,
                None => builder.count().await?,
            };
            let counts = CountOutput::from(counts);
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&counts, cli.format)),
                OutputFormat::Pretty => println!("{}", pretty::format_counts(&counts)),
            }
        }
    }

    Ok(())
}
