//! Shared read arguments and value parsers.

use clap::Args;
use dynoquery::{KeyValue, SecondaryIndex, SortCondition};

use super::key_value;

/// Sort key comparator flags. At most one may be given.
#[derive(Debug, Default, Args)]
#[group(multiple = false)]
pub struct SortArgs {
    /// Sort key equals value.
    #[arg(long)]
    pub sk_equal: Option<String>,
    /// Sort key starts with prefix.
    #[arg(long)]
    pub sk_begins_with: Option<String>,
    /// Sort key between two values, inclusive.
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    pub sk_between: Vec<String>,
    /// Sort key less than value.
    #[arg(long)]
    pub sk_lt: Option<String>,
    /// Sort key greater than value.
    #[arg(long)]
    pub sk_gt: Option<String>,
}

impl SortArgs {
    pub fn condition(&self) -> Option<SortCondition> {
        if let Some(value) = &self.sk_equal {
            return Some(SortCondition::equal(key_value(value)));
        }
        if let Some(prefix) = &self.sk_begins_with {
            return Some(SortCondition::begins_with(prefix));
        }
        if let [low, high] = self.sk_between.as_slice() {
            return Some(SortCondition::between(key_value(low), key_value(high)));
        }
        if let Some(value) = &self.sk_lt {
            return Some(SortCondition::less_than(key_value(value)));
        }
        self.sk_gt
            .as_deref()
            .map(|value| SortCondition::greater_than(key_value(value)))
    }
}

/// Equality filters, ANDed together.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Attribute filter as `name=value`. Repeatable.
    #[arg(long, value_parser = parse_assignment)]
    pub filter: Vec<(String, KeyValue)>,
}

/// Paging flags.
#[derive(Debug, Default, Args)]
pub struct PageArgs {
    /// Maximum items to return.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Resume after this key, as `name=value`. Repeatable.
    #[arg(long, value_parser = parse_assignment)]
    pub start_key: Vec<(String, KeyValue)>,
    /// Attributes to return, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub project: Vec<String>,
}

/// Parse `name=value`.
pub fn parse_assignment(raw: &str) -> Result<(String, KeyValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in `{raw}`"));
    }
    Ok((name.to_string(), key_value(value.trim())))
}

/// Parse `name=partition_key[:sort_key]`.
pub fn parse_index(raw: &str) -> Result<SecondaryIndex, String> {
    let (name, keys) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=partition_key[:sort_key], got `{raw}`"))?;
    let (partition_key, sort_key) = match keys.split_once(':') {
        Some((pk, sk)) => (pk, Some(sk)),
        None => (keys, None),
    };
    if name.is_empty() || partition_key.is_empty() {
        return Err(format!("index name and partition key are required in `{raw}`"));
    }

    let index = SecondaryIndex::new(name, partition_key);
    Ok(match sort_key.filter(|sk| !sk.is_empty()) {
        Some(sort_key) => index.with_sort_key(sort_key),
        None => index,
    })
}
