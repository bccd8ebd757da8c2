//! dynoquery_cli - command-line reads against a DynamoDB table.

pub mod cli;
pub mod output;
