//! neo4j-cdc Library
//!
//! Command-line option types shared by the `neo4j-cdc` binary.
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the current change id
//! neo4j-cdc current --uri bolt://localhost:7687
//!
//! # Print every change after the earliest available one
//! neo4j-cdc query --from earliest --pattern "(:Person{+name})"
//!
//! # Stream relationship creations, resuming from a stored checkpoint
//! neo4j-cdc stream --from checkpoint --checkpoint-dir .neo4j-cdc-checkpoints \
//!   --pattern "(:Person)-[:KNOWS]->(:Person)" --operation c
//! ```

use anyhow::Context;
use cdc_core::{ChangeIdentifier, EntityOperation, Value, ValueMap};
use cdc_pattern::{to_selectors, Pattern, PatternFilters};
use cdc_selector::{EntitySelector, Selector, SelectorBuilder};
use clap::Parser;
use neo4j_cdc_source::SourceOpts;
use std::str::FromStr;

pub mod config;

/// Neo4j connection options
#[derive(Parser, Clone, Debug)]
pub struct ConnectionOpts {
    /// Neo4j connection URI
    #[arg(long, default_value = "bolt://localhost:7687", env = "NEO4J_URI")]
    pub uri: String,

    /// Neo4j username (default: neo4j)
    #[arg(long, env = "NEO4J_USERNAME")]
    pub username: Option<String>,

    /// Neo4j password (default: password)
    #[arg(long, env = "NEO4J_PASSWORD")]
    pub password: Option<String>,

    /// Neo4j database (default: neo4j)
    #[arg(long, env = "NEO4J_DATABASE")]
    pub database: Option<String>,
}

impl From<&ConnectionOpts> for SourceOpts {
    fn from(opts: &ConnectionOpts) -> Self {
        Self {
            uri: opts.uri.clone(),
            database: opts.database.clone(),
            username: opts.username.clone(),
            password: opts.password.clone(),
        }
    }
}

/// Which changes to select
#[derive(Parser, Clone, Debug, Default)]
pub struct SelectorOpts {
    /// Pattern selecting changes, e.g. "(:Person{id: 5, -password})" (repeatable)
    #[arg(long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Only select changes of this operation (c, u or d)
    #[arg(long, value_parser = parse_operation)]
    pub operation: Option<EntityOperation>,

    /// Only select changes touching every one of these properties
    #[arg(long, value_delimiter = ',', value_name = "PROPERTIES")]
    pub changes_to: Vec<String>,

    /// Only select changes made by this executing user
    #[arg(long)]
    pub executing_user: Option<String>,

    /// Only select changes made by this authenticated user
    #[arg(long)]
    pub authenticated_user: Option<String>,

    /// Only select transactions carrying this metadata entry (repeatable)
    #[arg(long = "tx-metadata", value_name = "KEY=VALUE", value_parser = parse_tx_metadata_entry)]
    pub tx_metadata: Vec<(String, Value)>,
}

impl SelectorOpts {
    /// Filters given with the decoration options.
    pub fn filters(&self) -> PatternFilters {
        PatternFilters {
            operation: self.operation,
            changes_to: self.changes_to.iter().cloned().collect(),
            executing_user: self.executing_user.clone(),
            authenticated_user: self.authenticated_user.clone(),
            tx_metadata: self.tx_metadata.iter().cloned().collect::<ValueMap>(),
        }
    }

    /// Build the selectors to query with.
    ///
    /// Decorations apply to every pattern. Without patterns they form a
    /// single entity selector, and with no options at all every change is
    /// selected.
    pub fn selectors(&self) -> anyhow::Result<Vec<Selector>> {
        let filters = self.filters();

        if self.patterns.is_empty() {
            if filters == PatternFilters::default() {
                return Ok(Vec::new());
            }
            let mut builder = EntitySelector::builder()
                .with_changes_to(filters.changes_to)
                .with_tx_metadata(filters.tx_metadata);
            if let Some(operation) = filters.operation {
                builder = builder.with_operation(operation);
            }
            if let Some(user) = filters.executing_user {
                builder = builder.with_executing_user(user);
            }
            if let Some(user) = filters.authenticated_user {
                builder = builder.with_authenticated_user(user);
            }
            return Ok(vec![builder.build().into()]);
        }

        let mut patterns = Vec::new();
        for expression in &self.patterns {
            let parsed = Pattern::parse(expression)?;
            patterns.extend(
                parsed
                    .into_iter()
                    .map(|pattern| pattern.with_filters(filters.clone())),
            );
        }
        Ok(to_selectors(&patterns))
    }
}

/// Where to start reading changes
#[derive(Clone, Debug, PartialEq)]
pub enum StartPosition {
    Earliest,
    Current,
    /// Resume from the stored checkpoint
    Checkpoint,
    Id(ChangeIdentifier),
}

impl FromStr for StartPosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" => anyhow::bail!("Empty start position"),
            "earliest" => Ok(Self::Earliest),
            "current" => Ok(Self::Current),
            "checkpoint" => Ok(Self::Checkpoint),
            _ => Ok(Self::Id(ChangeIdentifier::new(s))),
        }
    }
}

fn parse_operation(s: &str) -> anyhow::Result<EntityOperation> {
    Ok(EntityOperation::from_shorthand(s)?)
}

/// Parse a `key=value` transaction metadata entry.
///
/// The value is read as a boolean, integer or float literal when it is one
/// and as a string otherwise. Quotes around a string value are removed.
pub fn parse_tx_metadata_entry(s: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("Invalid tx metadata entry '{s}', expected KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid tx metadata entry '{s}': empty key");
    }
    Ok((key.to_string(), parse_literal(value.trim())))
}

fn parse_literal(value: &str) -> Value {
    if value.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = value.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = value.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    let unquoted = ['\'', '"'].iter().find_map(|quote| {
        value
            .strip_prefix(*quote)
            .and_then(|rest| rest.strip_suffix(*quote))
    });
    Value::String(unquoted.unwrap_or(value).to_string())
}
