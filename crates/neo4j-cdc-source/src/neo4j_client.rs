//! Neo4j client utilities
//!
//! This module provides utilities for creating Neo4j Graph connections.

use crate::SourceOpts;
use anyhow::{Context, Result};
use neo4rs::{ConfigBuilder, Graph};

/// Create a new Neo4j Graph connection
pub async fn new_neo4j_client(opts: &SourceOpts) -> Result<Graph> {
    tracing::debug!("Connecting to Neo4j at: {}", opts.uri);
    let config = ConfigBuilder::default()
        .uri(&opts.uri)
        .user(opts.username.clone().unwrap_or_else(|| "neo4j".to_string()))
        .password(
            opts.password
                .clone()
                .unwrap_or_else(|| "password".to_string()),
        )
        .db(opts.database.clone().unwrap_or_else(|| "neo4j".to_string()))
        .build()
        .context("Invalid Neo4j connection configuration")?;

    let graph = Graph::connect(config)
        .with_context(|| format!("Failed to connect to Neo4j at {}", opts.uri))?;
    tracing::debug!("Neo4j connection established");
    Ok(graph)
}
