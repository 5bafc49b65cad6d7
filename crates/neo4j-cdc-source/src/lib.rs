//! Neo4j change data capture client
//!
//! This crate issues the `db.cdc.earliest`, `db.cdc.current` and
//! `db.cdc.query` procedure calls, decodes the returned rows into
//! [`cdc_core::ChangeEvent`]s and projects them through the configured
//! [`cdc_selector::Selector`]s. Streaming is a polling loop over `query`.

pub mod client;
pub mod neo4j_checkpoint;
pub mod neo4j_client;
pub mod stream;

#[cfg(test)]
mod test_support;

pub use client::{apply_selectors, CdcClient, ChangeBatch, ChangeSource};
pub use neo4j_checkpoint::CdcCheckpoint;
pub use neo4j_client::new_neo4j_client;
pub use stream::{CdcChangeStream, ChangeStream};

/// Neo4j connection options
#[derive(Clone, Debug)]
pub struct SourceOpts {
    pub uri: String,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}
