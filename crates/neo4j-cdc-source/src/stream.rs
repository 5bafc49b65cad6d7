//! Polling change stream
//!
//! The server has no push API for changes, so streaming repeats `query` from
//! the last known position and sleeps whenever a query comes back empty.

use anyhow::Result;
use async_trait::async_trait;
use cdc_core::{ChangeEvent, ChangeIdentifier};
use futures::Stream;
use std::collections::VecDeque;
use std::time::Duration;

use crate::client::ChangeSource;
use crate::neo4j_checkpoint::CdcCheckpoint;

/// Trait for a stream of changes from Neo4j
#[async_trait]
pub trait ChangeStream: Send {
    /// Get the next change event from the stream
    async fn next(&mut self) -> Option<Result<ChangeEvent>>;

    /// Get the checkpoint of the last change returned by `next`
    fn checkpoint(&self) -> Option<CdcCheckpoint>;
}

/// Change stream over repeated `db.cdc.query` calls.
///
/// `next` never returns `None`: when there are no changes it waits for the
/// poll interval and asks again. A failed query is returned as an error item
/// after one poll interval, and the following call retries from the same
/// position.
pub struct CdcChangeStream<S: ChangeSource> {
    source: S,
    cursor: ChangeIdentifier,
    poll_interval: Duration,
    buffer: VecDeque<Result<ChangeEvent>>,
    last_delivered: Option<CdcCheckpoint>,
}

impl<S: ChangeSource> CdcChangeStream<S> {
    pub fn new(source: S, from: ChangeIdentifier, poll_interval: Duration) -> Self {
        Self {
            source,
            cursor: from,
            poll_interval,
            buffer: VecDeque::new(),
            last_delivered: None,
        }
    }

    /// Position the next query starts from.
    pub fn cursor(&self) -> &ChangeIdentifier {
        &self.cursor
    }

    /// Adapt into a `futures::Stream`.
    pub fn into_stream(self) -> impl Stream<Item = Result<ChangeEvent>> + Send
    where
        S: 'static,
    {
        futures::stream::unfold(self, |mut stream| async move {
            let item = ChangeStream::next(&mut stream).await?;
            Some((item, stream))
        })
    }

    async fn fetch_next_batch(&mut self) -> Result<()> {
        let batch = self.source.query(&self.cursor).await?;
        tracing::debug!(
            "Fetched {} changes from {}, continuing from {}",
            batch.events.len(),
            self.cursor,
            batch.last_known
        );
        self.cursor = batch.last_known;
        if batch.events.is_empty() {
            tokio::time::sleep(self.poll_interval).await;
        } else {
            self.buffer.extend(batch.events);
        }
        Ok(())
    }
}

#[async_trait]
impl<S: ChangeSource> ChangeStream for CdcChangeStream<S> {
    async fn next(&mut self) -> Option<Result<ChangeEvent>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                if let Ok(change) = &item {
                    self.last_delivered = Some(CdcCheckpoint::from_change(change));
                }
                return Some(item);
            }
            if let Err(e) = self.fetch_next_batch().await {
                tokio::time::sleep(self.poll_interval).await;
                return Some(Err(e));
            }
        }
    }

    fn checkpoint(&self) -> Option<CdcCheckpoint> {
        self.last_delivered.clone()
    }
}
