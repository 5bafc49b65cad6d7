//! Procedure calls against the change data capture API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use cdc_core::{ChangeEvent, ChangeIdentifier, Value, ValueMap};
use cdc_selector::Selector;
use neo4j_types::{bolt_to_value, value_map_to_bolt};
use neo4rs::{BoltList, BoltType, Graph, Query, Row};
use std::time::Duration;

use crate::stream::CdcChangeStream;

/// Columns of a `db.cdc.query` row.
const CHANGE_COLUMNS: [&str; 5] = ["id", "txId", "seq", "metadata", "event"];

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Result of one `query` call.
#[derive(Debug)]
pub struct ChangeBatch {
    /// Decoded changes in stream order. Records that fail to decode are kept
    /// in place as errors.
    pub events: Vec<Result<ChangeEvent>>,
    /// Id to continue from: the last record whose id could be read, or the
    /// server's current id when the batch holds no records.
    pub last_known: ChangeIdentifier,
}

/// Anything that can answer change queries.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    async fn query(&self, from: &ChangeIdentifier) -> Result<ChangeBatch>;
}

/// Client for the `db.cdc.*` procedures.
#[derive(Clone)]
pub struct CdcClient {
    graph: Graph,
    selectors: Vec<Selector>,
    poll_interval: Duration,
}

impl CdcClient {
    /// Create a client. An empty selector list selects every change.
    pub fn new(graph: Graph, selectors: Vec<Selector>) -> Self {
        Self {
            graph,
            selectors,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Delay between queries while streaming finds no changes.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Id of the oldest change still available on the server.
    pub async fn earliest(&self) -> Result<ChangeIdentifier> {
        self.fetch_id("CALL db.cdc.earliest()").await
    }

    /// Id of the most recent committed change.
    pub async fn current(&self) -> Result<ChangeIdentifier> {
        self.fetch_id("CALL db.cdc.current()").await
    }

    async fn fetch_id(&self, statement: &str) -> Result<ChangeIdentifier> {
        let mut result = self
            .graph
            .execute(Query::new(statement.to_string()))
            .await
            .with_context(|| format!("Failed to run {statement}"))?;
        let row = result
            .next()
            .await?
            .ok_or_else(|| anyhow::anyhow!("{statement} returned no rows"))?;
        let record = read_record(&row, &["id"])?;
        Ok(ChangeIdentifier::from_record(&record)?)
    }

    /// Query the changes after `from` that match the configured selectors.
    pub async fn query(&self, from: &ChangeIdentifier) -> Result<ChangeBatch> {
        // Read before querying so nothing committed in between is skipped
        let current = self.current().await?;

        let selectors = self
            .selectors
            .iter()
            .map(|selector| Ok(BoltType::Map(value_map_to_bolt(&selector.as_map())?)))
            .collect::<Result<Vec<_>>>()?;
        tracing::trace!("Subscribing from {from} with selectors {:?}", self.selectors_text());

        let mut list = BoltList::new();
        for selector in selectors {
            list.push(selector);
        }
        let query = Query::new("CALL db.cdc.query($from, $selectors)".to_string())
            .param("from", from.id())
            .param("selectors", BoltType::List(list));

        let mut result = self
            .graph
            .execute(query)
            .await
            .with_context(|| format!("Failed to query changes from {from}"))?;

        let mut records = Vec::new();
        while let Some(row) = result.next().await? {
            records.push(read_record(&row, &CHANGE_COLUMNS));
        }
        tracing::debug!("Received {} change records from {from}", records.len());

        Ok(assemble_batch(records, &self.selectors, current))
    }

    /// Stream changes after `from`, polling while none are available.
    pub fn stream(self, from: ChangeIdentifier) -> CdcChangeStream<CdcClient> {
        let poll_interval = self.poll_interval;
        CdcChangeStream::new(self, from, poll_interval)
    }

    fn selectors_text(&self) -> Vec<String> {
        self.selectors.iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl ChangeSource for CdcClient {
    async fn query(&self, from: &ChangeIdentifier) -> Result<ChangeBatch> {
        CdcClient::query(self, from).await
    }
}

/// Convert the named columns of a row. Absent columns are left out so the
/// decoder reports them as missing fields.
fn read_record(row: &Row, columns: &[&str]) -> Result<ValueMap> {
    let mut record = ValueMap::new();
    for column in columns {
        if let Ok(value) = row.get::<BoltType>(column) {
            let value = bolt_to_value(value)
                .with_context(|| format!("Failed to convert column '{column}'"))?;
            record.insert(column.to_string(), value);
        }
    }
    Ok(record)
}

/// Project `change` through the first selector that matches it. Changes no
/// selector matches are returned unchanged.
pub fn apply_selectors(selectors: &[Selector], change: ChangeEvent) -> ChangeEvent {
    match selectors.iter().find(|selector| selector.matches(&change)) {
        Some(selector) => selector.apply_properties(change),
        None => change,
    }
}

pub(crate) fn assemble_batch(
    records: Vec<Result<ValueMap>>,
    selectors: &[Selector],
    current: ChangeIdentifier,
) -> ChangeBatch {
    let mut last_id = None;
    let mut events = Vec::with_capacity(records.len());

    for record in records {
        let id = match &record {
            Ok(record) => match record.get("id") {
                Some(Value::String(id)) => Some(ChangeIdentifier::new(id.as_str())),
                _ => None,
            },
            Err(_) => None,
        };
        if let Some(id) = &id {
            last_id = Some(id.clone());
        }

        let decoded = record
            .and_then(|record| ChangeEvent::from_record(&record).map_err(anyhow::Error::from));
        match decoded {
            Ok(change) => events.push(Ok(apply_selectors(selectors, change))),
            Err(e) => {
                let position = match id {
                    Some(id) => id.to_string(),
                    None => "with unreadable id".to_string(),
                };
                tracing::warn!("Failed to decode change record {position}: {e:#}");
                events.push(Err(e.context(format!("Failed to decode change record {position}"))));
            }
        }
    }

    let last_known = match last_id {
        Some(id) => id,
        None => {
            tracing::info!("No new changes, last seen change id is {current}");
            current
        }
    };
    ChangeBatch { events, last_known }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node_change, node_change_record};
    use cdc_core::value::value_map;
    use cdc_core::Event;
    use cdc_selector::{NodeSelector, SelectorBuilder};

    fn person_selector() -> Selector {
        NodeSelector::builder()
            .with_labels(["Person"])
            .excluding_properties(["password"])
            .build()
            .into()
    }

    fn after_keys(change: &ChangeEvent) -> Vec<String> {
        let mut keys: Vec<String> = change
            .event
            .after_properties()
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    #[test]
    fn test_first_matching_selector_projects() {
        let selectors = vec![
            NodeSelector::builder()
                .with_labels(["Company"])
                .including_properties(["name"])
                .build()
                .into(),
            person_selector(),
        ];
        let change = apply_selectors(&selectors, node_change("CHANGE-1", "Person"));
        assert_eq!(after_keys(&change), vec!["name"]);
    }

    #[test]
    fn test_unmatched_change_is_unchanged() {
        let original = node_change("CHANGE-1", "Company");
        let change = apply_selectors(&[person_selector()], original.clone());
        assert_eq!(change, original);
        assert_eq!(apply_selectors(&[], original.clone()), original);
    }

    #[test]
    fn test_batch_tracks_last_id() {
        let batch = assemble_batch(
            vec![
                Ok(node_change_record("CHANGE-1", "Person")),
                Ok(node_change_record("CHANGE-2", "Person")),
            ],
            &[person_selector()],
            ChangeIdentifier::new("CURRENT"),
        );
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.last_known, ChangeIdentifier::new("CHANGE-2"));
        let first = batch.events[0].as_ref().unwrap();
        assert!(matches!(first.event, Event::Node(_)));
        assert_eq!(after_keys(first), vec!["name"]);
    }

    #[test]
    fn test_empty_batch_reports_current() {
        let batch = assemble_batch(Vec::new(), &[], ChangeIdentifier::new("CURRENT"));
        assert!(batch.events.is_empty());
        assert_eq!(batch.last_known, ChangeIdentifier::new("CURRENT"));
    }

    #[test]
    fn test_decode_failure_is_per_record() {
        let mut broken = node_change_record("CHANGE-2", "Person");
        broken.insert("txId".to_string(), Value::from("not a number"));

        let batch = assemble_batch(
            vec![
                Ok(node_change_record("CHANGE-1", "Person")),
                Ok(broken),
                Ok(node_change_record("CHANGE-3", "Person")),
            ],
            &[],
            ChangeIdentifier::new("CURRENT"),
        );

        assert!(batch.events[0].is_ok());
        let err = batch.events[1].as_ref().unwrap_err();
        assert!(format!("{err:#}").contains("txId"));
        assert!(batch.events[2].is_ok());
        assert_eq!(batch.last_known, ChangeIdentifier::new("CHANGE-3"));
    }

    #[test]
    fn test_unreadable_id_keeps_previous_position() {
        let batch = assemble_batch(
            vec![
                Ok(node_change_record("CHANGE-1", "Person")),
                Ok(value_map([("seq", 1)])),
            ],
            &[],
            ChangeIdentifier::new("CURRENT"),
        );
        assert!(batch.events[1].is_err());
        assert_eq!(batch.last_known, ChangeIdentifier::new("CHANGE-1"));
    }
}
