use super::CaptureMode;
use crate::decode;
use crate::error::Result;
use crate::value::ValueMap;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

const EXECUTING_USER: &str = "executingUser";
const AUTHENTICATED_USER: &str = "authenticatedUser";
const CONNECTION_TYPE: &str = "connectionType";
const CONNECTION_CLIENT: &str = "connectionClient";
const CONNECTION_SERVER: &str = "connectionServer";
const DATABASE_NAME: &str = "databaseName";
const CAPTURE_MODE: &str = "captureMode";
const SERVER_ID: &str = "serverId";
const TX_START_TIME: &str = "txStartTime";
const TX_COMMIT_TIME: &str = "txCommitTime";
const TX_METADATA: &str = "txMetadata";

const KNOWN_KEYS: [&str; 11] = [
    EXECUTING_USER,
    AUTHENTICATED_USER,
    CONNECTION_TYPE,
    CONNECTION_CLIENT,
    CONNECTION_SERVER,
    DATABASE_NAME,
    CAPTURE_MODE,
    SERVER_ID,
    TX_START_TIME,
    TX_COMMIT_TIME,
    TX_METADATA,
];

/// Transaction level facts attached to every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executing_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated_user: Option<String>,
    pub connection_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_server: Option<String>,
    pub database_name: String,
    pub capture_mode: CaptureMode,
    pub server_id: String,
    pub tx_start_time: DateTime<FixedOffset>,
    pub tx_commit_time: DateTime<FixedOffset>,
    pub tx_metadata: ValueMap,
    /// Entries the server sent that this client does not know about.
    #[serde(flatten)]
    pub additional_entries: ValueMap,
}

impl Metadata {
    pub fn from_map(map: &ValueMap) -> Result<Self> {
        let capture_mode = CaptureMode::parse(&decode::require_string(map, CAPTURE_MODE)?)?;

        let additional_entries = map
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            executing_user: decode::get_string(map, EXECUTING_USER)?,
            authenticated_user: decode::get_string(map, AUTHENTICATED_USER)?,
            connection_type: decode::require_string(map, CONNECTION_TYPE)?,
            connection_client: decode::get_string(map, CONNECTION_CLIENT)?,
            connection_server: decode::get_string(map, CONNECTION_SERVER)?,
            database_name: decode::get_string(map, DATABASE_NAME)?.unwrap_or_default(),
            capture_mode,
            server_id: decode::require_string(map, SERVER_ID)?,
            tx_start_time: decode::require_timestamp(map, TX_START_TIME)?,
            tx_commit_time: decode::require_timestamp(map, TX_COMMIT_TIME)?,
            tx_metadata: decode::get_map(map, TX_METADATA)?.cloned().unwrap_or_default(),
            additional_entries,
        })
    }
}
