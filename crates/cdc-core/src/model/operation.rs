use crate::error::{DecodeError, Result};
use serde::Serialize;
use std::fmt;

/// Kind of change applied to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityOperation {
    Create,
    Update,
    Delete,
}

impl EntityOperation {
    /// Wire shorthand: `c`, `u` or `d`.
    pub fn shorthand(&self) -> &'static str {
        match self {
            Self::Create => "c",
            Self::Update => "u",
            Self::Delete => "d",
        }
    }

    /// Parse a wire shorthand, ignoring case.
    pub fn from_shorthand(shorthand: &str) -> Result<Self> {
        match shorthand.to_ascii_lowercase().as_str() {
            "c" => Ok(Self::Create),
            "u" => Ok(Self::Update),
            "d" => Ok(Self::Delete),
            _ => Err(DecodeError::UnknownOperation(shorthand.to_string())),
        }
    }
}

impl fmt::Display for EntityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Kind of entity an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Node,
    Relationship,
}

impl EventType {
    /// Wire shorthand: `n` or `r`.
    pub fn shorthand(&self) -> &'static str {
        match self {
            Self::Node => "n",
            Self::Relationship => "r",
        }
    }

    pub fn from_shorthand(shorthand: &str) -> Result<Self> {
        match shorthand.to_ascii_lowercase().as_str() {
            "n" => Ok(Self::Node),
            "r" => Ok(Self::Relationship),
            _ => Err(DecodeError::UnknownEventType(shorthand.to_string())),
        }
    }
}

/// Server capture mode.
///
/// Under `Diff` only changed properties appear in before/after states, under
/// `Full` every property does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaptureMode {
    Diff,
    Full,
}

impl CaptureMode {
    pub fn parse(mode: &str) -> Result<Self> {
        match mode.to_ascii_uppercase().as_str() {
            "DIFF" => Ok(Self::Diff),
            "FULL" => Ok(Self::Full),
            _ => Err(DecodeError::UnknownCaptureMode(mode.to_string())),
        }
    }
}
