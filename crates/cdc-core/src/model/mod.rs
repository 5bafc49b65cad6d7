//! Typed change data capture model.
//!
//! All types here are immutable value objects produced by decoding a server
//! record. They are `Send + Sync` and can be shared freely.

mod event;
mod identifier;
mod metadata;
mod operation;
mod state;

pub use event::{ChangeEvent, Event, Node, NodeEvent, NodeKeys, RelationshipEvent};
pub use identifier::ChangeIdentifier;
pub use metadata::Metadata;
pub use operation::{CaptureMode, EntityOperation, EventType};
pub use state::{EntityState, NodeState, RelationshipState};
