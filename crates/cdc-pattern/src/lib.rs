//! Textual change selection patterns.
//!
//! A pattern string describes nodes and relationships the way a graph query
//! would, plus property specs in braces:
//!
//! * `*` keeps every property
//! * `+name` keeps only the named property
//! * `-name` drops the named property
//! * `name: literal` selects entities whose key has that value
//!
//! Each parsed [`Pattern`] compiles into one or more
//! [`Selector`](cdc_selector::Selector)s.

mod error;
mod parser;
mod pattern;

pub use error::{ParseError, ParseResult};
pub use parser::Rule;
pub use pattern::{to_selectors, NodePattern, Pattern, PatternFilters, RelationshipPattern};
