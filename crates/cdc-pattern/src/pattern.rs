use crate::error::ParseResult;
use cdc_core::{EntityOperation, ValueMap};
use cdc_selector::{
    NodeSelector, RelationshipNodeSelector, RelationshipSelector, Selector, SelectorBuilder,
};
use std::collections::BTreeSet;

/// Filters that do not come from the pattern text.
///
/// They are attached to a parsed pattern with the `with_*` methods on
/// [`Pattern`] and copied into every selector the pattern produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternFilters {
    pub operation: Option<EntityOperation>,
    pub changes_to: BTreeSet<String>,
    pub executing_user: Option<String>,
    pub authenticated_user: Option<String>,
    pub tx_metadata: ValueMap,
}

impl PatternFilters {
    fn apply<B: SelectorBuilder>(&self, builder: B) -> B {
        let mut builder = builder
            .with_changes_to(self.changes_to.iter().cloned())
            .with_tx_metadata(self.tx_metadata.clone());
        if let Some(operation) = self.operation {
            builder = builder.with_operation(operation);
        }
        if let Some(user) = &self.executing_user {
            builder = builder.with_executing_user(user.clone());
        }
        if let Some(user) = &self.authenticated_user {
            builder = builder.with_authenticated_user(user.clone());
        }
        builder
    }
}

/// `(:Label{...})`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePattern {
    pub(crate) labels: BTreeSet<String>,
    pub(crate) key_filters: ValueMap,
    pub(crate) include_properties: BTreeSet<String>,
    pub(crate) exclude_properties: BTreeSet<String>,
    pub(crate) filters: PatternFilters,
}

impl NodePattern {
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn key_filters(&self) -> &ValueMap {
        &self.key_filters
    }

    pub fn include_properties(&self) -> &BTreeSet<String> {
        &self.include_properties
    }

    pub fn exclude_properties(&self) -> &BTreeSet<String> {
        &self.exclude_properties
    }

    fn to_selector(&self) -> Selector {
        let builder = NodeSelector::builder()
            .with_labels(self.labels.iter().cloned())
            .with_key(self.key_filters.clone())
            .including_properties(self.include_properties.iter().cloned())
            .excluding_properties(self.exclude_properties.iter().cloned());
        self.filters.apply(builder).build().into()
    }

    fn as_endpoint(&self) -> RelationshipNodeSelector {
        RelationshipNodeSelector::builder()
            .with_labels(self.labels.iter().cloned())
            .with_key(self.key_filters.clone())
            .build()
    }
}

/// `(:A)-[:TYPE{...}]->(:B)`, or `-[...]-` when `bidirectional`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub(crate) rel_type: Option<String>,
    pub(crate) start: NodePattern,
    pub(crate) end: NodePattern,
    pub(crate) bidirectional: bool,
    pub(crate) key_filters: ValueMap,
    pub(crate) include_properties: BTreeSet<String>,
    pub(crate) exclude_properties: BTreeSet<String>,
    pub(crate) filters: PatternFilters,
}

impl RelationshipPattern {
    pub fn rel_type(&self) -> Option<&str> {
        self.rel_type.as_deref()
    }

    pub fn start(&self) -> &NodePattern {
        &self.start
    }

    pub fn end(&self) -> &NodePattern {
        &self.end
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn key_filters(&self) -> &ValueMap {
        &self.key_filters
    }

    pub fn include_properties(&self) -> &BTreeSet<String> {
        &self.include_properties
    }

    pub fn exclude_properties(&self) -> &BTreeSet<String> {
        &self.exclude_properties
    }

    fn selector(&self, start: &NodePattern, end: &NodePattern) -> Selector {
        let mut builder = RelationshipSelector::builder()
            .with_start(start.as_endpoint())
            .with_end(end.as_endpoint())
            .with_key(self.key_filters.clone())
            .including_properties(self.include_properties.iter().cloned())
            .excluding_properties(self.exclude_properties.iter().cloned());
        if let Some(rel_type) = &self.rel_type {
            builder = builder.with_type(rel_type.clone());
        }
        self.filters.apply(builder).build().into()
    }

    /// One selector, or two for a bidirectional pattern with distinct
    /// endpoints.
    fn to_selectors(&self) -> Vec<Selector> {
        let mut selectors = vec![self.selector(&self.start, &self.end)];
        if self.bidirectional {
            let reversed = self.selector(&self.end, &self.start);
            if !selectors.contains(&reversed) {
                selectors.push(reversed);
            }
        }
        selectors
    }
}

/// One parsed clause of a pattern string.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Node(NodePattern),
    Relationship(RelationshipPattern),
}

impl Pattern {
    /// Parse a pattern string. Comma separated clauses yield one pattern each.
    ///
    /// ```
    /// use cdc_pattern::Pattern;
    ///
    /// let patterns = Pattern::parse("(:Person)-[:KNOWS]-(:Person), (:Company)").unwrap();
    /// assert_eq!(patterns.len(), 2);
    /// ```
    pub fn parse(expression: &str) -> ParseResult<Vec<Pattern>> {
        crate::parser::parse_patterns(expression)
    }

    pub fn filters(&self) -> &PatternFilters {
        match self {
            Self::Node(p) => &p.filters,
            Self::Relationship(p) => &p.filters,
        }
    }

    fn decorate(mut self, update: impl FnOnce(&mut PatternFilters)) -> Self {
        match &mut self {
            Self::Node(p) => update(&mut p.filters),
            Self::Relationship(p) => update(&mut p.filters),
        }
        self
    }

    pub fn with_operation(self, operation: EntityOperation) -> Self {
        self.decorate(|f| f.operation = Some(operation))
    }

    pub fn with_changes_to<I, S>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let changes_to = properties.into_iter().map(Into::into).collect();
        self.decorate(|f| f.changes_to = changes_to)
    }

    pub fn with_executing_user(self, user: impl Into<String>) -> Self {
        let user = user.into();
        self.decorate(|f| f.executing_user = Some(user))
    }

    pub fn with_authenticated_user(self, user: impl Into<String>) -> Self {
        let user = user.into();
        self.decorate(|f| f.authenticated_user = Some(user))
    }

    pub fn with_tx_metadata(self, metadata: ValueMap) -> Self {
        self.decorate(|f| f.tx_metadata = metadata)
    }

    /// Replace every decoration at once.
    pub fn with_filters(self, filters: PatternFilters) -> Self {
        self.decorate(|f| *f = filters)
    }

    pub fn to_selectors(&self) -> Vec<Selector> {
        match self {
            Self::Node(p) => vec![p.to_selector()],
            Self::Relationship(p) => p.to_selectors(),
        }
    }
}

/// Selectors for several patterns, without duplicates, in pattern order.
pub fn to_selectors(patterns: &[Pattern]) -> Vec<Selector> {
    let mut selectors: Vec<Selector> = Vec::new();
    for selector in patterns.iter().flat_map(Pattern::to_selectors) {
        if !selectors.contains(&selector) {
            selectors.push(selector);
        }
    }
    selectors
}
