//! Pattern string parser built on pest.

use crate::error::{ParseError, ParseResult};
use crate::pattern::{NodePattern, Pattern, PatternFilters, RelationshipPattern};
use cdc_core::{Value, ValueMap};
use cdc_selector::ALL_PROPERTIES;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::BTreeSet;

#[derive(Parser)]
#[grammar = "pattern.pest"]
struct PatternParser;

/// Property specs inside `{...}`.
#[derive(Debug, Default)]
struct PropertySpecs {
    all: bool,
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
    key_filters: ValueMap,
}

impl PropertySpecs {
    fn include_properties(&self) -> BTreeSet<String> {
        if self.all {
            BTreeSet::from([ALL_PROPERTIES.to_string()])
        } else {
            self.include.clone()
        }
    }

    fn has_projection(&self) -> bool {
        self.all || !self.include.is_empty() || !self.exclude.is_empty()
    }
}

struct NodeSpec {
    labels: BTreeSet<String>,
    properties: PropertySpecs,
}

impl NodeSpec {
    fn into_pattern(self) -> NodePattern {
        NodePattern {
            labels: self.labels,
            include_properties: self.properties.include_properties(),
            exclude_properties: self.properties.exclude,
            key_filters: self.properties.key_filters,
            filters: PatternFilters::default(),
        }
    }
}

pub(crate) fn parse_patterns(input: &str) -> ParseResult<Vec<Pattern>> {
    let pairs = PatternParser::parse(Rule::patterns, input)?;

    let mut patterns = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::patterns {
            continue;
        }
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::pattern => patterns.push(parse_pattern(inner)?),
                Rule::EOI => break,
                _ => {}
            }
        }
    }

    Ok(patterns)
}

fn parse_pattern(pair: Pair<Rule>) -> ParseResult<Pattern> {
    let text = pair.as_str().trim().to_string();
    let mut inner = pair.into_inner();

    let first = match inner.next() {
        Some(node) => parse_node(node, &text)?,
        None => return Err(ParseError::semantic(&text, "expected a node")),
    };

    let Some(relationship) = inner.next() else {
        if first.labels.is_empty() {
            return Err(ParseError::semantic(&text, "node pattern needs at least one label"));
        }
        return Ok(Pattern::Node(first.into_pattern()));
    };

    let second = match inner.next() {
        Some(node) => parse_node(node, &text)?,
        None => return Err(ParseError::semantic(&text, "expected an end node")),
    };

    for endpoint in [&first, &second] {
        if endpoint.properties.has_projection() {
            return Err(ParseError::semantic(
                &text,
                "relationship endpoints only accept key filters",
            ));
        }
    }

    parse_relationship(relationship, first.into_pattern(), second.into_pattern(), &text)
        .map(Pattern::Relationship)
}

fn parse_node(pair: Pair<Rule>, text: &str) -> ParseResult<NodeSpec> {
    let mut labels = BTreeSet::new();
    let mut properties = PropertySpecs::default();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::labels => {
                for label in inner.into_inner() {
                    if label.as_rule() == Rule::name {
                        labels.insert(parse_name(label));
                    }
                }
            }
            Rule::properties => {
                properties = parse_properties(inner, text)?;
            }
            _ => {}
        }
    }

    Ok(NodeSpec { labels, properties })
}

/// `left` and `right` are the nodes in reading order.
fn parse_relationship(
    pair: Pair<Rule>,
    left: NodePattern,
    right: NodePattern,
    text: &str,
) -> ParseResult<RelationshipPattern> {
    let mut rel_type = None;
    let mut properties = PropertySpecs::default();
    let mut direction = Rule::outgoing;

    for arrow in pair.into_inner() {
        direction = arrow.as_rule();
        for detail in arrow.into_inner() {
            if detail.as_rule() != Rule::rel_detail {
                continue;
            }
            for part in detail.into_inner() {
                match part.as_rule() {
                    Rule::rel_type => {
                        rel_type = part.into_inner().next().map(parse_name);
                    }
                    Rule::properties => {
                        properties = parse_properties(part, text)?;
                    }
                    _ => {}
                }
            }
        }
    }

    let (start, end) = match direction {
        Rule::incoming => (right, left),
        _ => (left, right),
    };

    Ok(RelationshipPattern {
        rel_type,
        start,
        end,
        bidirectional: direction == Rule::undirected,
        include_properties: properties.include_properties(),
        exclude_properties: properties.exclude,
        key_filters: properties.key_filters,
        filters: PatternFilters::default(),
    })
}

fn parse_properties(pair: Pair<Rule>, text: &str) -> ParseResult<PropertySpecs> {
    let mut specs = PropertySpecs::default();

    for spec in pair.into_inner() {
        match spec.as_rule() {
            Rule::all_properties => specs.all = true,
            Rule::include => {
                if let Some(name) = spec.into_inner().next() {
                    specs.include.insert(parse_name(name));
                }
            }
            Rule::exclude => {
                if let Some(name) = spec.into_inner().next() {
                    specs.exclude.insert(parse_name(name));
                }
            }
            Rule::key_filter => {
                let mut parts = spec.into_inner();
                let (Some(name), Some(literal)) = (parts.next(), parts.next()) else {
                    return Err(ParseError::semantic(text, "incomplete key filter"));
                };
                let name = parse_name(name);
                let value = parse_literal(literal, text)?;
                if specs.key_filters.insert(name.clone(), value).is_some() {
                    return Err(ParseError::semantic(
                        text,
                        format!("key filter on '{name}' given more than once"),
                    ));
                }
            }
            _ => {}
        }
    }

    if specs.all && !specs.include.is_empty() {
        return Err(ParseError::semantic(
            text,
            "'*' cannot be combined with included properties",
        ));
    }

    Ok(specs)
}

fn parse_name(pair: Pair<Rule>) -> String {
    let raw = pair.as_str();
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::quoted_name => inner
            .into_inner()
            .next()
            .map(|quoted| quoted.as_str().replace("``", "`"))
            .unwrap_or_default(),
        _ => raw.to_string(),
    }
}

fn parse_literal(pair: Pair<Rule>, text: &str) -> ParseResult<Value> {
    let Some(inner) = pair.into_inner().next() else {
        return Err(ParseError::semantic(text, "expected a literal"));
    };
    let raw = inner.as_str();

    match inner.as_rule() {
        Rule::boolean => Ok(Value::Boolean(raw.eq_ignore_ascii_case("true"))),
        Rule::integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ParseError::semantic(text, format!("integer {raw} is out of range"))),
        Rule::float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ParseError::semantic(text, format!("invalid float {raw}"))),
        Rule::string => {
            let body = inner.into_inner().next().map(|b| b.as_str()).unwrap_or("");
            unescape(body, text).map(Value::String)
        }
        _ => Err(ParseError::semantic(text, format!("unexpected literal {raw}"))),
    }
}

fn unescape(body: &str, text: &str) -> ParseResult<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                return Err(ParseError::semantic(
                    text,
                    format!("unsupported escape sequence \\{other}"),
                ))
            }
            None => return Err(ParseError::semantic(text, "dangling escape")),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdc_core::value::value_map;

    fn node(expression: &str) -> NodePattern {
        match parse_patterns(expression).unwrap().remove(0) {
            Pattern::Node(node) => node,
            other => panic!("expected a node pattern, got {other:?}"),
        }
    }

    fn relationship(expression: &str) -> RelationshipPattern {
        match parse_patterns(expression).unwrap().remove(0) {
            Pattern::Relationship(rel) => rel,
            other => panic!("expected a relationship pattern, got {other:?}"),
        }
    }

    fn labels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_labels() {
        assert_eq!(node("(:Person)").labels, labels(&["Person"]));
        assert_eq!(
            node("( :Person:Employee )").labels,
            labels(&["Employee", "Person"])
        );
        assert_eq!(node("(:`Legal Entity`)").labels, labels(&["Legal Entity"]));
        assert_eq!(node("(:`a``b`)").labels, labels(&["a`b"]));
    }

    #[test]
    fn test_wildcard_with_exclude() {
        let pattern = node("(:Person{*,-name})");
        assert_eq!(pattern.include_properties, labels(&["*"]));
        assert_eq!(pattern.exclude_properties, labels(&["name"]));
    }

    #[test]
    fn test_named_includes() {
        let pattern = node("(:Person{+id,+name})");
        assert_eq!(pattern.include_properties, labels(&["id", "name"]));
        assert!(pattern.exclude_properties.is_empty());
    }

    #[test]
    fn test_key_filter_literals() {
        let pattern = node(
            r#"(:Item{name: 'it\'s', code: "A\"1", qty: -3, price: 9.5, ratio: 1e3, active: TRUE})"#,
        );
        assert_eq!(
            pattern.key_filters,
            value_map([
                ("name", Value::from("it's")),
                ("code", Value::from("A\"1")),
                ("qty", Value::from(-3)),
                ("price", Value::from(9.5)),
                ("ratio", Value::from(1000.0)),
                ("active", Value::from(true)),
            ])
        );
    }

    #[test]
    fn test_directions() {
        let outgoing = relationship("(:Person)-[:WORKS_FOR]->(:Company)");
        assert!(!outgoing.bidirectional);
        assert_eq!(outgoing.start.labels, labels(&["Person"]));
        assert_eq!(outgoing.end.labels, labels(&["Company"]));
        assert_eq!(outgoing.rel_type.as_deref(), Some("WORKS_FOR"));

        let incoming = relationship("(:Company)<-[:WORKS_FOR]-(:Person)");
        assert!(!incoming.bidirectional);
        assert_eq!(incoming.start.labels, labels(&["Person"]));
        assert_eq!(incoming.end.labels, labels(&["Company"]));

        let undirected = relationship("(:Person)-[:WORKS_FOR]-(:Company)");
        assert!(undirected.bidirectional);
    }

    #[test]
    fn test_relationship_without_type_or_labels() {
        let rel = relationship("()-[]->()");
        assert_eq!(rel.rel_type, None);
        assert!(rel.start.labels.is_empty());
        assert!(rel.end.labels.is_empty());

        let rel = relationship("(:A)-->(:B)");
        assert_eq!(rel.rel_type, None);
    }

    #[test]
    fn test_relationship_properties_and_endpoint_keys() {
        let rel = relationship("(:Person{id: 1})-[:KNOWS{since: 2020, -note}]->(:Person{id: 2})");
        assert_eq!(rel.key_filters, value_map([("since", 2020)]));
        assert_eq!(rel.exclude_properties, labels(&["note"]));
        assert_eq!(rel.start.key_filters, value_map([("id", 1)]));
        assert_eq!(rel.end.key_filters, value_map([("id", 2)]));
    }

    #[test]
    fn test_multiple_patterns() {
        let patterns = parse_patterns("(:A), (:B)-[:T]->(:C) ,(:D{+x})").unwrap();
        assert_eq!(patterns.len(), 3);
        assert!(matches!(patterns[1], Pattern::Relationship(_)));
    }

    #[test]
    fn test_syntax_errors() {
        for input in ["", "(:Person", "(:Person{+})", "(:Person{name})", "(:A)-[:T]->", "Person"] {
            assert!(
                matches!(parse_patterns(input), Err(ParseError::Syntax(_))),
                "{input:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_semantic_errors() {
        for input in [
            "()",
            "(:Person{*,+name})",
            "(:Person{id: 1, id: 2})",
            "(:A{+x})-[:T]->(:B)",
            "(:A)-[:T]->(:B{-y})",
            r"(:A{name: 'a\qb'})",
        ] {
            assert!(
                matches!(parse_patterns(input), Err(ParseError::Semantic { .. })),
                "{input:?} should be a semantic error"
            );
        }
    }
}
