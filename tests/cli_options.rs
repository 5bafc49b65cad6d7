use cdc_core::{EntityOperation, Value};
use cdc_selector::Selector;
use clap::Parser;
use neo4j_cdc::{ConnectionOpts, SelectorOpts};
use neo4j_cdc_source::SourceOpts;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    connection: ConnectionOpts,

    #[command(flatten)]
    selector: SelectorOpts,
}

fn parse(args: &[&str]) -> TestCli {
    TestCli::try_parse_from(std::iter::once("neo4j-cdc").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_connection_defaults() {
    let cli = parse(&["--uri", "bolt://db:7687", "--database", "movies"]);
    let opts = SourceOpts::from(&cli.connection);

    assert_eq!(opts.uri, "bolt://db:7687");
    assert_eq!(opts.database, Some("movies".to_string()));
}

#[test]
fn test_no_selector_options_select_everything() {
    let cli = parse(&[]);
    assert!(cli.selector.selectors().unwrap().is_empty());
}

#[test]
fn test_decorations_apply_to_every_pattern() {
    let cli = parse(&[
        "--pattern",
        "(:Person)",
        "--pattern",
        "(:Person)-[:KNOWS]->(:Person)",
        "--operation",
        "u",
        "--changes-to",
        "name,email",
        "--tx-metadata",
        "app=billing",
        "--tx-metadata",
        "retries=3",
    ]);

    let selectors = cli.selector.selectors().unwrap();
    assert_eq!(selectors.len(), 2);
    assert!(matches!(selectors[0], Selector::Node(_)));
    assert!(matches!(selectors[1], Selector::Relationship(_)));

    for selector in &selectors {
        let entity = selector.entity();
        assert_eq!(entity.operation(), Some(EntityOperation::Update));
        assert_eq!(entity.changes_to().len(), 2);
        assert_eq!(entity.tx_metadata()["app"], Value::from("billing"));
        assert_eq!(entity.tx_metadata()["retries"], Value::Integer(3));
    }
}

#[test]
fn test_decorations_without_pattern_build_entity_selector() {
    let cli = parse(&["--executing-user", "alice", "--operation", "D"]);

    let selectors = cli.selector.selectors().unwrap();
    assert_eq!(selectors.len(), 1);
    let Selector::Entity(entity) = &selectors[0] else {
        panic!("expected an entity selector, got {:?}", selectors[0]);
    };
    assert_eq!(entity.executing_user(), Some("alice"));
    assert_eq!(entity.operation(), Some(EntityOperation::Delete));
}

#[test]
fn test_duplicate_patterns_collapse() {
    let cli = parse(&["--pattern", "(:Person), (:Person)", "--pattern", "(:Person)"]);
    assert_eq!(cli.selector.selectors().unwrap().len(), 1);
}

#[test]
fn test_invalid_options() {
    let cli = parse(&["--pattern", "(:Person"]);
    assert!(cli.selector.selectors().is_err());

    let args = ["neo4j-cdc", "--operation", "x"];
    assert!(TestCli::try_parse_from(args).is_err());

    let args = ["neo4j-cdc", "--tx-metadata", "novalue"];
    assert!(TestCli::try_parse_from(args).is_err());
}
