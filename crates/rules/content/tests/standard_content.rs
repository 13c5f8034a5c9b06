use std::fs;
use std::sync::Arc;

use rules_content::{ConfigLoader, process_batch, standard_registry};
use rules_core::expression::{of, roll};
use rules_core::{
    DiagnosticKey, HandlerContext, Logger, Origin, PcgRng, PropertyTree, RawModifier,
    ReferenceSpec, Roll, Tooltip,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const SCHEMAS: &str = r#"
[[flat_bonuses]]
top_level_path = "item.damage"
optional_attributes = ["bonus"]
extension = { bonus_attribute = "bonus" }

[flat_bonuses.sub_segments.fire]
optional_attributes = ["dice"]
extension = { dice_attribute = "dice" }

[[flat_bonuses]]
top_level_path = "actor.ac"
required_attributes = ["source"]

[[multipliers]]
top_level_path = "actor.speed"
"#;

/// Loads schemas from disk, assembles the standard registry and runs one
/// mixed batch through it.
#[test]
fn test_schema_file_to_modifier_collection() {
    init_tracing();

    // ================================================================
    // Setup: schemas and live actor properties
    // ================================================================
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("handlers.toml");
    fs::write(&path, SCHEMAS).expect("write schemas");
    let schemas = ConfigLoader::load_schemas(&path).expect("schemas should parse");
    assert_eq!(schemas.flat_bonuses.len(), 2);
    assert_eq!(schemas.multipliers.len(), 1);

    let actor = Arc::new(PropertyTree::new());
    actor.set("abilities.str.mod", 3);

    let (logger, log) = Logger::collecting();
    let registry = standard_registry(logger.clone(), schemas, Some(actor.clone()))
        .expect("schema paths are distinct");
    assert!(registry.contains("item.damage"));
    assert!(log.is_empty());

    // ================================================================
    // Batch: valid, omitted and invalid descriptors side by side
    // ================================================================
    let rolled = Roll::parse("1d6").expect("valid notation").resolve(&PcgRng, 7);
    let raws = vec![
        RawModifier::new("item.damage", of(2.0))
            .with_attribute("bonus", ReferenceSpec::new("abilities.str.mod", "@str"))
            .with_attribute("name", "Strength"),
        RawModifier::new("item.damage.fire", roll(rolled.clone())).with_attribute("name", "Flame"),
        RawModifier::new("item.damage.Fire", of(1.0)).with_attribute("dice", "2d"),
        RawModifier::new("actor.ac", of(2.0)),
        RawModifier::new("actor.ac", of(-1.0)).with_attribute("source", "curse"),
        RawModifier::new("actor.speed", of(1.0)),
        RawModifier::new("spell.dc", of(1.0)),
    ];
    let context = HandlerContext::new(logger).with_origin(Origin::new("item-1", "Flametongue"));
    let modifiers = process_batch(&registry, context, &raws);

    // ================================================================
    // Results
    // ================================================================
    let fire_total = rolled.total().expect("resolved roll");
    assert_eq!(modifiers.len(), 3);
    assert_eq!(modifiers.sum(), 2.0 + 3.0 + fire_total - 1.0);
    assert_eq!(modifiers.maluses().len(), 1);
    assert_eq!(modifiers.maluses().as_slice()[0].name(), "Flametongue");

    let mut tooltip = Tooltip::new();
    modifiers.add_tooltip_entries(&mut tooltip);
    assert_eq!(tooltip.formula(), "+abs(2 + abilities.str.mod) +1d6 -1");

    assert_eq!(log.count(DiagnosticKey::InvalidDescriptor), 1);
    assert_eq!(log.count(DiagnosticKey::MissingDescriptor), 1);
    assert_eq!(log.count(DiagnosticKey::NoHandler), 1);
    assert_eq!(log.len(), 3);

    // references stay live after building
    actor.set("abilities.str.mod", 5);
    assert_eq!(modifiers.sum(), 2.0 + 5.0 + fire_total - 1.0);
}
