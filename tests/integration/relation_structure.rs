#![allow(missing_docs)]

use rowjson::{
    fixture, Column, Dialect, EncoderConfig, JsonResultEncoder, Literal, Relation, Result,
    ResultEncoder, SourceExpr, Value,
};
use serde_json::json;

fn encode(relation: &Relation, config: &EncoderConfig) -> Result<serde_json::Value> {
    let text = JsonResultEncoder::new().encode_relation_to_string(relation, config)?;
    Ok(serde_json::from_str(&text)?)
}

fn relation_t() -> Relation {
    Relation::new("T")
        .with_attribute("label", "Totals")
        .with_column(Column::new("b").with_attribute("_id", 1).with_attribute("label", "B"))
        .with_column(Column::new("c").with_attribute("_id", 2))
        .with_column(Column::derived(
            "e",
            SourceExpr::symbolic("b + c").with_translation(Dialect::JavaScript, "b + c"),
        ))
        .with_column(Column::new("e/part").with_attribute("label", "hidden"))
}

#[test]
fn derived_column_renders_translated_source() -> Result<()> {
    let doc = encode(&relation_t(), &EncoderConfig::default())?;
    assert_eq!(doc["columns"]["e"], json!({"derived_expression": "$(b + c)"}));
    Ok(())
}

#[test]
fn structure_document_shape() -> Result<()> {
    let doc = encode(&relation_t(), &EncoderConfig::default())?;
    assert_eq!(
        doc,
        json!({
            "$m": {"label": "Totals", "type": "T"},
            "columns": {
                "b": {"label": "B"},
                "c": {},
                "e": {"derived_expression": "$(b + c)"}
            }
        })
    );
    assert!(doc.get("rows").is_none());
    Ok(())
}

#[test]
fn output_follows_declaration_order() -> Result<()> {
    let text = JsonResultEncoder::new()
        .encode_relation_to_string(&relation_t(), &EncoderConfig::default())?;
    let label = text.find("\"label\":\"Totals\"");
    let ty = text.find("\"type\":\"T\"");
    assert!(label < ty);
    let b = text.find("\"b\":");
    let e = text.find("\"e\":");
    assert!(b.is_some() && b < e);
    assert!(!text.contains("e/part"));
    assert!(!text.contains("_id"));
    Ok(())
}

#[test]
fn literal_derived_expression_is_evaluated() -> Result<()> {
    let relation = Relation::new("K")
        .with_column(Column::derived("ten", Literal(Value::Int(10))).with_attribute("unique", true));
    let doc = encode(&relation, &EncoderConfig::default())?;
    assert_eq!(doc["columns"]["ten"], json!({"derived_expression": 10, "unique": true}));
    Ok(())
}

#[test]
fn untranslated_expression_falls_back_to_native() -> Result<()> {
    let relation = Relation::new("S").with_column(Column::derived(
        "m",
        SourceExpr::symbolic("from T select max(b)"),
    ));
    let doc = encode(&relation, &EncoderConfig::default().with_target(Dialect::SqlServer))?;
    assert_eq!(doc["columns"]["m"]["derived_expression"], json!("$(from T select max(b))"));
    Ok(())
}

#[test]
fn fixture_relation_encodes_like_built_relation() -> Result<()> {
    let relation = fixture::relation_from_str(
        r#"{
            "name": "T",
            "attributes": {"label": "Totals"},
            "columns": [
                {"name": "b", "attributes": {"_id": 1, "label": "B"}},
                {"name": "c", "attributes": {"_id": 2}},
                {"name": "e", "derived": {"$expr": "b + c", "translations": {"javascript": "b + c"}}},
                {"name": "e/part", "attributes": {"label": "hidden"}}
            ]
        }"#,
    )?;
    let config = EncoderConfig::default();
    let encoder = JsonResultEncoder::new();
    assert_eq!(
        encoder.encode_relation_to_string(&relation, &config)?,
        encoder.encode_relation_to_string(&relation_t(), &config)?
    );
    Ok(())
}
