#![allow(missing_docs)]

use rowjson::{
    Column, ColumnMapping, Dialect, EncodeError, EncoderConfig, JsonResultEncoder, MemoryCursor,
    Result, ResultColumn, ResultEncoder, SourceExpr, Value, ValueMap,
};
use serde_json::json;
use time::macros::{date, datetime};

fn encode(cursor: &mut MemoryCursor, config: &EncoderConfig) -> Result<String> {
    JsonResultEncoder::new().encode_result_to_string(cursor, config)
}

fn attributes(entries: &[(&str, Value)]) -> ValueMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn supplier_parts() -> MemoryCursor {
    MemoryCursor::new(vec![
        ColumnMapping::new(Column::new("a").with_attribute("_id", 0)),
        ColumnMapping::new(
            Column::new("b")
                .with_attribute("m1", "abc")
                .with_attribute("m2", Value::Null),
        )
        .with_computed("m2"),
    ])
    .with_source_table("T")
    .with_row(vec![
        ResultColumn::new(1),
        ResultColumn::new(2).with_metadata("m1", "abc").with_metadata("m2", 5),
    ])
    .with_row(vec![
        ResultColumn::new(3),
        ResultColumn::new(4).with_metadata("m2", Value::Null),
    ])
}

#[test]
fn full_envelope_with_cell_overrides() -> Result<()> {
    let text = encode(&mut supplier_parts(), &EncoderConfig::default())?;
    assert_eq!(
        text,
        concat!(
            "{\n",
            "\"$m\":{\n  \"type\":\"T\"\n},\n",
            "\"columns\":{\n  \"a\":{},\n  \"b\":{\n    \"m1\":\"abc\"\n  }\n},\n",
            "\"rows\":[\n",
            "  [1, {\"$v\":2, \"$m\":{\"m2\":5}}],\n",
            "  [3, {\"$v\":4, \"$m\":{\"m2\":null}}]\n",
            "]\n",
            "}"
        )
    );
    let parsed: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(parsed["rows"][0][1], json!({"$v": 2, "$m": {"m2": 5}}));
    Ok(())
}

#[test]
fn first_section_has_no_leading_separator() -> Result<()> {
    let mut cursor = MemoryCursor::new(vec![ColumnMapping::new(Column::new("a"))])
        .with_row(vec![ResultColumn::new(true)]);
    let text = encode(&mut cursor, &EncoderConfig::default())?;
    assert_eq!(text, "{\n\"columns\":{\n  \"a\":{}\n},\n\"rows\":[\n  [true]\n]\n}");
    Ok(())
}

#[test]
fn rows_follow_metadata_directly_without_columns() -> Result<()> {
    let mut cursor = MemoryCursor::new(Vec::new())
        .with_attributes(attributes(&[("label", Value::from("Parts"))]))
        .with_row(Vec::new());
    let text = encode(&mut cursor, &EncoderConfig::default().with_indent(0))?;
    assert_eq!(text, "{\n\"$m\":{\n\"label\":\"Parts\"\n},\n\"rows\":[\n[]\n]\n}");
    serde_json::from_str::<serde_json::Value>(&text)?;
    Ok(())
}

#[test]
fn empty_result_has_no_sections() -> Result<()> {
    let text = encode(&mut MemoryCursor::default(), &EncoderConfig::default())?;
    assert_eq!(text, "{\n}");
    let parsed: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(parsed, json!({}));
    Ok(())
}

#[test]
fn zero_rows_omit_rows_key() -> Result<()> {
    let mut cursor = MemoryCursor::new(vec![ColumnMapping::new(Column::new("a"))]);
    let text = encode(&mut cursor, &EncoderConfig::default())?;
    let parsed: serde_json::Value = serde_json::from_str(&text)?;
    assert!(parsed.get("rows").is_none());
    assert!(parsed.get("columns").is_some());
    Ok(())
}

#[test]
fn structure_only_never_has_rows() -> Result<()> {
    let config = EncoderConfig::default().with_structure_only(true);
    let text = encode(&mut supplier_parts(), &config)?;
    let parsed: serde_json::Value = serde_json::from_str(&text)?;
    assert!(parsed.get("rows").is_none());
    assert_eq!(parsed["$m"], json!({"type": "T"}));
    assert_eq!(parsed["columns"]["b"], json!({"m1": "abc"}));
    Ok(())
}

#[test]
fn rows_only_matches_rows_field() -> Result<()> {
    let full: serde_json::Value =
        serde_json::from_str(&encode(&mut supplier_parts(), &EncoderConfig::default())?)?;
    let rows_only = encode(
        &mut supplier_parts(),
        &EncoderConfig::default().with_rows_only(true),
    )?;
    let rows: serde_json::Value = serde_json::from_str(&rows_only)?;
    assert_eq!(rows, full["rows"]);
    assert!(rows_only.starts_with('['));
    Ok(())
}

#[test]
fn rows_only_without_rows_is_empty_array() -> Result<()> {
    let mut cursor = MemoryCursor::new(vec![ColumnMapping::new(Column::new("a"))]);
    let text = encode(&mut cursor, &EncoderConfig::default().with_rows_only(true))?;
    assert_eq!(text, "[]");
    Ok(())
}

#[test]
fn both_flags_produce_nothing() -> Result<()> {
    let config = EncoderConfig::default()
        .with_rows_only(true)
        .with_structure_only(true);
    assert_eq!(encode(&mut supplier_parts(), &config)?, "");
    Ok(())
}

#[test]
fn declared_type_wins_over_source_table() -> Result<()> {
    let mut cursor = MemoryCursor::new(Vec::new())
        .with_attributes(attributes(&[("type", Value::from("Supplier"))]))
        .with_source_table("S");
    let parsed: serde_json::Value =
        serde_json::from_str(&encode(&mut cursor, &EncoderConfig::default())?)?;
    assert_eq!(parsed["$m"]["type"], json!("Supplier"));
    Ok(())
}

#[test]
fn header_expressions_render_in_target_dialect() -> Result<()> {
    let column = Column::new("a").with_attribute(
        "visible",
        Value::expr(SourceExpr::symbolic("b <> 0").with_translation(Dialect::JavaScript, "b != 0")),
    );
    let mut cursor = MemoryCursor::new(vec![ColumnMapping::new(column)]);
    let js: serde_json::Value =
        serde_json::from_str(&encode(&mut cursor.clone(), &EncoderConfig::default())?)?;
    assert_eq!(js["columns"]["a"]["visible"], json!("$(b != 0)"));
    let pg: serde_json::Value = serde_json::from_str(&encode(
        &mut cursor,
        &EncoderConfig::default().with_target(Dialect::Postgresql),
    )?)?;
    assert_eq!(pg["columns"]["a"]["visible"], json!("$(b <> 0)"));
    Ok(())
}

#[test]
fn temporal_cells() -> Result<()> {
    let mut cursor = MemoryCursor::new(vec![
        ColumnMapping::new(Column::new("at")),
        ColumnMapping::new(Column::new("on")),
    ])
    .with_row(vec![
        ResultColumn::new(datetime!(2022-01-05 08:30:00 UTC)),
        ResultColumn::new(date!(2022 - 01 - 05)),
    ]);
    let text = encode(&mut cursor, &EncoderConfig::default().with_rows_only(true))?;
    assert_eq!(text, "[\n  [\"2022-01-05 08:30:00.0\", \"2022-01-05\"]\n]\n");
    Ok(())
}

#[test]
fn short_row_is_an_error() {
    let mut cursor = MemoryCursor::new(vec![
        ColumnMapping::new(Column::new("a")),
        ColumnMapping::new(Column::new("b")),
    ])
    .with_row(vec![ResultColumn::new(1)]);
    let err = encode(&mut cursor, &EncoderConfig::default()).unwrap_err();
    assert!(matches!(err, EncodeError::MissingCell { row: 0, column: 1 }));
}
