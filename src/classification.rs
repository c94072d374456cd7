/*!
Classification attribute codec.

Annotation tools attach a nested `classification` attribute (`{"name": "Tumor", "color": [255, 0, 0]}`) to features.
Point warping tools only cope with scalar columns, so it is split into four flat attributes before flattening
and merged back after reconstruction.
 */
use log::warn;
use serde_json::{json, Map, Value};

use crate::utils;

pub const CLASSIFICATION: &str = "classification";
pub const CLASSIFICATION_NAME: &str = "classification_name";
pub const CLASSIFICATION_COLOR_R: &str = "classification_color_r";
pub const CLASSIFICATION_COLOR_G: &str = "classification_color_g";
pub const CLASSIFICATION_COLOR_B: &str = "classification_color_b";

pub const COLOR_COLUMNS: [&str; 3] = [CLASSIFICATION_COLOR_R, CLASSIFICATION_COLOR_G, CLASSIFICATION_COLOR_B];

/// Parsed classification, `None` when malformed or not a mapping
fn parse(raw: Value) -> Option<Map<String, Value>> {
    let raw = match raw {
        Value::String(text) => match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Ignoring malformed classification {:?} : {}", text, err);
                return None;
            }
        },
        other => other,
    };
    match raw {
        Value::Object(classification) => Some(classification),
        _ => None,
    }
}

/**
Replaces the nested `classification` attribute by `classification_name` and `classification_color_r/g/b`.
No-op if the attribute is absent.
 */
pub fn split(properties: &mut Map<String, Value>) {
    let Some(raw) = properties.shift_remove(CLASSIFICATION) else {
        return;
    };
    let classification = parse(raw);

    let name = classification
        .as_ref()
        .and_then(|c| c.get("name"))
        .cloned()
        .unwrap_or(Value::Null);
    let color = match classification.as_ref().and_then(|c| c.get("color")) {
        Some(Value::Array(color)) if color.len() == 3 => color.clone(),
        _ => vec![Value::Null; 3],
    };

    properties.insert(CLASSIFICATION_NAME.to_string(), name);
    for (column, component) in COLOR_COLUMNS.iter().zip(color) {
        properties.insert(column.to_string(), component);
    }
}

/**
Rebuilds the nested `classification` attribute from the four flat attributes and removes them.
A null name yields no classification at all. No-op if `classification_name` is absent.
 */
pub fn merge(properties: &mut Map<String, Value>) {
    let Some(name) = properties.shift_remove(CLASSIFICATION_NAME) else {
        return;
    };
    let color = COLOR_COLUMNS
        .iter()
        .map(|column| properties.shift_remove(*column).unwrap_or(Value::Null))
        .collect::<Vec<_>>();

    if name.is_null() {
        return;
    }

    let mut classification = Map::new();
    classification.insert("name".to_string(), name);
    match color.iter().map(utils::as_float).collect::<Option<Vec<_>>>() {
        Some(color) => {
            let color = color.iter().map(|c| c.round() as i64).collect::<Vec<_>>();
            classification.insert("color".to_string(), json!(color));
        }
        None => warn!("Classification {} has an incomplete color {:?}, color dropped", classification["name"], color),
    }
    properties.insert(CLASSIFICATION.to_string(), Value::Object(classification));
}
