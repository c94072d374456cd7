use serde_json::Value;

/**
Reads a cell as an integer index.
Whole floats are accepted since tabular round trips often turn nullable integer columns into floats (`0.0`).
 */
pub(crate) fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| as_index(&Value::from(f))),
        _ => None,
    }
}

pub(crate) fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_from_int_float_and_text() {
        assert_eq!(as_index(&json!(3)), Some(3));
        assert_eq!(as_index(&json!(3.0)), Some(3));
        assert_eq!(as_index(&json!("2")), Some(2));
        assert_eq!(as_index(&json!(2.5)), None);
        assert_eq!(as_index(&Value::Null), None);
    }

    #[test]
    fn float_from_number_and_text() {
        assert_eq!(as_float(&json!(1)), Some(1.0));
        assert_eq!(as_float(&json!(" 1.25")), Some(1.25));
        assert_eq!(as_float(&json!(true)), None);
    }
}
