//! Field-level diffs between two serialized ledger records

use serde_json::Value;

use crate::models::Money;

/// Separator between changes in a diff summary
pub const CHANGE_SEPARATOR: &str = "; ";

/// Fields stored as integer paise, shown in rupees
const MONEY_FIELDS: [&str; 7] = [
    "cash",
    "card",
    "paytm",
    "hp_transactions",
    "amount",
    "hpcl_payment",
    "total_outstanding",
];

/// Describe what changed between two serialized records
///
/// Nested objects are walked so changes read as `tanks.hsd1: 1200.0 -> 1100.0`.
/// Returns None when nothing changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    collect_changes(before, after, "", &mut changes);

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(CHANGE_SEPARATOR))
    }
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Render a changed value, in rupees for paise fields
fn format_field(path: &str, value: &Value) -> String {
    let field = path.rsplit('.').next().unwrap_or(path);
    match value.as_i64() {
        Some(paise) if MONEY_FIELDS.contains(&field) => Money::from_paise(paise).to_string(),
        _ => format_value(value),
    }
}

fn collect_changes(before: &Value, after: &Value, prefix: &str, changes: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            for (key, before_val) in before_obj {
                let path = field_path(prefix, key);
                match after_obj.get(key) {
                    Some(after_val) => collect_changes(before_val, after_val, &path, changes),
                    None => changes.push(format!(
                        "{}: {} -> (removed)",
                        path,
                        format_field(&path, before_val)
                    )),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    let path = field_path(prefix, key);
                    changes.push(format!(
                        "{}: (added) -> {}",
                        path,
                        format_field(&path, after_val)
                    ));
                }
            }
        }
        _ if before != after => {
            changes.push(format!(
                "{}: {} -> {}",
                prefix,
                format_field(prefix, before),
                format_field(prefix, after)
            ));
        }
        _ => {}
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_change() {
        let before = json!({"tanks": {"hsd1": 1200.0, "ms1": 400.0}, "manager": "Ravi"});
        let after = json!({"tanks": {"hsd1": 1100.0, "ms1": 400.0}, "manager": "Ravi"});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "tanks.hsd1: 1200.0 -> 1100.0");
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"notes": "x"});
        let after = json!({"total_outstanding": 500000});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("notes: \"x\" -> (removed)"));
        assert!(diff.contains("total_outstanding: (added) -> ₹5000.00"));
    }

    #[test]
    fn test_paise_fields_shown_in_rupees() {
        let before = json!({"collections": {"cash": 250000}, "ms": {"quantity": 30.0}});
        let after = json!({"collections": {"cash": 260050}, "ms": {"quantity": 31.0}});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(
            diff,
            "collections.cash: ₹2500.00 -> ₹2600.50; ms.quantity: 30.0 -> 31.0"
        );
    }

    #[test]
    fn test_no_changes() {
        let value = json!({"a": 1, "b": {"c": 2}});
        assert!(generate_diff(&value, &value).is_none());
    }

    #[test]
    fn test_long_string_truncated() {
        let before = json!({"notes": "a".repeat(100)});
        let after = json!({"notes": "short"});
        assert!(generate_diff(&before, &after).unwrap().contains("...\""));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2 fields}");
    }
}
