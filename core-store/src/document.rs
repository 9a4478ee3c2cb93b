//! Record id repair
//!
//! Historic exports produced records without stable ids. When a loaded
//! collection contains such records they are assigned ids derived from the
//! load timestamp and their position, and the repaired collection is
//! written back by the caller.

use serde_json::Value;

/// Assign an id to every record that lacks one.
///
/// Returns `true` when any record was changed. Ids are the current Unix
/// millisecond timestamp concatenated with the record's index, which keeps
/// collisions out within one collection without coordinating state.
pub fn ensure_ids(records: &mut [Value]) -> bool {
    let stamp = chrono::Utc::now().timestamp_millis();
    let mut changed = false;

    for (index, record) in records.iter_mut().enumerate() {
        let Value::Object(fields) = record else {
            continue;
        };
        let has_id = matches!(fields.get("id"), Some(Value::String(id)) if !id.is_empty());
        if !has_id {
            fields.insert("id".to_string(), Value::String(format!("{}{}", stamp, index)));
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assigns_ids_to_bare_records() {
        let mut records = vec![json!({"title": "Essay"}), json!({"title": "Quiz"})];

        assert!(ensure_ids(&mut records));
        let first = records[0]["id"].as_str().unwrap();
        let second = records[1]["id"].as_str().unwrap();
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn test_existing_ids_are_untouched() {
        let mut records = vec![json!({"id": "a1", "title": "Essay"})];

        assert!(!ensure_ids(&mut records));
        assert_eq!(records[0]["id"], "a1");
    }

    #[test]
    fn test_empty_and_non_string_ids_are_replaced() {
        let mut records = vec![json!({"id": "", "title": "Essay"}), json!({"id": 7})];

        assert!(ensure_ids(&mut records));
        assert!(records[0]["id"].as_str().unwrap().len() > 1);
        assert!(records[1]["id"].is_string());
    }
}
