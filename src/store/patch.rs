use serde::Serialize;
use serde_json::{Map, Value};

use super::StoreError;

/// A partial update of one document.
///
/// `set` replaces top-level fields; `append` pushes onto array fields without
/// reading them first, so concurrent log appends do not overwrite each other;
/// `unset` removes fields. A store applies a whole patch in one write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Patch {
    set: Map<String, Value>,
    append: Vec<(String, Value)>,
    unset: Vec<String>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: Value) -> &mut Self {
        self.set.insert(field.to_string(), value);
        self
    }

    /// Set the field only when a value is present
    pub fn set_some(&mut self, field: &str, value: Option<Value>) -> &mut Self {
        if let Some(value) = value {
            self.set(field, value);
        }
        self
    }

    pub fn append(&mut self, field: &str, value: Value) -> &mut Self {
        self.append.push((field.to_string(), value));
        self
    }

    /// Remove a field from the stored document
    pub fn unset(&mut self, field: &str) -> &mut Self {
        self.unset.push(field.to_string());
        self
    }

    /// Merge the fields of a serialized object into `set`
    pub fn merge_object(&mut self, object: Value) -> &mut Self {
        if let Value::Object(fields) = object {
            self.set.extend(fields);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.set.get(field)
    }

    pub fn appended(&self, field: &str) -> impl Iterator<Item = &Value> + '_ {
        let field = field.to_string();
        self.append
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.set
            .keys()
            .map(String::as_str)
            .chain(self.append.iter().map(|(f, _)| f.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.append.is_empty() && self.unset.is_empty()
    }

    /// Apply to a stored document in place
    pub fn apply_to(&self, document: &mut Value) -> Result<(), StoreError> {
        let object = document
            .as_object_mut()
            .ok_or_else(|| StoreError::Corrupt("document is not a JSON object".to_string()))?;

        for field in &self.unset {
            object.remove(field);
        }

        for (field, value) in &self.set {
            object.insert(field.clone(), value.clone());
        }

        for (field, value) in &self.append {
            let slot = object
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(value.clone()),
                Value::Null => *slot = Value::Array(vec![value.clone()]),
                _ => {
                    return Err(StoreError::Corrupt(format!(
                        "cannot append to non-array field '{field}'"
                    )))
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_replaces_and_append_pushes() {
        let mut doc = json!({"name": "Asha", "mainLogs": [{"remark": "first"}]});
        let mut patch = Patch::new();
        patch
            .set("name", json!("Asha Rao"))
            .append("mainLogs", json!({"remark": "second"}))
            .append("igmsLogs", json!({"remark": "new channel"}));

        patch.apply_to(&mut doc).unwrap();

        assert_eq!(doc["name"], "Asha Rao");
        assert_eq!(doc["mainLogs"].as_array().unwrap().len(), 2);
        assert_eq!(doc["mainLogs"][0]["remark"], "first");
        assert_eq!(doc["igmsLogs"][0]["remark"], "new channel");
    }

    #[test]
    fn append_onto_scalar_is_corruption() {
        let mut doc = json!({"mainLogs": "oops"});
        let mut patch = Patch::new();
        patch.append("mainLogs", json!({}));
        assert!(matches!(patch.apply_to(&mut doc), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn unset_removes_the_field() {
        let mut doc = json!({"ombudsmanComplaintNumber": "OMB-1", "name": "Asha"});
        let mut patch = Patch::new();
        patch
            .unset("ombudsmanComplaintNumber")
            .set("ombudsmanComplaintNo", json!("OMB-2"));

        patch.apply_to(&mut doc).unwrap();

        assert_eq!(doc, json!({"ombudsmanComplaintNo": "OMB-2", "name": "Asha"}));
        assert!(!patch.is_empty());
    }

    #[test]
    fn set_some_skips_absent_values() {
        let mut patch = Patch::new();
        patch.set_some("reason", None).set_some("mode", Some(json!("online")));
        assert!(patch.get("reason").is_none());
        assert_eq!(patch.get("mode"), Some(&json!("online")));
        assert_eq!(patch.fields().collect::<Vec<_>>(), vec!["mode"]);
    }
}
