use serde::ser::{Serialize, SerializeMap, Serializer};
use ustr::Ustr;

/// User-entered record that has not been submitted yet.
///
/// Fields keep the order in which they were first edited, which is also the key order of
/// the JSON object sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    fields: Vec<(Ustr, String)>,
}

impl Draft {
    pub fn set(&mut self, field: Ustr, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, field: Ustr) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Submit-eligible: exactly `column_count` entries, none of them empty.
    pub fn is_complete(&self, column_count: usize) -> bool {
        self.fields.len() == column_count && self.fields.iter().all(|(_, value)| !value.is_empty())
    }
}

impl Serialize for Draft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

/// One inline input row above the table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRow {
    pub id: u64,
    /// Input text per column.
    pub inputs: Vec<String>,
    /// Per column: highlighted because it was empty on an incomplete submit.
    pub required: Vec<bool>,
    pub draft: Draft,
    /// Request id of the create in flight for this row, if any.
    pub submitted: Option<u64>,
}

impl EditorRow {
    pub fn new(id: u64, column_count: usize) -> Self {
        Self {
            id,
            inputs: vec![String::new(); column_count],
            required: vec![false; column_count],
            draft: Draft::default(),
            submitted: None,
        }
    }

    /// Record an input change: the marker is cleared and the draft updated.
    pub fn edit(&mut self, column: usize, field: Ustr, value: impl Into<String>) {
        let value = value.into();
        if let Some(required) = self.required.get_mut(column) {
            *required = false;
        }
        if let Some(input) = self.inputs.get_mut(column) {
            input.clone_from(&value);
        }
        self.draft.set(field, value);
    }

    /// Mark every empty input as required, returning how many were flagged.
    pub fn flag_empty(&mut self) -> usize {
        let mut flagged = 0;
        for (input, required) in self.inputs.iter().zip(self.required.iter_mut()) {
            if input.is_empty() {
                *required = true;
                flagged += 1;
            }
        }
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Ustr {
        Ustr::from(name)
    }

    #[test]
    fn complete_needs_every_column_non_empty() {
        let mut draft = Draft::default();
        draft.set(field("name"), "Ada");
        assert!(!draft.is_complete(2));

        draft.set(field("surname"), "");
        assert!(!draft.is_complete(2), "empty value does not count");

        draft.set(field("surname"), "Lovelace");
        assert!(draft.is_complete(2));
        assert!(!draft.is_complete(3));
    }

    #[test]
    fn whitespace_counts_as_filled() {
        let mut draft = Draft::default();
        draft.set(field("name"), " ");
        assert!(draft.is_complete(1));
    }

    #[test]
    fn serializes_in_first_edit_order() {
        let mut draft = Draft::default();
        draft.set(field("surname"), "Lovelace");
        draft.set(field("name"), "A");
        draft.set(field("surname"), "Byron");

        let json = serde_json::to_string(&draft).expect("draft serializes");
        assert_eq!(json, r#"{"surname":"Byron","name":"A"}"#);
        assert_eq!(draft.get(field("name")), Some("A"));
    }

    #[test]
    fn editing_clears_required_marker() {
        let mut row = EditorRow::new(1, 2);
        assert_eq!(row.flag_empty(), 2);
        assert_eq!(row.required, vec![true, true]);

        row.edit(0, field("name"), "Ada");
        assert_eq!(row.required, vec![false, true]);
        assert_eq!(row.inputs[0], "Ada");
        assert_eq!(row.flag_empty(), 1);
    }
}
