use serde::Serialize;
use serde_json::{Map, Value};

/// A named template together with the values bound to it.
///
/// Bindings are kept in a sorted map, so two views built from equal bundles
/// compare equal and serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    template: &'static str,
    bindings: Map<String, Value>,
}

impl View {
    pub fn new(template: &'static str, bindings: Map<String, Value>) -> Self {
        Self { template, bindings }
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn bindings(&self) -> &Map<String, Value> {
        &self.bindings
    }

    pub fn binding(&self, slot: &str) -> Option<&Value> {
        self.bindings.get(slot)
    }

    pub fn into_parts(self) -> (&'static str, Map<String, Value>) {
        (self.template, self.bindings)
    }
}

/// Fields submitted with the request, in the order they arrived.
///
/// Query parameters for reads, the urlencoded body for form posts. Repeated
/// names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmittedInput(Vec<(String, String)>);

impl SubmittedInput {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self(fields)
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some("1" | "true" | "on" | "yes"))
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_fields(self) -> Vec<(String, String)> {
        self.0
    }
}

impl From<Vec<(String, String)>> for SubmittedInput {
    fn from(fields: Vec<(String, String)>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_first_value_for_repeated_names() {
        let input = SubmittedInput::new(vec![
            ("tag".into(), "a".into()),
            ("tag".into(), "b".into()),
        ]);
        assert_eq!(input.get("tag"), Some("a"));
        assert_eq!(input.fields().len(), 2);
        assert_eq!(input.get("missing"), None);
    }

    #[test]
    fn flag_accepts_checkbox_values() {
        let input = SubmittedInput::new(vec![
            ("on".into(), "on".into()),
            ("off".into(), "0".into()),
        ]);
        assert!(input.flag("on"));
        assert!(!input.flag("off"));
        assert!(!input.flag("absent"));
    }
}
