use serde::Serialize;

/// A value supplied by whoever deploys the template
///
/// Fields are declared in the order they are serialized.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(rename = "Type")]
    parameter_type: String,
}

impl Parameter {
    pub fn new(parameter_type: &str) -> Self {
        Parameter {
            constraint_description: None,
            description: None,
            parameter_type: parameter_type.to_string(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Message shown when the supplied value is rejected
    pub fn constraint_description(mut self, description: &str) -> Self {
        self.constraint_description = Some(description.to_string());
        self
    }

    pub fn parameter_type(&self) -> &str {
        &self.parameter_type
    }
}
