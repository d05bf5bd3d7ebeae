use crate::intrinsic::Expr;
use serde::Serialize;

/// A value exported from the stack once it is deployed
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    value: Expr,
}

impl Output {
    pub fn new(value: Expr) -> Self {
        Output {
            description: None,
            value,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn value(&self) -> &Expr {
        &self.value
    }
}
