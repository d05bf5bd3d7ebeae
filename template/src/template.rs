use crate::error::{ConstructionError, Error, Result};
use crate::intrinsic::{Expr, LogicalId, Reference};
use crate::output::Output;
use crate::parameter::Parameter;
use crate::resource::Resource;
use serde::Serialize;
use std::collections::BTreeMap;

/// The whole CloudFormation document
///
/// Sections are kept in sorted maps, so the serialized output is byte-for-byte
/// stable for the same set of entities no matter in which order they were added.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<LogicalId, Output>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<LogicalId, Parameter>,

    resources: BTreeMap<LogicalId, Resource>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    pub fn add_parameter(&mut self, id: &str, parameter: Parameter) -> Result<LogicalId> {
        let id = self.new_id(id)?;
        self.parameters.insert(id.clone(), parameter);
        Ok(id)
    }

    /// Declare a resource
    ///
    /// Every entity the resource refers to must have been added before.
    pub fn add_resource(&mut self, id: &str, resource: impl Into<Resource>) -> Result<LogicalId> {
        let id = self.new_id(id)?;
        let resource = resource.into();
        self.check_references(&id, &resource.expressions())?;
        self.resources.insert(id.clone(), resource);
        Ok(id)
    }

    pub fn add_output(&mut self, id: &str, output: Output) -> Result<LogicalId> {
        let id = LogicalId::new(id)?;

        if self.outputs.contains_key(&id) {
            return Err(ConstructionError::DuplicateLogicalId(id.to_string()).into());
        }

        self.check_references(&id, &[output.value()])?;
        self.outputs.insert(id.clone(), output);
        Ok(id)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&LogicalId, &Parameter)> {
        self.parameters.iter()
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter()
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&LogicalId, &Output)> {
        self.outputs.iter()
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Pretty-printed JSON with four-space indentation
    pub fn to_json(&self) -> Result<String> {
        let serialization_error = |message: String| Error::Serialization {
            format: "json",
            message,
        };

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

        self.serialize(&mut serializer)
            .map_err(|e| serialization_error(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| serialization_error(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| Error::Serialization {
            format: "yaml",
            message: e.to_string(),
        })
    }

    /// Parameters and resources share one namespace
    fn new_id(&self, id: &str) -> Result<LogicalId, ConstructionError> {
        let id = LogicalId::new(id)?;

        if self.parameters.contains_key(&id) || self.resources.contains_key(&id) {
            return Err(ConstructionError::DuplicateLogicalId(id.to_string()));
        }

        Ok(id)
    }

    fn check_references(
        &self,
        referrer: &LogicalId,
        expressions: &[&Expr],
    ) -> Result<(), ConstructionError> {
        for reference in expressions.iter().flat_map(|e| e.references()) {
            let target = reference.target();
            let is_resource = self.resources.contains_key(target);
            let is_parameter = self.parameters.contains_key(target);

            match reference {
                Reference::Ref(_) if is_resource || is_parameter => {}

                Reference::GetAtt(_, _) if is_resource => {}

                Reference::GetAtt(_, attribute) if is_parameter => {
                    return Err(ConstructionError::AttributeOfNonResource {
                        referrer: referrer.to_string(),
                        target: target.to_string(),
                        attribute: attribute.to_string(),
                    });
                }

                _ => {
                    return Err(ConstructionError::DanglingReference {
                        referrer: referrer.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
