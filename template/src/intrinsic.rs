use crate::error::ConstructionError;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Key under which a parameter, resource or output is declared
///
/// CloudFormation only accepts ASCII alphanumeric logical ids.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Result<Self, ConstructionError> {
        let id = id.into();

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConstructionError::InvalidLogicalId(id));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Ref` to the entity declared under this id
    pub fn reference(&self) -> Expr {
        Expr::Ref(self.clone())
    }

    /// `Fn::GetAtt` of an attribute of the resource declared under this id
    pub fn get_att(&self, attribute: &str) -> Expr {
        Expr::GetAtt(self.clone(), attribute.to_string())
    }
}

/// Lets maps keyed by id be queried with a plain `&str`
impl Borrow<str> for LogicalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property value, either a literal or an intrinsic function
/// resolved by CloudFormation at deploy time
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Str(String),
    Ref(LogicalId),
    GetAtt(LogicalId, String),
    Join(String, Vec<Expr>),
    Base64(Box<Expr>),
}

/// How an expression points at another entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference<'a> {
    Ref(&'a LogicalId),
    GetAtt(&'a LogicalId, &'a str),
}

impl Reference<'_> {
    pub fn target(&self) -> &LogicalId {
        match self {
            Reference::Ref(target) | Reference::GetAtt(target, _) => target,
        }
    }
}

impl Expr {
    pub fn join(separator: &str, parts: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Join(separator.to_string(), parts.into_iter().collect())
    }

    pub fn base64(inner: Expr) -> Self {
        Expr::Base64(Box::new(inner))
    }

    /// Every `Ref` and `Fn::GetAtt` nested in the expression, depth first
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<Reference<'a>>) {
        match self {
            Expr::Str(_) => {}
            Expr::Ref(target) => found.push(Reference::Ref(target)),
            Expr::GetAtt(target, attribute) => found.push(Reference::GetAtt(target, attribute)),
            Expr::Join(_, parts) => parts.iter().for_each(|p| p.collect_references(found)),
            Expr::Base64(inner) => inner.collect_references(found),
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Str(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Str(value)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Str(value) => serializer.serialize_str(value),

            Expr::Ref(target) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", target)?;
                map.end()
            }

            Expr::GetAtt(target, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &(target, attribute))?;
                map.end()
            }

            Expr::Join(separator, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(separator, parts))?;
                map.end()
            }

            Expr::Base64(inner) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Base64", inner)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_logical_id_rejects_non_alphanumeric() {
        assert!(LogicalId::new("SecurityGroup").is_ok());
        assert!(LogicalId::new("instance").is_ok());
        assert_eq!(
            LogicalId::new("my-group"),
            Err(ConstructionError::InvalidLogicalId("my-group".into()))
        );
        assert!(LogicalId::new("").is_err());
    }

    #[test]
    fn test_intrinsics_serialize_to_cloudformation_syntax() {
        let instance = LogicalId::new("instance").unwrap();

        let url = Expr::join(
            "",
            [
                "http://".into(),
                instance.get_att("PublicDnsName"),
                ":".into(),
                "3000".into(),
            ],
        );

        assert_eq!(
            serde_json::to_value(&url).unwrap(),
            json!({"Fn::Join": ["", ["http://", {"Fn::GetAtt": ["instance", "PublicDnsName"]}, ":", "3000"]]})
        );

        assert_eq!(
            serde_json::to_value(Expr::base64(instance.reference())).unwrap(),
            json!({"Fn::Base64": {"Ref": "instance"}})
        );
    }

    #[test]
    fn test_references_walk_nested_expressions() {
        let role = LogicalId::new("Role").unwrap();
        let instance = LogicalId::new("instance").unwrap();
        let expr = Expr::base64(Expr::join(
            "\n",
            [
                role.reference(),
                "echo".into(),
                instance.get_att("PublicIp"),
            ],
        ));

        assert_eq!(
            expr.references(),
            vec![
                Reference::Ref(&role),
                Reference::GetAtt(&instance, "PublicIp")
            ]
        );
    }
}
