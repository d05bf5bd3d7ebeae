//! IAM roles, instance profiles and inline policies
use crate::intrinsic::Expr;
use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Principal allowed to assume a role
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Principal {
    Service(Vec<String>),
}

/// Build an action name such as `s3:*` or `sts:AssumeRole`
pub fn action(service: &str, name: &str) -> String {
    format!("{service}:{name}")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    action: Vec<String>,
    effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resource: Vec<String>,
}

impl Statement {
    pub fn new(effect: Effect, actions: impl IntoIterator<Item = String>) -> Self {
        Statement {
            action: actions.into_iter().collect(),
            effect,
            principal: None,
            resource: vec![],
        }
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn resource(mut self, resource: &str) -> Self {
        self.resource.push(resource.to_string());
        self
    }

    pub fn actions(&self) -> &[String] {
        &self.action
    }

    pub fn resources(&self) -> &[String] {
        &self.resource
    }

    /// Whether the statement grants every action of a service on every resource
    pub fn is_unrestricted(&self) -> bool {
        self.effect == Effect::Allow
            && self.action.iter().any(|a| a == "*" || a.ends_with(":*"))
            && self.resource.iter().any(|r| r == "*")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    statement: Vec<Statement>,
    version: &'static str,
}

impl PolicyDocument {
    pub fn new(statements: impl IntoIterator<Item = Statement>) -> Self {
        PolicyDocument {
            statement: statements.into_iter().collect(),
            version: POLICY_VERSION,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statement
    }
}

/// AWS::IAM::Role
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    assume_role_policy_document: PolicyDocument,
}

impl Role {
    /// A role the given AWS service (e.g. `ec2.amazonaws.com`) is trusted to assume
    pub fn for_service(service: &str) -> Self {
        let trust = Statement::new(Effect::Allow, [action("sts", "AssumeRole")])
            .principal(Principal::Service(vec![service.to_string()]));

        Role {
            assume_role_policy_document: PolicyDocument::new([trust]),
        }
    }

    pub fn trust_policy(&self) -> &PolicyDocument {
        &self.assume_role_policy_document
    }
}

/// AWS::IAM::InstanceProfile
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfile {
    path: String,
    roles: Vec<Expr>,
}

impl InstanceProfile {
    pub fn new(path: &str, role: Expr) -> Self {
        InstanceProfile {
            path: path.to_string(),
            roles: vec![role],
        }
    }

    pub(crate) fn expressions(&self) -> Vec<&Expr> {
        self.roles.iter().collect()
    }
}

/// AWS::IAM::Policy, an inline policy attached to one or more roles
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    policy_document: PolicyDocument,
    policy_name: String,
    roles: Vec<Expr>,
}

impl Policy {
    pub fn new(name: &str, document: PolicyDocument) -> Self {
        Policy {
            policy_document: document,
            policy_name: name.to_string(),
            roles: vec![],
        }
    }

    pub fn role(mut self, role: Expr) -> Self {
        self.roles.push(role);
        self
    }

    pub fn name(&self) -> &str {
        &self.policy_name
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.policy_document
    }

    pub(crate) fn expressions(&self) -> Vec<&Expr> {
        self.roles.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_trusts_service_principal() {
        let role = Role::for_service("ec2.amazonaws.com");

        assert_eq!(
            serde_json::to_value(&role).unwrap(),
            json!({
                "AssumeRolePolicyDocument": {
                    "Statement": [{
                        "Action": ["sts:AssumeRole"],
                        "Effect": "Allow",
                        "Principal": {"Service": ["ec2.amazonaws.com"]},
                    }],
                    "Version": "2012-10-17",
                }
            })
        );
    }

    #[test]
    fn test_wildcard_grant_is_unrestricted() {
        let broad = Statement::new(Effect::Allow, [action("s3", "*")]).resource("*");
        let narrow = Statement::new(Effect::Allow, [action("s3", "GetObject")]).resource("*");
        let denied = Statement::new(Effect::Deny, [action("s3", "*")]).resource("*");

        assert!(broad.is_unrestricted());
        assert!(!narrow.is_unrestricted());
        assert!(!denied.is_unrestricted());
    }
}
