use crate::ec2::{Instance, SecurityGroup};
use crate::iam::{InstanceProfile, Policy, Role};
use crate::intrinsic::Expr;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Any resource the template can declare
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    SecurityGroup(SecurityGroup),
    Instance(Instance),
    Role(Role),
    InstanceProfile(InstanceProfile),
    Policy(Policy),
}

impl Resource {
    /// CloudFormation type name, e.g. `AWS::EC2::Instance`
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::SecurityGroup(_) => "AWS::EC2::SecurityGroup",
            Resource::Instance(_) => "AWS::EC2::Instance",
            Resource::Role(_) => "AWS::IAM::Role",
            Resource::InstanceProfile(_) => "AWS::IAM::InstanceProfile",
            Resource::Policy(_) => "AWS::IAM::Policy",
        }
    }

    /// Property values that may point at other entities
    pub(crate) fn expressions(&self) -> Vec<&Expr> {
        match self {
            Resource::SecurityGroup(group) => group.expressions(),
            Resource::Instance(instance) => instance.expressions(),
            Resource::Role(_) => vec![],
            Resource::InstanceProfile(profile) => profile.expressions(),
            Resource::Policy(policy) => policy.expressions(),
        }
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut resource = serializer.serialize_struct("Resource", 2)?;

        match self {
            Resource::SecurityGroup(p) => resource.serialize_field("Properties", p)?,
            Resource::Instance(p) => resource.serialize_field("Properties", p)?,
            Resource::Role(p) => resource.serialize_field("Properties", p)?,
            Resource::InstanceProfile(p) => resource.serialize_field("Properties", p)?,
            Resource::Policy(p) => resource.serialize_field("Properties", p)?,
        }

        resource.serialize_field("Type", self.resource_type())?;
        resource.end()
    }
}

macro_rules! impl_from_properties {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for Resource {
                fn from(properties: $variant) -> Self {
                    Resource::$variant(properties)
                }
            }
        )+
    };
}

impl_from_properties!(SecurityGroup, Instance, Role, InstanceProfile, Policy);
