//! EC2 resources: security groups and instances
use crate::intrinsic::Expr;
use serde::Serialize;

/// One ingress rule of a security group
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupRule {
    cidr_ip: String,
    from_port: u16,
    ip_protocol: String,
    to_port: u16,
}

impl SecurityGroupRule {
    /// Allow TCP traffic on a single port from the given CIDR range
    pub fn tcp(port: u16, cidr_ip: &str) -> Self {
        Self::tcp_range(port, port, cidr_ip)
    }

    pub fn tcp_range(from_port: u16, to_port: u16, cidr_ip: &str) -> Self {
        SecurityGroupRule {
            cidr_ip: cidr_ip.to_string(),
            from_port,
            ip_protocol: "tcp".into(),
            to_port,
        }
    }

    pub fn cidr_ip(&self) -> &str {
        &self.cidr_ip
    }

    pub fn ports(&self) -> (u16, u16) {
        (self.from_port, self.to_port)
    }
}

/// AWS::EC2::SecurityGroup
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    group_description: String,
    security_group_ingress: Vec<SecurityGroupRule>,
    vpc_id: Expr,
}

impl SecurityGroup {
    pub fn new(vpc_id: impl Into<Expr>, description: &str) -> Self {
        SecurityGroup {
            group_description: description.to_string(),
            security_group_ingress: vec![],
            vpc_id: vpc_id.into(),
        }
    }

    pub fn ingress(mut self, rule: SecurityGroupRule) -> Self {
        self.security_group_ingress.push(rule);
        self
    }

    pub fn rules(&self) -> &[SecurityGroupRule] {
        &self.security_group_ingress
    }

    pub(crate) fn expressions(&self) -> Vec<&Expr> {
        vec![&self.vpc_id]
    }
}

/// Network attachment of an instance
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    associate_public_ip_address: bool,
    device_index: String,
    group_set: Vec<Expr>,
    subnet_id: Expr,
}

impl NetworkInterface {
    /// Primary interface (device index 0) in the given subnet
    pub fn primary(subnet_id: impl Into<Expr>) -> Self {
        NetworkInterface {
            associate_public_ip_address: false,
            device_index: "0".into(),
            group_set: vec![],
            subnet_id: subnet_id.into(),
        }
    }

    pub fn public_ip(mut self, associate: bool) -> Self {
        self.associate_public_ip_address = associate;
        self
    }

    pub fn security_group(mut self, group: Expr) -> Self {
        self.group_set.push(group);
        self
    }
}

/// AWS::EC2::Instance
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    #[serde(skip_serializing_if = "Option::is_none")]
    iam_instance_profile: Option<Expr>,
    image_id: Expr,
    instance_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    network_interfaces: Vec<NetworkInterface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<Expr>,
}

impl Instance {
    pub fn new(image_id: impl Into<Expr>, instance_type: &str) -> Self {
        Instance {
            iam_instance_profile: None,
            image_id: image_id.into(),
            instance_type: instance_type.to_string(),
            key_name: None,
            network_interfaces: vec![],
            user_data: None,
        }
    }

    pub fn network_interface(mut self, interface: NetworkInterface) -> Self {
        self.network_interfaces.push(interface);
        self
    }

    pub fn key_name(mut self, key_name: Expr) -> Self {
        self.key_name = Some(key_name);
        self
    }

    pub fn iam_instance_profile(mut self, profile: Expr) -> Self {
        self.iam_instance_profile = Some(profile);
        self
    }

    /// Script run on first boot, usually wrapped in `Fn::Base64`
    pub fn user_data(mut self, user_data: Expr) -> Self {
        self.user_data = Some(user_data);
        self
    }

    pub fn user_data_expr(&self) -> Option<&Expr> {
        self.user_data.as_ref()
    }

    pub(crate) fn expressions(&self) -> Vec<&Expr> {
        let mut expressions = vec![&self.image_id];
        expressions.extend(self.iam_instance_profile.iter());
        expressions.extend(self.key_name.iter());
        expressions.extend(self.user_data.iter());

        for interface in self.network_interfaces.iter() {
            expressions.push(&interface.subnet_id);
            expressions.extend(interface.group_set.iter());
        }

        expressions
    }
}
