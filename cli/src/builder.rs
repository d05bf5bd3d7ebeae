use crate::address::Cidr;
use crate::bootstrap::BootstrapScript;
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use stackgen_template::ec2::{Instance, NetworkInterface, SecurityGroup, SecurityGroupRule};
use stackgen_template::iam::{
    self, Effect, InstanceProfile, Policy, PolicyDocument, Role, Statement,
};
use stackgen_template::{Expr, LogicalId, Output, Parameter, Template};

/// Ids of the IAM entities the instance depends on
pub struct Identity {
    pub role: LogicalId,
    pub profile: LogicalId,
    pub policy: LogicalId,
}

/// Accumulates the web server stack, one step per entity group
///
/// Owns the template being built; [`TemplateBuilder::finish`] hands it over for serialization.
pub struct TemplateBuilder<'a> {
    config: &'a GeneratorConfig,
    template: Template,
}

impl<'a> TemplateBuilder<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        let mut template = Template::new();
        template.set_description(&config.description);
        TemplateBuilder { config, template }
    }

    /// Name of an existing EC2 key pair, supplied at deploy time
    pub fn parameter(&mut self) -> Result<LogicalId, GenerateError> {
        log::debug!("Adding key pair parameter");

        Ok(self.template.add_parameter(
            "KeyPair",
            Parameter::new("AWS::EC2::KeyPair::KeyName")
                .description("Name of an existing EC2 KeyPair to SSH")
                .constraint_description("must be the name of an existing EC2 KeyPair."),
        )?)
    }

    /// SSH and app traffic, both allowed only from `source`
    pub fn security_group(&mut self, source: &Cidr) -> Result<LogicalId, GenerateError> {
        let port = self.config.application_port;
        log::debug!("Scoping ingress rules to {source}");

        if !source.is_single_address() {
            log::warn!("Ingress rules are open to the whole {source} network");
        }

        let source = source.to_string();

        let group = SecurityGroup::new(
            self.config.vpc_id.as_str(),
            &format!("Allow SSH and TCP/{port} access"),
        )
        .ingress(SecurityGroupRule::tcp(self.config.ssh_port, &source))
        .ingress(SecurityGroupRule::tcp(port, &source));

        Ok(self.template.add_resource("SecurityGroup", group)?)
    }

    /// Role assumable by EC2, its instance profile and the S3 policy attached to it
    pub fn identity(&mut self) -> Result<Identity, GenerateError> {
        let role = self
            .template
            .add_resource("Role", Role::for_service("ec2.amazonaws.com"))?;

        let profile = self
            .template
            .add_resource("InstanceProfile", InstanceProfile::new("/", role.reference()))?;

        let grant = Statement::new(Effect::Allow, [iam::action("s3", "*")]).resource("*");

        if grant.is_unrestricted() {
            log::warn!("Policy AllowS3 grants every S3 action on every bucket");
        }

        let policy = self.template.add_resource(
            "Policy",
            Policy::new("AllowS3", PolicyDocument::new([grant])).role(role.reference()),
        )?;

        Ok(Identity {
            role,
            profile,
            policy,
        })
    }

    /// The web server itself, publicly addressable in the configured subnet
    pub fn instance(
        &mut self,
        key_pair: &LogicalId,
        security_group: &LogicalId,
        profile: &LogicalId,
        bootstrap: BootstrapScript,
    ) -> Result<LogicalId, GenerateError> {
        let instance = Instance::new(self.config.image_id.as_str(), &self.config.instance_type)
            .network_interface(
                NetworkInterface::primary(self.config.subnet_id.as_str())
                    .public_ip(true)
                    .security_group(security_group.reference()),
            )
            .key_name(key_pair.reference())
            .iam_instance_profile(profile.reference())
            .user_data(bootstrap.into_user_data(self.config.inline_user_data));

        Ok(self.template.add_resource("instance", instance)?)
    }

    /// Public IP and URL of the app
    pub fn outputs(&mut self, instance: &LogicalId) -> Result<(), GenerateError> {
        self.template.add_output(
            "InstancePublicIp",
            Output::new(instance.get_att("PublicIp")).description("Public IP of our instance."),
        )?;

        let url = Expr::join(
            "",
            [
                "http://".into(),
                instance.get_att("PublicDnsName"),
                ":".into(),
                self.config.application_port.to_string().into(),
            ],
        );

        self.template.add_output(
            "WebUrl",
            Output::new(url).description("Application endpoint"),
        )?;

        Ok(())
    }

    pub fn finish(self) -> Template {
        self.template
    }
}

/// Run every step in order
pub fn build(
    config: &GeneratorConfig,
    source: &Cidr,
    bootstrap: BootstrapScript,
) -> Result<Template, GenerateError> {
    let mut builder = TemplateBuilder::new(config);

    let key_pair = builder.parameter()?;
    let security_group = builder.security_group(source)?;
    let identity = builder.identity()?;
    log::debug!("Attached policy {} to role {}", identity.policy, identity.role);

    let instance = builder.instance(&key_pair, &security_group, &identity.profile, bootstrap)?;
    builder.outputs(&instance)?;

    Ok(builder.finish())
}
