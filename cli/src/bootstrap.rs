//! User data run by the instance on first boot
//!
//! The script is kept as a list of discrete commands and only turned into a
//! single payload when it is attached to the instance.
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use stackgen_template::Expr;

/// Where ansible-pull lives once installed with pip
const ANSIBLE_PULL: &str = "/usr/local/bin/ansible-pull";

/// Ordered shell commands of a user-data script
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BootstrapScript {
    commands: Vec<String>,
}

impl BootstrapScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Commands joined with newlines, no trailing newline
    pub fn render(&self) -> String {
        self.commands.join("\n")
    }

    pub fn encoded(&self) -> String {
        STANDARD.encode(self.render())
    }

    /// Value of the instance's `UserData` property
    ///
    /// Either a `Fn::Base64` over a `Fn::Join` of the commands, leaving the encoding to
    /// CloudFormation, or the already encoded literal.
    pub fn into_user_data(self, inline: bool) -> Expr {
        if inline {
            return Expr::Str(self.encoded());
        }

        Expr::base64(Expr::join("\n", self.commands.into_iter().map(Expr::Str)))
    }
}

/// Reject characters that could break out of the quoting used in the script
fn validate_shell_input(value: &str, field_name: &str) -> Result<(), GenerateError> {
    const FORBIDDEN: &[char] = &['"', '\'', '\\', '`', '$', ';', '|', '&', '\n', '\r'];

    if value.is_empty() {
        return Err(GenerateError::InvalidConfig(format!(
            "{field_name} cannot be empty"
        )));
    }

    if let Some(bad) = value
        .chars()
        .find(|c| FORBIDDEN.contains(c) || c.is_whitespace())
    {
        return Err(GenerateError::InvalidConfig(format!(
            "{field_name} contains forbidden character: {bad:?}"
        )));
    }

    Ok(())
}

/// The command pulling and applying the app's playbook on the instance
pub fn ansible_pull_command(repository_url: &str, application_name: &str) -> String {
    format!("{ANSIBLE_PULL} -U {repository_url} {application_name}.yml -i localhost")
}

/// Install git, java and ansible, apply the playbook once and then every ten minutes
pub fn ansible_bootstrap(config: &GeneratorConfig) -> Result<BootstrapScript, GenerateError> {
    validate_shell_input(&config.repository_account, "repository_account")?;
    validate_shell_input(&config.application_name, "application_name")?;

    let pull = ansible_pull_command(&config.repository_url(), &config.application_name);

    Ok(BootstrapScript::new()
        .command("#!/bin/bash")
        .command("yum install --enablerepo=epel -y git")
        .command("yum install java-1.8.0-openjdk -y")
        .command("echo 2 |/usr/sbin/alternatives --config java")
        .command("pip install ansible")
        .command(pull.clone())
        .command(format!(
            "echo '*/10 * * * * {pull}' > /etc/cron.d/ansible-pull"
        )))
}
