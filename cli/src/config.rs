use eyre::{eyre, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the current directory when no config path is passed
pub const CONFIG_FILE_NAME: &str = "stackgen.toml";

/// Everything the generated template is parameterized with
///
/// Every field is optional in the TOML file. Missing fields fall back to the defaults
/// of the original HelloWorld stack.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub description: String,

    /// Name of the app, also the name of the ansible playbook (`<name>.yml`)
    pub application_name: String,
    pub application_port: u16,
    pub ssh_port: u16,

    /// GitHub account hosting the `Ansible` repository pulled on the instance
    pub repository_account: String,

    pub vpc_id: String,
    pub subnet_id: String,
    pub image_id: String,
    pub instance_type: String,

    /// Service answering a plain GET with the caller's public IP address
    pub ip_lookup_url: String,
    pub ip_lookup_timeout_secs: u64,

    /// Emit user data as a pre-encoded base64 literal instead of `Fn::Base64`
    pub inline_user_data: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            description: "Effective DevOps in AWS: HelloWorld web application".into(),
            application_name: "nodeserver".into(),
            application_port: 3000,
            ssh_port: 22,
            repository_account: "simonliu9".into(),
            vpc_id: "vpc-d9a7fda0".into(),
            subnet_id: "subnet-72379639".into(),
            image_id: "ami-e251209a".into(),
            instance_type: "t2.micro".into(),
            ip_lookup_url: "https://api.ipify.org".into(),
            ip_lookup_timeout_secs: 10,
            inline_user_data: false,
        }
    }
}

impl GeneratorConfig {
    /// Load the config
    ///
    /// An explicitly passed path must exist. Otherwise `stackgen.toml` is looked up in `dir`,
    /// and the defaults are used if there is none.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> eyre::Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => dir.join(CONFIG_FILE_NAME),
        };

        let toml_string = match std::fs::read_to_string(&path) {
            Ok(toml_string) => toml_string,

            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {CONFIG_FILE_NAME} in {dir:?}, using defaults");
                return Ok(Self::default());
            }

            Err(e) => return Err(e).wrap_err(format!("Failed to read {path:?}")),
        };

        let config: Self =
            toml::from_str(&toml_string).wrap_err(format!("Failed to parse {path:?}"))?;

        if config.application_port == 0 || config.ssh_port == 0 {
            return Err(eyre!("Ports in {path:?} must be greater than zero"));
        }

        if config.ip_lookup_timeout_secs == 0 {
            return Err(eyre!("ip_lookup_timeout_secs in {path:?} must be greater than zero"));
        }

        log::debug!("Loaded config from {path:?}");
        Ok(config)
    }

    /// Git repository with the ansible playbooks
    pub fn repository_url(&self) -> String {
        format!("https://github.com/{}/Ansible", self.repository_account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_default_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(GeneratorConfig::load(Some(&path), dir.path()).is_err());
    }

    #[test]
    fn test_partial_file_overrides_only_given_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "vpc_id = \"vpc-0abc\"\napplication_port = 8080\n",
        )
        .unwrap();

        let config = GeneratorConfig::load(None, dir.path()).unwrap();

        assert_eq!(config.vpc_id, "vpc-0abc");
        assert_eq!(config.application_port, 8080);
        assert_eq!(config.subnet_id, GeneratorConfig::default().subnet_id);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "vpcid = \"vpc-0abc\"\n").unwrap();

        assert!(GeneratorConfig::load(Some(&path), dir.path()).is_err());
    }

    #[test]
    fn test_zero_port_or_timeout_is_rejected() {
        let dir = tempdir().unwrap();

        for contents in ["ssh_port = 0\n", "ip_lookup_timeout_secs = 0\n"] {
            let path = dir.path().join(CONFIG_FILE_NAME);
            std::fs::write(&path, contents).unwrap();

            assert!(
                GeneratorConfig::load(Some(&path), dir.path()).is_err(),
                "{contents}"
            );
        }
    }

    #[test]
    fn test_repository_url_uses_account() {
        assert_eq!(
            GeneratorConfig::default().repository_url(),
            "https://github.com/simonliu9/Ansible"
        );
    }
}
