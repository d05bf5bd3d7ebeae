use crate::address::{Cidr, HttpLookup, SourceRange};
use crate::bootstrap::ansible_bootstrap;
use crate::builder::build;
use crate::config::GeneratorConfig;
use crate::error::{Error, GenerateError};
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use eyre::WrapErr;
use stackgen_template::Template;
use std::path::PathBuf;
use std::time::Duration;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    pub fn render(&self, template: &Template) -> Result<String, GenerateError> {
        Ok(match self {
            Format::Json => template.to_json()?,
            Format::Yaml => template.to_yaml()?,
        })
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct GenerateCommand {
    /// Path to a TOML config file (stackgen.toml in the current dir is used when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Format of the generated template
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Allow inbound traffic from this address or CIDR instead of looking up your public IP
    #[arg(long, value_name = "CIDR")]
    pub source_cidr: Option<Cidr>,
}

impl Runnable for GenerateCommand {
    fn runner(&self) -> impl Runner {
        GenerateRunner {
            command: self.clone(),
        }
    }
}

/// Produce the complete document, or nothing at all
///
/// The config is validated before the source range is resolved, so a bad config
/// never costs a network round trip.
pub fn generate(
    config: &GeneratorConfig,
    source: &dyn SourceRange,
    format: Format,
) -> Result<String, GenerateError> {
    let bootstrap = ansible_bootstrap(config)?;
    let range = source.resolve()?;
    let template = build(config, &range, bootstrap)?;
    format.render(&template)
}

pub(crate) struct GenerateRunner {
    command: GenerateCommand,
}

impl GenerateRunner {
    fn source(&self, config: &GeneratorConfig) -> Box<dyn SourceRange> {
        match self.command.source_cidr {
            Some(cidr) => Box::new(cidr),

            None => Box::new(HttpLookup::new(
                &config.ip_lookup_url,
                Duration::from_secs(config.ip_lookup_timeout_secs),
            )),
        }
    }
}

impl Runner for GenerateRunner {
    /// Generate the template and print it to stdout
    fn run(&mut self) -> Result<(), Error> {
        let dir = std::env::current_dir().wrap_err("Failed to get current dir")?;

        let config = GeneratorConfig::load(self.command.config.as_deref(), &dir).map_err(|e| {
            self.error(
                Some("Invalid configuration"),
                Some(&format!("{e:#}")),
                None,
            )
        })?;

        let source = self.source(&config);

        let document = generate(&config, source.as_ref(), self.command.format).map_err(|e| {
            let details = e.to_string();

            let title = match e {
                GenerateError::NetworkUnavailable { .. } => {
                    "Could not determine your public IP address"
                }
                GenerateError::InvalidConfig(_) => "Invalid configuration",
                GenerateError::Template(_) => "Failed to build the template",
            };

            self.error(Some(title), Some(&details), Some(Box::new(e)))
        })?;

        Writer::stdout().emit(&document)
    }
}
