use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use velocity_config::config::{apply_pairs, load_file, PREFIX};
use velocity_config::resolver::memory::InMemoryViewResolver;
use velocity_config::{ConfigError, ResolverIntegration, VelocityProperties};

#[derive(Parser)]
#[command(name = "velocity-config")]
#[command(about = "Bind Velocity view resolver settings and show the result", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind settings and print the configured view resolver as JSON
    Bind {
        /// JSON settings document
        file: Option<PathBuf>,

        /// Extra setting, e.g. "suffix=.html" or "spring.velocity.cache=true"
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Resolver integration to apply the settings through
        #[arg(short, long, value_enum)]
        integration: Option<IntegrationArg>,
    },

    /// Print the default settings as JSON
    Defaults,
}

#[derive(Clone, Copy, ValueEnum)]
enum IntegrationArg {
    Legacy,
    Mvc,
}

impl From<IntegrationArg> for ResolverIntegration {
    fn from(arg: IntegrationArg) -> Self {
        match arg {
            IntegrationArg::Legacy => ResolverIntegration::Legacy,
            IntegrationArg::Mvc => ResolverIntegration::Mvc,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Split "key=value", qualifying bare keys with the settings prefix
fn parse_setting(setting: &str) -> Result<(String, String), ConfigError> {
    let (key, value) = setting
        .split_once('=')
        .ok_or_else(|| ConfigError::invalid_value("--set", setting, "KEY=VALUE"))?;
    let key = key.trim();
    let qualified = key
        .strip_prefix(PREFIX)
        .is_some_and(|rest| rest.starts_with('.'));
    if qualified {
        Ok((key.to_string(), value.to_string()))
    } else {
        Ok((format!("{}.{}", PREFIX, key), value.to_string()))
    }
}

fn bind(
    file: Option<PathBuf>,
    set: &[String],
    integration: Option<IntegrationArg>,
) -> Result<String, ConfigError> {
    let mut properties = match &file {
        Some(path) => {
            info!(path = %path.display(), "loading settings");
            load_file(path)?
        }
        None => VelocityProperties::default(),
    };

    let pairs = set
        .iter()
        .map(|setting| parse_setting(setting))
        .collect::<Result<Vec<_>, _>>()?;
    apply_pairs(&mut properties, pairs)?;

    if let Some(integration) = integration {
        properties.set_integration(integration.into());
    }

    let mut resolver = InMemoryViewResolver::new("velocityViewResolver");
    properties.apply_to_view_resolver(&mut resolver)?;
    info!(integration = ?properties.integration(), "applied settings");

    Ok(serde_json::to_string_pretty(&resolver)?)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Bind {
            file,
            set,
            integration,
        } => bind(file, &set, integration),
        Commands::Defaults => {
            serde_json::to_string_pretty(&VelocityProperties::default()).map_err(ConfigError::from)
        }
    };

    match output {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to bind velocity settings:");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
