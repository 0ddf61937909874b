/*!
 * ecfollowers CLI - drive the follower-index lifecycle from the shell
 *
 * Records go in and out as JSON: declared state is read from `--plan`,
 * tracked state from `--state` (`-` reads stdin), the resulting record is
 * printed on stdout and diagnostics are printed on stderr.
 */

use std::collections::BTreeMap;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use ecfollowers::{
    config::{LogLevel, LoggingConfig, ProviderSettings},
    diagnostics::{Diagnostic, Diagnostics},
    error::{ProviderError, Result, EXIT_SUCCESS},
    logging,
    provider::EcFollowersProvider,
    resource::{FollowerIndexModel, FollowerIndexResource, Resource, Schema},
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "ecfollowers")]
#[command(version, about = "Manage Elasticsearch cross-cluster replication follower indices", long_about = None)]
struct Cli {
    /// Provider settings file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Cluster URL (overrides config file and ECFOLLOWERS_URL)
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    /// Cluster username; the password is only read from the config file or ECFOLLOWERS_PASSWORD
    #[arg(long, value_name = "NAME", global = true)]
    username: Option<String>,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevelArg,

    /// Write logs to a file as JSON instead of stderr
    #[arg(long = "log", value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    /// Verbose output (same as --log-level debug)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start following a leader index and print the new record
    Create {
        /// Declared follower index (JSON)
        #[arg(long, value_name = "FILE")]
        plan: PathBuf,
    },

    /// Refresh a tracked record from the cluster
    Read {
        /// Tracked follower index (JSON)
        #[arg(long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Apply an in-place change to a tracked record
    Update {
        #[arg(long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long, value_name = "FILE")]
        plan: PathBuf,
    },

    /// Tear down a follower index
    Delete {
        #[arg(long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Show whether a declared change updates in place or replaces
    Plan {
        #[arg(long, value_name = "FILE")]
        plan: PathBuf,

        /// Tracked record; omit to plan a create
        #[arg(long, value_name = "FILE")]
        state: Option<PathBuf>,
    },

    /// Print the provider and resource schemas
    Schema,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_error(&e);
            print_diagnostics(&diagnostics);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LoggingConfig {
        log_level: cli.log_level.into(),
        log_file: cli.log.clone(),
        verbose: cli.verbose,
    };
    if let Err(e) = logging::init_logging(&log_config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let provider = EcFollowersProvider::new();

    match cli.command {
        Commands::Schema => {
            let resource = FollowerIndexResource::new();
            let resources: BTreeMap<String, Schema> =
                [(resource.type_name(provider.type_name()), resource.schema())]
                    .into_iter()
                    .collect();
            print_json(&serde_json::json!({
                "provider": {
                    "type_name": provider.type_name(),
                    "version": provider.version(),
                    "schema": provider.schema(),
                },
                "resources": resources,
            }))
        }
        Commands::Plan {
            ref plan,
            ref state,
        } => {
            let proposed: FollowerIndexModel = read_record(plan)?;
            let prior: Option<FollowerIndexModel> =
                state.as_deref().map(read_record::<FollowerIndexModel>).transpose()?;
            let change = FollowerIndexResource::new().plan(prior.as_ref(), &proposed)?;
            print_json(&change)
        }
        Commands::Update {
            ref state,
            ref plan,
        } => {
            let prior: FollowerIndexModel = read_record(state)?;
            let proposed: FollowerIndexModel = read_record(plan)?;
            let resource = configured_resource(&cli, &provider)?;
            let updated = block_on(resource.update(prior, proposed))?;
            print_json(&updated)
        }
        Commands::Create { ref plan } => {
            let proposed: FollowerIndexModel = read_record(plan)?;
            let resource = configured_resource(&cli, &provider)?;
            let created = block_on(resource.create(proposed))?;
            print_json(&created)
        }
        Commands::Read { ref state } => {
            let tracked: FollowerIndexModel = read_record(state)?;
            let resource = configured_resource(&cli, &provider)?;
            let refreshed = block_on(resource.read(tracked))?;
            print_json(&refreshed)
        }
        Commands::Delete { ref state } => {
            let tracked: FollowerIndexModel = read_record(state)?;
            let index = tracked.index.clone();
            let resource = configured_resource(&cli, &provider)?;
            block_on(resource.delete(tracked))?;
            info!(index = %index, "Follower index removed");
            Ok(())
        }
    }
}

/// Merge settings (file, then environment, then flags) and bind the resource
fn configured_resource(cli: &Cli, provider: &EcFollowersProvider) -> Result<FollowerIndexResource> {
    let mut settings = match cli.config {
        Some(ref path) => ProviderSettings::from_file(path)?,
        None => ProviderSettings::default(),
    };
    settings.apply_env()?;
    if let Some(ref url) = cli.url {
        settings.url = Some(url.clone());
    }
    if let Some(ref username) = cli.username {
        settings.username = Some(username.clone());
    }

    let connection = provider.configure(settings)?;
    if connection.config().has_partial_credentials() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning(
            "Incomplete credentials",
            "Only one of username and password is set, requests are sent without authentication",
        ));
        print_diagnostics(&diagnostics);
    }
    provider.follower_index(&connection)
}

/// Run one lifecycle call to completion, giving up on Ctrl-C
fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ProviderError::Runtime(format!("Failed to start async runtime: {}", e)))?;

    runtime.block_on(async {
        tokio::select! {
            result = future => result,
            _ = tokio::signal::ctrl_c() => Err(ProviderError::Runtime(
                "Interrupted before the operation finished; the follower may be partially changed"
                    .to_string(),
            )),
        }
    })
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| ProviderError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?
    };

    serde_json::from_str(&contents).map_err(|e| {
        ProviderError::InvalidRecord(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ProviderError::InvalidRecord(format!("Failed to encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    match serde_json::to_string_pretty(diagnostics) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => {
            for d in diagnostics.iter() {
                eprintln!("{}: {}", d.summary, d.detail);
            }
        }
    }
}
