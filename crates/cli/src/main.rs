mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use troyops_lib::cicd::CiPlatform;
use troyops_lib::consts::SOPS_CONFIG_FILE;
use troyops_lib::deploy::{self, Environment};
use troyops_lib::exec::ExecConfig;
use troyops_lib::flux;
use troyops_lib::policy::PolicyEngine;
use troyops_lib::secrets::SecretsEngine;

use crate::cmd::Context;
use crate::output::{OutputFormat, print_error};

/// troyops - GitOps scaffolding for Kubernetes
#[derive(Parser)]
#[command(name = "troyops")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Deadline for each external command, e.g. 90s or 5m
  #[arg(long, global = true, env = "TROYOPS_TIMEOUT", value_parser = humantime::parse_duration)]
  timeout: Option<Duration>,

  /// Print the external commands instead of running them
  #[arg(long, global = true, env = "TROYOPS_DRY_RUN")]
  dry_run: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate a CI/CD pipeline for an application
  Cicd {
    /// CI platform (github, gitlab)
    #[arg(long, default_value_t = CiPlatform::Github)]
    platform: CiPlatform,

    /// Root of the repository to write the pipeline into
    #[arg(long, default_value = ".")]
    repo_path: PathBuf,

    /// Application name, also used as the image name
    #[arg(long, default_value = "app")]
    app_name: String,
  },

  /// Bootstrap Flux CD, or run a Flux operation
  Flux(FluxArgs),

  /// Deploy a Kustomize overlay for an environment
  Deploy {
    /// Target environment (dev, staging, prod)
    #[arg(long, default_value_t = Environment::Dev)]
    environment: Environment,

    /// Kubernetes namespace to deploy into
    #[arg(long, default_value = deploy::DEFAULT_NAMESPACE)]
    namespace: String,

    /// Directory holding one overlay per environment
    #[arg(long, default_value = deploy::DEFAULT_OVERLAYS_DIR)]
    overlays_dir: PathBuf,
  },

  /// Install a policy engine and apply its policies
  Policy {
    /// Policy engine (kyverno, opa)
    #[arg(long, default_value_t = PolicyEngine::Kyverno)]
    engine: PolicyEngine,

    /// Directory of policy manifests (default: policies/<engine>)
    #[arg(long)]
    directory: Option<PathBuf>,
  },

  /// Set up secret management and apply secrets
  Secrets {
    /// Secrets engine (sops, sealed-secrets)
    #[arg(long, default_value_t = SecretsEngine::Sops)]
    engine: SecretsEngine,

    /// Directory of secret manifests (default: secrets/<engine>)
    #[arg(long)]
    directory: Option<PathBuf>,

    /// SOPS configuration file, created if absent
    #[arg(long, default_value = SOPS_CONFIG_FILE)]
    sops_config: PathBuf,

    /// PGP fingerprint for a newly created SOPS configuration
    #[arg(long)]
    pgp_fingerprint: Option<String>,
  },
}

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct FluxArgs {
  #[command(subcommand)]
  command: Option<FluxCommand>,

  /// Git repository URL to bootstrap from
  #[arg(long, required = true)]
  repo: Option<String>,

  /// Branch to track
  #[arg(long, default_value = flux::DEFAULT_BRANCH)]
  branch: String,

  /// Namespace for the Flux controllers
  #[arg(long, default_value = flux::DEFAULT_NAMESPACE)]
  namespace: String,

  /// Path inside the repository for this cluster
  #[arg(long, default_value = flux::DEFAULT_PATH)]
  path: String,
}

#[derive(Subcommand)]
enum FluxCommand {
  /// Reconcile the Git source and its Kustomization
  Sync {
    #[arg(long, default_value = flux::DEFAULT_NAMESPACE)]
    namespace: String,

    /// Name of the GitRepository and Kustomization
    #[arg(long, default_value = flux::DEFAULT_SOURCE)]
    source: String,
  },

  /// Check the Flux installation
  Check {
    #[arg(long, default_value = flux::DEFAULT_NAMESPACE)]
    namespace: String,

    /// Only check cluster prerequisites
    #[arg(long)]
    pre: bool,
  },

  /// Install Flux components without a Git repository
  Install {
    #[arg(long, default_value = flux::DEFAULT_NAMESPACE)]
    namespace: String,
  },
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);
  debug!(timeout = ?cli.timeout, dry_run = cli.dry_run, "starting");

  let ctx = Context {
    exec: ExecConfig {
      timeout: cli.timeout,
      dry_run: cli.dry_run,
    },
    output: cli.output,
  };

  let result = match cli.command {
    Commands::Cicd {
      platform,
      repo_path,
      app_name,
    } => cmd::cmd_cicd(&ctx, platform, repo_path, app_name),
    Commands::Flux(args) => cmd::cmd_flux(&ctx, flux_action(args)),
    Commands::Deploy {
      environment,
      namespace,
      overlays_dir,
    } => cmd::cmd_deploy(&ctx, environment, namespace, overlays_dir),
    Commands::Policy { engine, directory } => cmd::cmd_policy(&ctx, engine, directory),
    Commands::Secrets {
      engine,
      directory,
      sops_config,
      pgp_fingerprint,
    } => cmd::cmd_secrets(&ctx, engine, directory, sops_config, pgp_fingerprint),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}

fn flux_action(args: FluxArgs) -> flux::FluxAction {
  match args.command {
    Some(FluxCommand::Sync { namespace, source }) => flux::FluxAction::Sync { namespace, source },
    Some(FluxCommand::Check { namespace, pre }) => flux::FluxAction::Check { namespace, pre },
    Some(FluxCommand::Install { namespace }) => flux::FluxAction::Install { namespace },
    None => flux::FluxAction::Bootstrap(flux::BootstrapOptions {
      repo_url: args.repo.unwrap_or_default(),
      branch: args.branch,
      namespace: args.namespace,
      path: args.path,
    }),
  }
}
