//! Command-line interface for the gitfo binary.
//!
//! Expected operational failures (missing target, rejected token, exhausted
//! quota, unreachable API, invalid input files) are printed as a single red
//! line and exit successfully; anything else exits with status 1.

use std::{
    io,
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use gitfo::{
    BatchSummary, Error, GitHubTransport, RepositoryOptions, Settings, load_settings, run_limit,
    run_repo, run_repo_batch, run_user, run_user_batch, write_failure,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command line interface for retrieving GitHub repository and user metadata.
#[derive(Debug, Parser,)]
#[command(name = "gitfo", version, about = "Retrieve GitHub repository and user metadata")]
#[command(disable_version_flag = true)]
struct Cli
{
    /// Show the application's version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool,>,

    /// Optional YAML settings file (timeout, API base URL, token).
    #[arg(long = "config", value_name = "PATH", env = "GITFO_CONFIG", global = true)]
    config: Option<PathBuf,>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Show details about a repository.
    Repo(RepoArgs,),
    /// Show details about a user.
    User(UserArgs,),
    /// Retrieve details for every repository listed in a .txt file.
    #[command(name = "repobatch")]
    RepoBatch(RepoBatchArgs,),
    /// Retrieve details for every user listed in a .txt file.
    #[command(name = "userbatch")]
    UserBatch(UserBatchArgs,),
    /// Show the API rate limit of a token.
    Limit(LimitArgs,),
}

/// Token option shared by every fetching command.
#[derive(Debug, Args, Default,)]
struct AuthArgs
{
    /// Your GitHub token for authorization.
    #[arg(short = 'a', long = "auth", value_name = "TOKEN", env = "GITFO_TOKEN", hide_env_values = true)]
    auth: Option<String,>,
}

/// Add-on switches of repository commands.
#[derive(Debug, Args, Default,)]
struct RepoFlags
{
    /// Retrieve full details about the repository (requires more requests).
    #[arg(long = "full", action = ArgAction::SetTrue)]
    full: bool,

    /// Get the full language breakdown (requires one more request).
    #[arg(long = "with-languages", action = ArgAction::SetTrue)]
    with_languages: bool,
}

impl From<&RepoFlags,> for RepositoryOptions
{
    fn from(flags: &RepoFlags,) -> Self
    {
        Self {
            full: flags.full, with_languages: flags.with_languages,
        }
    }
}

#[derive(Debug, Args,)]
struct RepoArgs
{
    /// Target repository (owner/name or GitHub URL).
    #[arg(value_name = "OWNER/NAME")]
    target: String,

    /// Output file. Supported file types: .txt, .csv, .json.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf,>,

    #[command(flatten)]
    flags: RepoFlags,

    #[command(flatten)]
    auth: AuthArgs,
}

#[derive(Debug, Args,)]
struct UserArgs
{
    /// Target GitHub username.
    #[arg(value_name = "LOGIN")]
    target: String,

    /// Output file. Supported file types: .txt, .csv, .json.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf,>,

    #[command(flatten)]
    auth: AuthArgs,
}

#[derive(Debug, Args,)]
struct RepoBatchArgs
{
    /// Text file with one repository per line.
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Output file. Supported file types: .txt, .csv, .json.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    flags: RepoFlags,

    #[command(flatten)]
    auth: AuthArgs,
}

#[derive(Debug, Args,)]
struct UserBatchArgs
{
    /// Text file with one username per line.
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Output file. Supported file types: .txt, .csv, .json.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    auth: AuthArgs,
}

#[derive(Debug, Args,)]
struct LimitArgs
{
    /// Your GitHub token for authorization.
    #[arg(value_name = "TOKEN")]
    auth: String,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    init_tracing();

    if let Err(error,) = run() {
        if error.is_handled() {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            if write_failure(&mut handle, &error.to_display_string(),).is_ok() {
                return;
            }
        }
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_target(false,).with_writer(io::stderr,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates settings, client construction and command errors.
fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Command::Repo(args,) => {
            let transport = connect(config, args.auth.auth,)?;
            run_repo(&transport, &args.target, (&args.flags).into(), args.output.as_deref(),)
        }
        Command::User(args,) => {
            let transport = connect(config, args.auth.auth,)?;
            run_user(&transport, &args.target, args.output.as_deref(),)
        }
        Command::RepoBatch(args,) => {
            let transport = connect(config, args.auth.auth,)?;
            let summary = run_repo_batch(&transport, &args.source, (&args.flags).into(), &args.output,)?;
            report(&summary,);
            Ok((),)
        }
        Command::UserBatch(args,) => {
            let transport = connect(config, args.auth.auth,)?;
            let summary = run_user_batch(&transport, &args.source, &args.output,)?;
            report(&summary,);
            Ok((),)
        }
        Command::Limit(args,) => {
            let transport = connect(config, Some(args.auth,),)?;
            run_limit(&transport,)
        }
    }
}

/// Resolves settings and builds the API client. A token given on the command
/// line (or through `GITFO_TOKEN`) overrides the settings file.
fn connect(config: Option<&Path,>, token: Option<String,>,) -> Result<GitHubTransport, Error,>
{
    let settings: Settings = load_settings(config,)?.with_token(token,);
    debug!("timeout {}s, custom base URL: {}", settings.timeout_secs, settings.base_url.is_some());
    Ok(GitHubTransport::new(&settings,)?,)
}

fn report(summary: &BatchSummary,)
{
    println!("{summary}");
}
