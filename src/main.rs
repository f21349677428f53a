use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use auditor::audit::{ActorContext, Auditor, FieldValue};
use auditor::cli::{
    handle_audit_command, handle_post_command, handle_user_command, parse_assignment,
    AuditCommands, PostCommands, UserCommands,
};
use auditor::config::{AuditorPaths, Settings};
use auditor::storage::Storage;

#[derive(Parser)]
#[command(
    name = "auditor",
    version,
    about = "Record-level audit trail with field redaction",
    long_about = "auditor keeps a small user and post store and records an audit \
                  entry for every create, update and delete, masking or dropping \
                  sensitive fields according to per-table policies."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Actor the changes are attributed to
    #[arg(long, global = true, env = "AUDITOR_ACTOR")]
    actor: Option<String>,

    /// Kind of actor (e.g. User, System)
    #[arg(long, global = true)]
    actor_type: Option<String>,

    /// Client IP address to record
    #[arg(long, global = true)]
    ip: Option<String>,

    /// Client user agent to record
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Request URL to record
    #[arg(long, global = true)]
    url: Option<String>,

    /// Extra audit tag, KEY=VALUE (repeatable)
    #[arg(long = "tag", global = true, value_parser = parse_assignment)]
    tags: Vec<(String, FieldValue)>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Post management commands
    #[command(subcommand)]
    Post(PostCommands),

    /// Audit log commands
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Initialize the data directory and default settings
    Init,

    /// Show current configuration, paths and effective audit policies
    Config,
}

impl Cli {
    fn actor_context(&self) -> ActorContext {
        ActorContext {
            actor_id: self.actor.clone(),
            actor_type: self.actor_type.clone(),
            ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
            url: self.url.clone(),
            tags: self.tags.iter().cloned().collect(),
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("AUDITOR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(())
}

fn print_config(paths: &AuditorPaths, settings: &Settings) {
    println!("auditor configuration");
    println!("=====================");
    println!("Data directory: {}", paths.data_dir().display());
    println!("Settings file:  {}", paths.settings_file().display());
    println!("Audit log:      {}", paths.audit_log().display());
    println!();

    let registry = settings.policy_registry();
    let global = registry.global();
    println!("Global policy:");
    println!("  Events:     {}", join(global.events.iter().map(|e| e.as_str())));
    println!("  Only dirty: {}", global.redaction.only_dirty);

    for table in registry.tables() {
        let policy = registry.resolve(table);
        println!();
        println!("Table '{}':", table);
        println!("  Events:     {}", join(policy.events.iter().map(|e| e.as_str())));
        println!("  Exclude:    {}", join(policy.redaction.exclude.iter().map(String::as_str)));
        println!("  Mask:       {}", join(policy.redaction.mask.iter().map(String::as_str)));
        println!("  Only dirty: {}", policy.redaction.only_dirty);
    }

    println!();
    println!("Creators:");
    println!("  Actor types: {}", join(settings.actor_types.iter().map(String::as_str)));
    println!("  Fields:      {}", join(settings.creator_fields.iter().map(String::as_str)));
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let paths = AuditorPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let auditor = Auditor::new(Arc::new(storage.audit_store()), settings.policy_registry())
        .with_creator_policy(settings.creator_policy());
    let context = cli.actor_context();

    let run = async {
        match cli.command {
            Some(Commands::User(cmd)) => handle_user_command(&storage, &auditor, cmd)?,
            Some(Commands::Post(cmd)) => handle_post_command(&storage, &auditor, cmd).await?,
            Some(Commands::Audit(cmd)) => handle_audit_command(&auditor, cmd).await?,
            Some(Commands::Init) => {
                println!("Initializing auditor at: {}", paths.data_dir().display());
                paths.ensure_directories()?;
                settings.save(&paths)?;
                storage.save_all()?;
                println!("Initialization complete!");
                println!();
                println!("Run 'auditor user seed' to create demo users.");
            }
            Some(Commands::Config) => print_config(&paths, &settings),
            None => {
                println!("auditor - record-level audit trail");
                println!();
                println!("Run 'auditor --help' for usage information.");
            }
        }
        Ok::<(), anyhow::Error>(())
    };

    let result = if context.is_empty() {
        run.await
    } else {
        context.scope(run).await
    };

    // Audit writes run in the background; wait for them before exiting
    auditor.flush().await;
    result
}
