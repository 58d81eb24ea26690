use bossrush_cli::commands;
use bossrush_cli::logging;
use bossrush_cli::readline;
use bossrush_cli::{CliContext, ConsolePresenter};
use bossrush_core::{
    AppConfig, AppConfigExt, BossService, Encounter, EncounterHandle, EncounterService,
    HttpBossService, MemoryBossService, SelectionMode,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

const OFFLINE_USER: &str = "offline-player";
const OFFLINE_ATTACK_POWER: i64 = 25;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let launch = Launch::parse();

    let mut config = AppConfig::load();
    if let Some(user) = &launch.user {
        config.user_id = user.clone();
    }
    if launch.sequential {
        config.selection = SelectionMode::Sequential;
    }

    let handle = if launch.offline {
        if !config.has_user() {
            config.user_id = OFFLINE_USER.to_string();
        }
        let service = MemoryBossService::demo(&config.user_id, OFFLINE_ATTACK_POWER);
        start_encounter(Arc::new(service), &config)
    } else {
        let service = HttpBossService::from_config(&config).map_err(|e| e.to_string())?;
        start_encounter(Arc::new(service), &config)
    };

    let ctx = CliContext::new(config, handle, launch.offline);

    if let Err(err) = ctx.encounter.begin().await {
        println!("Could not start an encounter: {err}");
        if !ctx.config.read().await.has_user() {
            println!("Set a user with `set-user <id>` and relaunch.");
        } else {
            println!("Use `retry` to try again.");
        }
    }

    loop {
        let Some(line) = readline()? else {
            commands::exit(&ctx).await?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

fn start_encounter<S: BossService + 'static>(service: Arc<S>, config: &AppConfig) -> EncounterHandle {
    let mut encounter = Encounter::new(service, config.user_id.clone(), config.selection);
    encounter.add_signal_handler(Box::new(ConsolePresenter::new()));
    let (_task, handle) = EncounterService::spawn(encounter);
    handle
}

#[derive(Parser)]
#[command(version, about = "Boss rush combat client")]
struct Launch {
    /// Play against a built-in catalog instead of the remote service
    #[arg(long)]
    offline: bool,
    /// Walk the catalog in order instead of picking bosses at random
    #[arg(long)]
    sequential: bool,
    /// Play as this user for this run only
    #[arg(short, long)]
    user: Option<String>,
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Strike {
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
    Status,
    Retry,
    /// Give up on the current boss and any reward still pending
    Abandon,
    Profile,
    Config,
    SetUser {
        user_id: String,
    },
    SetUrl {
        url: String,
    },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "bossrush".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Strike { count }) => commands::strike(ctx, *count).await?,
        Some(Commands::Status) => commands::show_status(ctx).await?,
        Some(Commands::Retry) => commands::retry(ctx).await?,
        Some(Commands::Abandon) => commands::abandon(ctx).await?,
        Some(Commands::Profile) => commands::show_profile(ctx).await?,
        Some(Commands::Config) => commands::show_config(ctx).await?,
        Some(Commands::SetUser { user_id }) => commands::set_user(ctx, user_id).await?,
        Some(Commands::SetUrl { url }) => commands::set_url(ctx, url).await?,
        Some(Commands::Exit) => {
            commands::exit(ctx).await?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
