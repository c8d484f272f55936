use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tamalink::catalog::Catalog;
use tamalink::config::{Config, DEFAULT_CONFIG_PATH};
use tamalink::hotspot::{self, HotspotManager};
use tamalink::mac;
use tamalink::selection::{self, SelectionMode};
use tamalink::ssid;
use tamalink::web::{AppState, WebServer};

#[derive(Parser)]
#[command(
    name = "tamalink",
    version,
    about = "Tamagotchi Uni character access point",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the access point (requires root)
    Start {
        /// Override the selection mode for this run
        #[arg(short, long)]
        mode: Option<SelectionMode>,

        /// Disable the web control panel for this run
        #[arg(long, default_value = "false")]
        no_web: bool,
    },

    /// Show what would be broadcast today, without starting anything
    Status,

    /// List catalog characters
    ListCharacters {
        /// Only characters tagged with this season
        #[arg(short, long)]
        season: Option<String>,

        /// Only characters whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// List special event SSIDs
    ListSsids {
        /// Include deactivated entries
        #[arg(long, default_value = "false")]
        all: bool,
    },

    /// Exclude a character (or special SSID) from rotation
    Exclude {
        /// Catalog index
        index: usize,

        /// Target the special SSID pool instead of characters
        #[arg(long, default_value = "false")]
        ssid: bool,
    },

    /// Put a character (or special SSID) back into rotation
    Include {
        /// Catalog index
        index: usize,

        /// Target the special SSID pool instead of characters
        #[arg(long, default_value = "false")]
        ssid: bool,
    },

    /// Check privileges and required system tools
    Check,

    /// Run only the web control panel
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = Config::load_or_default(&cli.config)?;
    let catalog = Catalog::load()?;

    match cli.command {
        Commands::Start { mode, no_web } => {
            let mut config = config;
            if let Some(mode) = mode {
                config.selection.mode = mode;
            }
            start(config, catalog, no_web).await?;
        }
        Commands::Status => status(&config, &catalog),
        Commands::ListCharacters { season, search } => {
            list_characters(&config, &catalog, season, search)
        }
        Commands::ListSsids { all } => list_ssids(&catalog, all),
        Commands::Exclude { index, ssid } => set_exclusion(&config, &catalog, index, ssid, true)?,
        Commands::Include { index, ssid } => set_exclusion(&config, &catalog, index, ssid, false)?,
        Commands::Check => check(&config),
        Commands::Serve => serve(config, catalog).await?,
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tamalink=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("tamalink=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Run the access point until interrupted, rotating at midnight
async fn start(config: Config, catalog: Catalog, no_web: bool) -> Result<()> {
    hotspot::check_root()?;

    let web_enabled = config.web.enabled && !no_web;
    let bind_address = format!("{}:{}", config.web.host, config.web.port);
    let state = AppState::new(config.clone(), catalog);
    let mut manager = HotspotManager::new(config);

    if web_enabled {
        let server = WebServer::new(bind_address, state.clone());
        tokio::spawn(async move {
            if let Err(e) = server.start_with_shutdown(std::future::pending()).await {
                tracing::error!(error = %e, "Control panel failed");
            }
        });
    }

    loop {
        // Selection reads the live config so web-panel edits apply on the
        // next rotation, not after a restart
        let plan = {
            let config = state.config.lock().await;
            let exclusions = state.exclusions.lock().await;
            let cursor = state.cursor.lock().await;
            hotspot::plan_broadcast(&config, &state.catalog, &exclusions, &cursor)
        };

        let broadcast = manager.start(plan).await?;
        println!("Broadcasting {:?}", broadcast.ssid);
        if let Some(name) = &broadcast.character_name {
            println!("  Character: {name}");
        }
        if let Some(mac) = &broadcast.mac {
            println!("  MAC: {mac}");
        }
        println!("  Channel: {}", broadcast.channel);

        let now = chrono::Local::now().naive_local();
        let until_rotation =
            std::time::Duration::from_secs(selection::seconds_until_midnight(now).max(1) as u64);

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                break;
            }
            _ = tokio::time::sleep(until_rotation) => {
                tracing::info!("Midnight rotation");
                manager.stop().await;
            }
        }
    }

    manager.stop().await;
    Ok(())
}

/// Print today's broadcast plan without touching rotation state
fn status(config: &Config, catalog: &Catalog) {
    let exclusions = tamalink::exclusions::ExclusionStore::load(&config.selection.exclusions_file);
    let cursor = tamalink::selection::CycleCursor::new(&config.selection.cycle_file);

    let now = chrono::Local::now().naive_local();
    let today = now.date();
    let selected = selection::peek_combined(&config.selection, catalog, &exclusions, &cursor, today);

    println!("Date: {today}");
    println!("Mode: {}", config.selection.mode);
    match selected.name() {
        Some(name) => println!("Character: {name}"),
        None => println!("Character: none"),
    }
    if let Some(character) = selected.character {
        println!("MAC: {}", mac::character_mac(character));
    }
    let broadcast_ssid = match selected.ssid() {
        Some(special) => special.to_string(),
        None => ssid::resolve_ssid(&config.ssid, catalog),
    };
    println!("SSID: {broadcast_ssid}");
    if config.security.daily_password {
        println!("Password: {} (daily)", selection::generate_daily_password(today));
    } else if config.security.password.is_empty() {
        println!("Password: none (open network)");
    } else {
        println!("Password: (fixed)");
    }
    println!(
        "Next rotation in {} seconds",
        selection::seconds_until_midnight(now)
    );
    println!("Excluded: {} characters, {} SSIDs", exclusions.count(), exclusions.ssid_count());
}

fn list_characters(
    config: &Config,
    catalog: &Catalog,
    season: Option<String>,
    search: Option<String>,
) {
    let exclusions = tamalink::exclusions::ExclusionStore::load(&config.selection.exclusions_file);

    let season_filter = match &season {
        Some(name) => match tamalink::catalog::Season::from_id(name) {
            Some(season) => Some(season),
            None => {
                eprintln!("unknown season: {name}");
                return;
            }
        },
        None => None,
    };

    let search = search.map(|s| s.to_lowercase());
    for (index, character) in catalog.characters().iter().enumerate() {
        if season_filter.is_some() && character.season != season_filter {
            continue;
        }
        if let Some(needle) = &search {
            if !character.name.to_lowercase().contains(needle) {
                continue;
            }
        }
        let mut line = format!(
            "{index:3}  {}  {}",
            mac::character_mac(character),
            character.name
        );
        if let Some(season) = character.season {
            line.push_str(&format!("  [{season}]"));
        }
        if exclusions.is_excluded(index) {
            line.push_str("  (excluded)");
        }
        println!("{line}");
    }
}

fn list_ssids(catalog: &Catalog, all: bool) {
    for (index, special) in catalog.special_ssids().iter().enumerate() {
        if !special.active && !all {
            continue;
        }
        let mut line = format!("{index:3}  {:32}  {}", special.ssid, special.character_name);
        if !special.active {
            line.push_str("  (inactive)");
        }
        println!("{line}");
    }
}

fn set_exclusion(
    config: &Config,
    catalog: &Catalog,
    index: usize,
    ssid_pool: bool,
    exclude: bool,
) -> Result<()> {
    let pool_len = if ssid_pool {
        catalog.special_ssids().len()
    } else {
        catalog.characters().len()
    };
    if index >= pool_len {
        anyhow::bail!("index {index} out of range (pool has {pool_len} entries)");
    }

    let mut exclusions =
        tamalink::exclusions::ExclusionStore::load(&config.selection.exclusions_file);
    match (ssid_pool, exclude) {
        (false, true) => exclusions.exclude(index),
        (false, false) => exclusions.include(index),
        (true, true) => exclusions.exclude_ssid(index),
        (true, false) => exclusions.include_ssid(index),
    }

    let name = if ssid_pool {
        &catalog.special_ssids()[index].character_name
    } else {
        &catalog.characters()[index].name
    };
    let verb = if exclude { "Excluded" } else { "Included" };
    println!("{verb} {name} (index {index})");
    Ok(())
}

fn check(config: &Config) {
    match hotspot::check_root() {
        Ok(()) => println!("root: ok"),
        Err(e) => println!("root: {e}"),
    }

    let missing = hotspot::missing_dependencies();
    if missing.is_empty() {
        println!("tools: ok (iw, ip, hostapd, dnsmasq)");
    } else {
        println!("tools: missing {}", missing.join(", "));
    }

    println!("interface: {} (configured)", config.network.interface);
    match config.network.channel {
        Some(channel) => println!("channel: {channel} (fixed)"),
        None => println!("channel: auto-detect"),
    }
}

async fn serve(config: Config, catalog: Catalog) -> Result<()> {
    let bind_address = format!("{}:{}", config.web.host, config.web.port);
    let state = AppState::new(config, catalog);
    let server = WebServer::new(bind_address, state);

    server
        .start_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Interrupt received, shutting down");
        })
        .await?;
    Ok(())
}
