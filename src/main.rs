use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use janken_tracker::api::{build_router, state::AppState};
use janken_tracker::config::{AppConfig, SheetsConfig, StoreBackend};
use janken_tracker::game::{GameSession, PlayOutcome, RandomPicker, SessionRanges};
use janken_tracker::models::{GameRecord, Hand, Recorded, Statistics};
use janken_tracker::sheets::{
    initialize_sheet, GoogleSheetsClient, MemorySheet, ServiceAccount, SheetStore,
};

#[derive(Parser)]
#[command(name = "janken-tracker")]
#[command(about = "Rock-paper-scissors with a spreadsheet-backed history")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write the header row to the sheet
    InitSheet {
        /// Target range (defaults to game.header_range)
        #[arg(long)]
        range: Option<String>,
    },

    /// Play a single round
    Play {
        /// rock, paper or scissors
        hand: Hand,
    },

    /// Show statistics and recent rounds
    Stats {
        /// Number of recent rounds to list
        #[arg(long, default_value = "10")]
        recent: usize,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_store(config: &SheetsConfig) -> Result<Arc<dyn SheetStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory sheet; rounds are lost on exit");
            Ok(Arc::new(MemorySheet::new()))
        }
        StoreBackend::Google => {
            let spreadsheet_id = config
                .spreadsheet_id
                .clone()
                .context("spreadsheet_id is not set")?;
            let client_email = config
                .client_email
                .clone()
                .context("client_email is not set")?;
            let private_key = config
                .private_key
                .as_deref()
                .context("private_key is not set")?;

            let account = ServiceAccount::new(client_email, private_key);
            let client = GoogleSheetsClient::new(spreadsheet_id, account, config.timeout())?;
            Ok(Arc::new(client))
        }
    }
}

fn hand_label(hand: &Recorded<Hand>) -> String {
    match hand {
        Recorded::Known(hand) => hand.label().to_string(),
        Recorded::Unrecognized(raw) => raw.clone(),
    }
}

fn print_record(record: &GameRecord) {
    let result = match &record.result {
        Recorded::Known(result) => result.label().to_string(),
        Recorded::Unrecognized(raw) => raw.clone(),
    };
    println!(
        "  {}  {} vs {}  {}",
        record.timestamp,
        hand_label(&record.player_hand),
        hand_label(&record.computer_hand),
        result
    );
}

fn print_statistics(stats: &Statistics) {
    println!("Games:    {}", stats.total_games);
    println!("Wins:     {}", stats.wins);
    println!("Losses:   {}", stats.losses);
    println!("Draws:    {}", stats.draws);
    println!("Win rate: {}", stats.win_rate_display());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(level, cli.json_logs);

    tracing::info!("Starting janken-tracker v{}", env!("CARGO_PKG_VERSION"));
    if !cli.config.exists() {
        tracing::info!("No config file at {:?}, using defaults", cli.config);
    }

    let store = build_store(&config.sheets)?;
    let ranges = SessionRanges {
        history: config.game.history_range.clone(),
        append: config.game.append_range.clone(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }

            let state = AppState::new(store, Box::new(RandomPicker::new()), &config.game);
            if let Err(e) = state.session.lock().await.load().await {
                tracing::warn!("Starting with empty history: {}", e);
            }

            let app = build_router(state, &server);
            let addr = format!("{}:{}", server.host, server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::InitSheet { range } => {
            let range = range.unwrap_or_else(|| config.game.header_range.clone());
            initialize_sheet(store.as_ref(), &range).await?;

            println!("Header written to {}:", range);
            for (column, label) in ('A'..).zip(janken_tracker::history::HEADER_ROW) {
                println!("  {}: {}", column, label);
            }
        }
        Commands::Play { hand } => {
            let mut session = GameSession::new(store, Box::new(RandomPicker::new()), ranges);
            session.load().await?;

            match session.play(hand).await {
                PlayOutcome::Saved(record) => {
                    print_record(&record);
                    println!();
                    print_statistics(session.statistics());
                }
                PlayOutcome::Unsaved { record, error } => {
                    print_record(&record);
                    return Err(error.into());
                }
            }
        }
        Commands::Stats { recent } => {
            let mut session = GameSession::new(store, Box::new(RandomPicker::new()), ranges);
            session.load().await?;

            print_statistics(session.statistics());
            if recent > 0 && !session.history().is_empty() {
                println!("\nRecent rounds:");
                for record in session.history().iter().take(recent) {
                    print_record(record);
                }
            }
        }
    }

    Ok(())
}
