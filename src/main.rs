use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiss_arbiter::config::AppConfig;
use swiss_arbiter::models::{MatchOutcome, Player, PlayerId, Standing, Tournament};
use swiss_arbiter::storage::{
    PlayerRecord, PlayerRegistry, PlayerSort, StorageConfig, TournamentFilter, TournamentStore,
};

#[derive(Parser)]
#[command(name = "swiss-arbiter")]
#[command(about = "Swiss-system chess tournament manager")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the player registry
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Create a new tournament
    Create {
        /// Tournament name (also the storage key)
        name: String,

        /// Venue
        #[arg(long)]
        place: String,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,

        /// Number of rounds (defaults to the configured value)
        #[arg(long)]
        rounds: Option<u32>,
    },

    /// Register players from the registry into a tournament
    Register {
        tournament: String,

        /// National identifiers of the players to register
        #[arg(required = true)]
        players: Vec<String>,
    },

    /// Pair the next round
    StartRound {
        tournament: String,

        /// Fix the round-1 shuffle for reproducible pairings
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Record a match result in the current round
    Report {
        tournament: String,

        /// 1-based match number within the round
        match_number: u32,

        /// Who won
        #[arg(value_enum)]
        outcome: OutcomeArg,
    },

    /// Close the current round once every match has a result
    CloseRound { tournament: String },

    /// Show the current standings
    Standings { tournament: String },

    /// End the tournament and print the final standings
    End { tournament: String },

    /// List saved tournaments
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },

    /// Edit tournament settings (only before the first round)
    Edit {
        tournament: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New venue
        #[arg(long)]
        place: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New round count
        #[arg(long)]
        rounds: Option<u32>,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Add a player to the registry
    Add {
        /// National identifier, e.g. "fr12345"
        id: String,

        #[arg(long)]
        surname: String,

        #[arg(long)]
        first_name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        birth_date: String,
    },

    /// List registered players
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Id)]
        sort: SortArg,

        /// Reverse the sort order
        #[arg(long)]
        descending: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutcomeArg {
    /// Player 1 wins
    P1,
    /// Player 2 wins
    P2,
    /// Draw
    Draw,
}

impl From<OutcomeArg> for MatchOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::P1 => MatchOutcome::Player1Win,
            OutcomeArg::P2 => MatchOutcome::Player2Win,
            OutcomeArg::Draw => MatchOutcome::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Id,
    Surname,
    Score,
}

impl From<SortArg> for PlayerSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => PlayerSort::Identifier,
            SortArg::Surname => PlayerSort::Surname,
            SortArg::Score => PlayerSort::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum FilterArg {
    All,
    Active,
    Ended,
}

impl From<FilterArg> for TournamentFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => TournamentFilter::All,
            FilterArg::Active => TournamentFilter::Active,
            FilterArg::Ended => TournamentFilter::Ended,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = Path::new(&cli.config);
    let mut config = if config_path.exists() {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::default()
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    let storage = StorageConfig::new(config.data_dir.clone());
    let store = TournamentStore::new(storage.clone());
    let registry = PlayerRegistry::new(&storage);

    match cli.command {
        Commands::Player { action } => match action {
            PlayerAction::Add {
                id,
                surname,
                first_name,
                birth_date,
            } => {
                let identifier = PlayerId::new(id)?;
                let birth_date = NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d")
                    .context("invalid --birth-date (expected YYYY-MM-DD)")?;
                registry.add(PlayerRecord {
                    identifier: identifier.clone(),
                    surname,
                    first_name,
                    birth_date,
                    score: 0.0,
                })?;
                println!("Registered player {}", identifier);
            }
            PlayerAction::List { sort, descending } => {
                let players = registry.list(sort.into(), descending)?;
                if players.is_empty() {
                    println!("No players in the registry.");
                } else {
                    print_player_rows(&players);
                }
            }
        },
        Commands::Create {
            name,
            place,
            description,
            rounds,
        } => {
            if store.exists(&name) {
                bail!("a tournament named {:?} already exists", name);
            }
            let max_round = rounds.unwrap_or(config.default_max_round);
            let tournament = Tournament::new(name, place, description, max_round)?;
            store.save(&tournament)?;
            println!(
                "Created tournament {:?} ({} rounds)",
                tournament.name(),
                tournament.max_round()
            );
        }
        Commands::Register {
            tournament,
            players,
        } => {
            let mut t = store.load(&tournament)?;
            for id in &players {
                let id = PlayerId::new(id.as_str())?;
                let record = registry.require(&id)?;
                t.register(Player::new(
                    record.identifier,
                    record.surname,
                    record.first_name,
                    record.birth_date,
                ))?;
                println!("Registered {} in {:?}", id, t.name());
            }
            store.save(&t)?;
        }
        Commands::StartRound { tournament, seed } => {
            let mut t = store.load(&tournament)?;
            let mut rng: StdRng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let (name, matches) = {
                let round = t.start_round(&mut rng)?;
                let matches: Vec<String> = round
                    .pairings()
                    .iter()
                    .map(|m| format!("  match {}: {} vs {}", m.number, m.player1, m.player2))
                    .collect();
                (round.display_name(), matches)
            };
            store.save(&t)?;
            println!("{} paired:", name);
            for line in matches {
                println!("{}", line);
            }
        }
        Commands::Report {
            tournament,
            match_number,
            outcome,
        } => {
            let mut t = store.load(&tournament)?;
            t.assign_result(match_number, outcome.into())?;
            store.save(&t)?;
            println!("Result recorded for match {}", match_number);
        }
        Commands::CloseRound { tournament } => {
            let mut t = store.load(&tournament)?;
            t.close_round()?;
            store.save(&t)?;
            println!(
                "Closed {}",
                t.current_round().map(|r| r.display_name()).unwrap_or_default()
            );
        }
        Commands::Standings { tournament } => {
            let t = store.load(&tournament)?;
            print_standings(&t.standings());
        }
        Commands::End { tournament } => {
            let mut t = store.load(&tournament)?;
            let standings = t.end_tournament()?;
            store.save(&t)?;
            println!("=== Final standings: {} ===", t.name());
            print_standings(&standings);
        }
        Commands::List { filter } => {
            let records = store.list(filter.into())?;
            if records.is_empty() {
                println!("No saved tournaments.");
            } else {
                println!(
                    "{:<25} {:<15} {:<12} {:<12} {:>6}",
                    "name", "place", "started", "ended", "rounds"
                );
                for record in records {
                    println!(
                        "{:<25} {:<15} {:<12} {:<12} {:>3}/{:<3}",
                        record.name,
                        record.place,
                        record.start_date.to_string(),
                        record
                            .end_date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        record.round_number,
                        record.max_round,
                    );
                }
            }
        }
        Commands::Edit {
            tournament,
            name,
            place,
            description,
            rounds,
        } => {
            let mut t = store.load(&tournament)?;
            let renamed = name.is_some();
            if let Some(name) = name {
                t.set_name(name)?;
            }
            if let Some(place) = place {
                t.set_place(place)?;
            }
            if let Some(description) = description {
                t.set_description(description)?;
            }
            if let Some(rounds) = rounds {
                t.set_max_round(rounds)?;
            }
            store.save(&t)?;
            if renamed && t.name() != tournament {
                store.delete(&tournament)?;
            }
            println!("Updated {:?}", t.name());
        }
    }

    Ok(())
}

fn print_player_rows(players: &[PlayerRecord]) {
    println!(
        "{:<10} {:<15} {:<15} {:<12} {:>6}",
        "id", "surname", "first name", "birth date", "score"
    );
    for p in players {
        println!(
            "{:<10} {:<15} {:<15} {:<12} {:>6.1}",
            p.identifier.as_str(),
            p.surname,
            p.first_name,
            p.birth_date.to_string(),
            p.score,
        );
    }
}

fn print_standings(standings: &[Standing]) {
    println!(
        "{:<5} {:<10} {:<15} {:<15} {:>6}",
        "rank", "id", "surname", "first name", "score"
    );
    for s in standings {
        println!(
            "{:<5} {:<10} {:<15} {:<15} {:>6.1}",
            s.rank,
            s.id.as_str(),
            s.surname,
            s.first_name,
            s.score,
        );
    }
}
