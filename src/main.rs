use clap::{ArgAction, Parser, ValueEnum};
use lexidrag::{
    app_dirs::AppDirs,
    catalog::{self, VocabList},
    config::{Config, ConfigStore, FileConfigStore},
    game::{FillGame, GameKind, GameStrategy, PairingGame, PathGame},
    geometry::Canvas,
    item::{FocusMode, InMemoryItems, ListSelection},
    runtime::ManualClock,
    session::SessionController,
    simulate::{Autoplayer, PlayReport},
    stats::{MemoryRecorder, OutcomeRecorder, StatsDb},
};
use std::{error::Error, path::PathBuf};
use tracing::{info, Level};

/// plays a vocabulary drag game headlessly and reports how it went
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs one pairing, letter-fill or path-spelling session against the bundled vocabulary lists with a simulated player, and prints the resulting progress."
)]
pub struct Cli {
    /// game to play
    #[clap(short = 'g', long, value_enum, default_value_t = GameChoice::Pairing)]
    game: GameChoice,

    /// seed for shuffling, placement and the simulated player
    #[clap(short = 's', long, default_value_t = 42)]
    seed: u64,

    /// canvas width
    #[clap(long, default_value_t = 420.0)]
    width: f64,

    /// canvas height
    #[clap(long, default_value_t = 900.0)]
    height: f64,

    /// chance that the simulated player drops on a wrong target
    #[clap(short = 'm', long, default_value_t = 0.1)]
    mistake_rate: f64,

    /// play at most this many items
    #[clap(short = 'n', long)]
    items: Option<usize>,

    /// bundled list to draw from (defaults to all of them)
    #[clap(short = 'l', long)]
    list: Option<String>,

    /// only play starred items
    #[clap(long)]
    starred: bool,

    /// record outcomes in the stats database
    #[clap(long)]
    record: bool,

    /// stats database location (implies --record)
    #[clap(long)]
    db: Option<PathBuf>,

    /// config file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// print the bundled list names and exit
    #[clap(long)]
    lists: bool,

    /// more logging (-v debug, -vv trace)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum GameChoice {
    Pairing,
    Fill,
    Path,
}

impl From<GameChoice> for GameKind {
    fn from(choice: GameChoice) -> Self {
        match choice {
            GameChoice::Pairing => GameKind::Pairing,
            GameChoice::Fill => GameKind::Fill,
            GameChoice::Path => GameKind::Path,
        }
    }
}

impl Cli {
    fn db_path(&self) -> Option<PathBuf> {
        match (&self.db, self.record) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(AppDirs::db_path().unwrap_or_else(|| PathBuf::from("lexidrag_outcomes.db"))),
            (None, false) => None,
        }
    }

    fn load_config(&self) -> Result<Config, Box<dyn Error>> {
        match &self.config {
            // An explicit file has to be usable.
            Some(path) => Ok(FileConfigStore::with_path(path).try_load()?),
            None => Ok(FileConfigStore::new().load()),
        }
    }

    fn load_source(&self) -> Result<(InMemoryItems, ListSelection), Box<dyn Error>> {
        match &self.list {
            Some(name) => {
                let list = VocabList::load(name)?;
                let selection = ListSelection::Lists(vec![list.id]);
                Ok((InMemoryItems::new().with_list(list.id, list.items), selection))
            }
            None => Ok((catalog::load_all()?, ListSelection::All)),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn play<G: GameStrategy>(
    game: G,
    cli: &Cli,
    config: Config,
    recorder: Box<dyn OutcomeRecorder>,
) -> Result<PlayReport, Box<dyn Error>> {
    let clock = ManualClock::new();
    let mut session = SessionController::new(game, config, recorder)
        .with_clock(clock.clone())
        .with_seed(cli.seed);

    let (source, selection) = cli.load_source()?;
    let focus = if cli.starred {
        FocusMode::StarredOnly
    } else {
        FocusMode::All
    };
    session.load_items(&source, &selection, focus);
    if let Some(limit) = cli.items {
        let items = session.items().iter().take(limit).cloned().collect();
        session.set_items(items);
    }
    session.initialize(Canvas::new(cli.width, cli.height));

    if session.is_empty() {
        return Err("nothing to play for this selection".into());
    }
    Ok(Autoplayer::new(cli.seed, cli.mistake_rate).play(&mut session, &clock))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.lists {
        for name in catalog::list_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = cli.load_config()?;
    let db_path = cli.db_path();
    let recorder: Box<dyn OutcomeRecorder> = match &db_path {
        Some(path) => {
            info!(path = %path.display(), "recording outcomes");
            Box::new(StatsDb::open(path)?)
        }
        None => Box::new(MemoryRecorder::new()),
    };

    let report = match cli.game {
        GameChoice::Pairing => play(PairingGame::new(&config), &cli, config, recorder)?,
        GameChoice::Fill => play(FillGame::new(&config), &cli, config, recorder)?,
        GameChoice::Path => play(PathGame::new(&config), &cli, config, recorder)?,
    };

    let progress = report.progress;
    println!("game:      {}", cli.game.to_string().to_lowercase());
    println!("resolved:  {}/{}", progress.resolved, progress.total);
    println!("correct:   {}", progress.correct);
    println!("incorrect: {}", progress.incorrect);
    println!("accuracy:  {:.0}%", progress.accuracy());
    println!("moves:     {}", report.moves);
    println!("time:      {:.1}s", report.elapsed.as_secs_f64());
    println!("complete:  {}", report.completed);

    if let Some(path) = db_path {
        let db = StatsDb::open(path)?;
        let summary = db.game_summary(cli.game.into())?;
        println!(
            "history:   {} attempts, {:.0}% successful",
            summary.attempts,
            summary.success_rate()
        );
    }
    Ok(())
}
