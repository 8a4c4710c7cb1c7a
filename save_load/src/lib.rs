//! Save/Load system for persisting game state.
//!
//! - `SaveGame` / `LoadGame` events for manual saves and loads
//! - Automatic saves on a configurable interval
//! - DateTime-based save file naming
//! - RON snapshots of every store resource

use {
    achievements::AchievementStore,
    bevy::prelude::*,
    chains::Chains,
    chrono::Local,
    game_config::GameConfig,
    game_events::GameEvent,
    notifier::notify,
    serde::{Deserialize, Serialize},
    staking::StakingPools,
    states::GameState,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    system_schedule::GameSchedule,
    thiserror::Error,
    tutorial::TutorialState,
    upgrades::Upgrades,
    wallet::Wallet,
};

pub const SAVE_VERSION: u32 = 1;
const AUTOSAVE_FILE: &str = "autosave.ron";
const DEFAULT_SAVE_DIR: &str = "saves";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to parse save: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("save version {found} is not supported")]
    Version { found: u32 },
    #[error("resource `{0}` is missing")]
    MissingResource(&'static str),
    #[error("no save found in {0}")]
    NoSave(PathBuf),
}

/// Event to write a save file.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveGame {
    pub is_autosave: bool,
}

/// Event to load the latest save file (or the autosave).
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LoadGame {
    pub is_autosave: bool,
}

/// Timer resource for automatic saves.
#[derive(Resource)]
pub struct AutosaveTimer(pub Timer);

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(60.0, TimerMode::Repeating))
    }
}

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub saved_at: String,
    pub wallet: Wallet,
    pub chains: Chains,
    pub upgrades: Upgrades,
    pub staking: StakingPools,
    pub achievements: AchievementStore,
    pub tutorial: TutorialState,
}

fn cloned<R: Resource + Clone>(world: &World, name: &'static str) -> Result<R, SaveError> {
    world
        .get_resource::<R>()
        .cloned()
        .ok_or(SaveError::MissingResource(name))
}

fn game_clock(world: &World) -> f64 {
    world
        .get_resource::<Time>()
        .map_or(0.0, |time| time.elapsed_secs_f64())
}

impl GameSnapshot {
    pub fn capture(world: &World) -> Result<Self, SaveError> {
        Ok(Self {
            version: SAVE_VERSION,
            saved_at: Local::now().to_rfc3339(),
            wallet: cloned(world, "Wallet")?,
            chains: cloned(world, "Chains")?,
            upgrades: cloned(world, "Upgrades")?,
            staking: cloned(world, "StakingPools")?,
            achievements: cloned(world, "AchievementStore")?,
            tutorial: cloned(world, "TutorialState")?,
        })
    }

    /// Replaces the store resources. Staking clocks restart at the current
    /// game time.
    pub fn apply(mut self, world: &mut World) {
        self.staking.rebase(game_clock(world));
        world.insert_resource(self.wallet);
        world.insert_resource(self.chains);
        world.insert_resource(self.upgrades);
        world.insert_resource(self.staking);
        world.insert_resource(self.achievements);
        world.insert_resource(self.tutorial);
    }
}

pub fn save_file_name(is_autosave: bool) -> String {
    if is_autosave {
        return AUTOSAVE_FILE.to_string();
    }
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("save_{timestamp}.ron")
}

pub fn write_snapshot(dir: &Path, snapshot: &GameSnapshot, is_autosave: bool) -> Result<PathBuf, SaveError> {
    fs::create_dir_all(dir).map_err(|source| SaveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let serialized = ron::ser::to_string_pretty(snapshot, ron::ser::PrettyConfig::default())?;
    let path = dir.join(save_file_name(is_autosave));
    fs::write(&path, serialized).map_err(|source| SaveError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn read_snapshot(path: &Path) -> Result<GameSnapshot, SaveError> {
    let source = fs::read_to_string(path).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: GameSnapshot = ron::from_str(&source)?;
    if snapshot.version != SAVE_VERSION {
        return Err(SaveError::Version {
            found: snapshot.version,
        });
    }
    Ok(snapshot)
}

/// Finds the most recent manual save in `saves_dir`.
pub fn find_latest_save(saves_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(saves_dir).ok()?;

    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "ron"))
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.starts_with("save_"))
        })
        .max_by_key(|e| e.metadata().and_then(|m| m.modified()).ok())
        .map(|e| e.path())
}

fn save_dir(world: &World) -> PathBuf {
    world
        .get_resource::<GameConfig>()
        .map_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR), |config| config.save.directory.clone())
}

pub fn save_world(world: &mut World, is_autosave: bool) -> Result<PathBuf, SaveError> {
    let snapshot = GameSnapshot::capture(world)?;
    write_snapshot(&save_dir(world), &snapshot, is_autosave)
}

/// Loads a save into `world`. Without a save nothing changes; a save that
/// exists but cannot be read resets every store to a new game.
pub fn load_world(world: &mut World, is_autosave: bool) -> Result<(), SaveError> {
    let dir = save_dir(world);
    let found = if is_autosave {
        Some(dir.join(AUTOSAVE_FILE)).filter(|path| path.is_file())
    } else {
        find_latest_save(&dir)
    };
    let path = found.ok_or_else(|| SaveError::NoSave(dir.clone()))?;

    match read_snapshot(&path) {
        Ok(snapshot) => {
            info!(path = %path.display(), saved_at = %snapshot.saved_at, "game loaded");
            snapshot.apply(world);
            notify_balance(world);
            Ok(())
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "save unreadable, starting a new game");
            reset_to_new_game(world);
            Err(err)
        }
    }
}

pub fn reset_to_new_game(world: &mut World) {
    let (chains, upgrades) = match world.get_resource::<GameConfig>() {
        Some(config) => (Chains::new_game(config), Upgrades::new_game(config)),
        None => (Chains::default(), Upgrades::default()),
    };
    world.insert_resource(Wallet::default());
    world.insert_resource(chains);
    world.insert_resource(upgrades);
    world.insert_resource(StakingPools::default());
    world.insert_resource(AchievementStore::default());
    world.insert_resource(TutorialState::default());
    notify_balance(world);
}

fn notify_balance(world: &mut World) {
    let balance = world.resource::<Wallet>().balance();
    notify(world, GameEvent::BalanceUpdated { balance });
}

fn on_save_game(trigger: On<SaveGame>, mut commands: Commands) {
    let is_autosave = trigger.event().is_autosave;
    commands.queue(move |world: &mut World| match save_world(world, is_autosave) {
        Ok(path) => info!(path = %path.display(), "game saved"),
        Err(err) => error!(%err, "failed to save game"),
    });
}

fn on_load_game(trigger: On<LoadGame>, mut commands: Commands) {
    let is_autosave = trigger.event().is_autosave;
    commands.queue(move |world: &mut World| {
        if let Err(err) = load_world(world, is_autosave) {
            warn!(%err, "load failed");
        }
    });
}

/// Exclusive system writing the autosave when its timer fires.
fn autosave(world: &mut World) {
    let Some(delta) = world.get_resource::<Time>().map(|t| t.delta()) else {
        return;
    };
    let due = match world.get_resource_mut::<AutosaveTimer>() {
        Some(mut timer) => timer.0.tick(delta).just_finished(),
        None => return,
    };
    if !due {
        return;
    }
    match save_world(world, true) {
        Ok(path) => debug!(path = %path.display(), "autosaved"),
        Err(err) => error!(%err, "autosave failed"),
    }
}

fn configure_autosave(mut commands: Commands, config: Option<Res<GameConfig>>) {
    if let Some(config) = config {
        commands.insert_resource(AutosaveTimer(Timer::from_seconds(
            config.save.autosave_interval_secs,
            TimerMode::Repeating,
        )));
    }
}

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutosaveTimer>()
            .add_systems(Startup, configure_autosave)
            .add_systems(
                Update,
                autosave
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(in_state(GameState::Running)),
            )
            .add_observer(on_save_game)
            .add_observer(on_load_game);
    }
}
