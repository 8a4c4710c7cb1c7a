//! Sound effects for gameplay events.
//!
//! The observer only decides *what* to play. Whether anything plays, and at
//! what volume, is read from [`SoundStore`] on every event so settings
//! changes apply immediately.

use {
    bevy::prelude::*,
    game_config::{GameConfig, SoundConfig},
    game_events::GameEvent,
    notifier::{Debounce, GameObserver, ObserverError},
    progression::tx_pitch_shift,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    TxAdded,
    BlockFull,
    MineClick,
    BlockMined,
    L2Batch,
    Purchase,
    Error,
    Achievement,
    Coins,
    Slashed,
}

/// Playback backend. Playing is fire-and-forget.
pub trait SoundPlayer: Send + Sync + 'static {
    fn play_sound_effect(&mut self, effect: SoundEffect, volume: f32, pitch_shift: Option<f32>);
}

#[derive(Debug, Default)]
pub struct LoggingSoundPlayer;

impl SoundPlayer for LoggingSoundPlayer {
    fn play_sound_effect(&mut self, effect: SoundEffect, volume: f32, pitch_shift: Option<f32>) {
        debug!(?effect, volume, ?pitch_shift, "play sound");
    }
}

#[derive(Resource)]
pub struct SoundStore {
    pub is_sound_on: bool,
    pub effect_volume: f32,
    pub player: Box<dyn SoundPlayer>,
}

impl Default for SoundStore {
    fn default() -> Self {
        Self {
            is_sound_on: true,
            effect_volume: 0.5,
            player: Box::new(LoggingSoundPlayer),
        }
    }
}

impl SoundStore {
    pub fn with_player(player: impl SoundPlayer) -> Self {
        Self {
            player: Box::new(player),
            ..default()
        }
    }
}

pub struct SoundObserver {
    config: SoundConfig,
    block_full: Debounce,
}

impl SoundObserver {
    pub fn new(config: &SoundConfig) -> Self {
        Self {
            config: config.clone(),
            block_full: Debounce::new(config.block_full_threshold),
        }
    }

    pub fn block_full_attempts(&self) -> u32 {
        self.block_full.count()
    }

    /// Effect and pitch for `event`, updating the `BlockFull` debounce.
    fn effect_for(&mut self, event: &GameEvent) -> Option<(SoundEffect, Option<f32>)> {
        if matches!(event, GameEvent::TxAdded { .. }) || event.is_purchase() {
            self.block_full.reset();
        }

        let effect = match event {
            GameEvent::TxAdded {
                tx, block_progress, ..
            } => {
                let pitch = tx_pitch_shift(
                    *block_progress,
                    tx.fee,
                    self.config.min_pitch_shift,
                    self.config.max_pitch_shift,
                    self.config.fee_pitch_step,
                );
                return Some((SoundEffect::TxAdded, Some(pitch)));
            }
            GameEvent::BlockFull { .. } => {
                if !self.block_full.hit() {
                    return None;
                }
                SoundEffect::BlockFull
            }
            GameEvent::MineClicked { .. } => SoundEffect::MineClick,
            GameEvent::MineDone { .. } | GameEvent::SequenceDone { .. } => SoundEffect::BlockMined,
            GameEvent::ProveDone { .. } | GameEvent::DaDone { .. } => SoundEffect::L2Batch,
            GameEvent::BuyFailed { .. } | GameEvent::InvalidPurchase { .. } => SoundEffect::Error,
            GameEvent::AchievementCompleted { .. } => SoundEffect::Achievement,
            GameEvent::RewardsClaimed { .. } => SoundEffect::Coins,
            GameEvent::Slashed { .. } => SoundEffect::Slashed,
            event if event.is_purchase() => SoundEffect::Purchase,
            _ => return None,
        };
        Some((effect, None))
    }
}

impl GameObserver for SoundObserver {
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError> {
        let Some((effect, pitch_shift)) = self.effect_for(event) else {
            return Ok(());
        };
        let mut store = world
            .get_resource_mut::<SoundStore>()
            .ok_or(ObserverError::MissingResource("SoundStore"))?;
        if !store.is_sound_on {
            return Ok(());
        }
        let volume = store.effect_volume;
        store.player.play_sound_effect(effect, volume, pitch_shift);
        Ok(())
    }
}

fn apply_config_volume(config: Option<Res<GameConfig>>, mut store: ResMut<SoundStore>) {
    if let Some(config) = config {
        store.effect_volume = config.sound.effect_volume;
    }
}

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SoundStore>()
            .add_systems(Startup, apply_config_volume);
    }
}
