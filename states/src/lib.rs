use bevy::prelude::*;

/// Periodic gameplay systems (automation, staking sweeps, batch flushes,
/// autosave) only run while `Running`. Store requests are handled in any state.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Waiting for the game config.
    #[default]
    Loading,
    Running,
}
