use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    /// Timers that produce intents (automation clicks, tx speed).
    FrameStart,
    /// Periodic sweeps over store state (staking accrual, slashing).
    Sweep,
    /// Flushing queued side effects (on-chain action batches, notifications, saves).
    FrameEnd,
}

pub struct GameSchedulePlugin;

impl Plugin for GameSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GameSchedule::FrameStart,
                GameSchedule::Sweep,
                GameSchedule::FrameEnd,
            )
                .chain(),
        );
    }
}
