use {
    achievements::AchievementObserver,
    bevy::prelude::*,
    game_config::GameConfig,
    in_app_notifications::InAppNotificationsObserver,
    notifier::{GameObserverAppExt, ObserverKey},
    sound::SoundObserver,
    states::GameState,
    tutorial::TutorialObserver,
    tx_builder::{QueueSink, TxBuilderObserver},
};

/// Delivery order is registration order: achievements see an event before
/// the feedback observers do.
pub fn register_observers(app: &mut App, config: &GameConfig) {
    app.register_game_observer(ObserverKey::Achievements, AchievementObserver::new(config))
        .register_game_observer(ObserverKey::Sound, SoundObserver::new(&config.sound))
        .register_game_observer(
            ObserverKey::TxBuilder,
            TxBuilderObserver::new(config, QueueSink),
        )
        .register_game_observer(ObserverKey::Tutorial, TutorialObserver)
        .register_game_observer(
            ObserverKey::InAppNotifications,
            InAppNotificationsObserver::new(config),
        );
}

pub fn finish_loading(config: Option<Res<GameConfig>>, mut next_state: ResMut<NextState<GameState>>) {
    if config.is_none() {
        return;
    }
    info!("game config in place, entering Running state");
    next_state.set(GameState::Running);
}

pub fn log_running(config: Res<GameConfig>) {
    info!(
        chains = config.chains.len(),
        achievements = config.achievements.len(),
        "game running"
    );
}
