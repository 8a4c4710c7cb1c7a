use {
    achievements::AchievementsPlugin,
    automation::AutomationPlugin,
    bevy::prelude::*,
    chains::ChainsPlugin,
    game_config::{GameConfig, GameConfigPlugin},
    in_app_notifications::InAppNotificationsPlugin,
    notifier::NotifierPlugin,
    save_load::SaveLoadPlugin,
    sound::SoundPlugin,
    staking::StakingPlugin,
    states::GameState,
    std::path::PathBuf,
    system_schedule::GameSchedulePlugin,
    tutorial::TutorialPlugin,
    tx_builder::TxBuilderPlugin,
    upgrades::UpgradesPlugin,
    wallet::WalletPlugin,
};

mod systems;

/// The whole headless game: config, stores, event bus and its observers.
#[derive(Default)]
pub struct CorePlugin {
    /// RON config to use instead of the bundled one.
    pub config_path: Option<PathBuf>,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins(GameConfigPlugin {
                path: self.config_path.clone(),
            })
            .add_plugins((NotifierPlugin, GameSchedulePlugin, WalletPlugin))
            .add_plugins((UpgradesPlugin, ChainsPlugin, AutomationPlugin, StakingPlugin))
            .add_plugins((
                AchievementsPlugin,
                SoundPlugin,
                TxBuilderPlugin,
                TutorialPlugin,
                InAppNotificationsPlugin,
            ))
            .add_plugins(SaveLoadPlugin)
            .add_systems(
                Update,
                systems::finish_loading.run_if(in_state(GameState::Loading)),
            )
            .add_systems(OnEnter(GameState::Running), systems::log_running);

        match app.world().get_resource::<GameConfig>().cloned() {
            Some(config) => systems::register_observers(app, &config),
            None => error!("no game config, observers not registered"),
        }
    }
}
