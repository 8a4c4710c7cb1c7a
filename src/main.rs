use {
    bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin},
    game_core::CorePlugin,
    std::{path::PathBuf, time::Duration},
};

fn main() {
    // Optional first argument: a RON config replacing the bundled one.
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(StatesPlugin)
        .add_plugins(LogPlugin {
            filter: "error,game_config=info,\
                chains=info,\
                upgrades=info,\
                staking=info,\
                achievements=info,\
                sound=debug,\
                tx_builder=info,\
                save_load=debug,\
                game_core=info"
                .into(),
            level: bevy::log::Level::TRACE,
            ..Default::default()
        })
        .add_plugins(CorePlugin { config_path })
        .run();
}
