use {
    bevy::{prelude::*, state::app::StatesPlugin},
    chain_components::L1_CHAIN_ID,
    chains::{AddTransaction, Chains, ConfirmClick},
    game_core::CorePlugin,
    in_app_notifications::NotificationQueue,
    sound::{SoundEffect, SoundPlayer, SoundStore},
    staking::{ClaimRewards, Stake, StakingPools},
    states::GameState,
    std::{
        sync::{Arc, Mutex},
        time::Duration,
    },
    tutorial::{TutorialState, TutorialStep},
    tx_builder::{ActionDescriptor, ActionQueue},
    upgrades::{BuyUpgrade, Upgrades},
    wallet::Wallet,
};

type Played = Arc<Mutex<Vec<SoundEffect>>>;

struct RecordingPlayer(Played);

impl SoundPlayer for RecordingPlayer {
    fn play_sound_effect(&mut self, effect: SoundEffect, _volume: f32, _pitch_shift: Option<f32>) {
        self.0.lock().unwrap().push(effect);
    }
}

fn setup_app() -> (App, Played) {
    let played = Played::default();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(StatesPlugin)
        .add_plugins(CorePlugin::default());
    app.insert_resource(SoundStore::with_player(RecordingPlayer(played.clone())));

    // Startup, then the Loading -> Running transition.
    app.update();
    app.update();
    (app, played)
}

fn mine(app: &mut App, clicks: u32) {
    for _ in 0..clicks {
        app.world_mut().trigger(ConfirmClick {
            chain_id: L1_CHAIN_ID,
        });
    }
    app.update();
}

fn add_transfers(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().trigger(AddTransaction {
            chain_id: L1_CHAIN_ID,
            type_id: 0,
            is_dapp: false,
        });
    }
    app.update();
}

fn block_full_sounds(played: &Played) -> usize {
    played
        .lock()
        .unwrap()
        .iter()
        .filter(|effect| **effect == SoundEffect::BlockFull)
        .count()
}

fn block_full_notifications(app: &App) -> usize {
    app.world()
        .resource::<NotificationQueue>()
        .active()
        .iter()
        .filter(|notification| notification.message.contains("is full"))
        .count()
}

#[test]
fn test_app_reaches_running() {
    let (app, _) = setup_app();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Running
    );
}

#[test]
fn test_mining_genesis_from_empty_wallet() {
    let (mut app, played) = setup_app();
    assert_eq!(app.world().resource::<Wallet>().balance(), 0.0);

    mine(&mut app, 5);

    let world = app.world();
    assert_eq!(world.resource::<Wallet>().balance(), 1.0);
    let chain = world.resource::<Chains>().chain(L1_CHAIN_ID).unwrap();
    assert_eq!(chain.blocks.len(), 1);
    assert_eq!(chain.working_block.block_id, 1);
    assert!(chain.working_block.is_empty());

    // Every observer saw the mined block.
    let tutorial = world.resource::<TutorialState>();
    assert_eq!(tutorial.step, TutorialStep::Transactions);
    assert!(tutorial.overlay_visible);
    assert!(
        world
            .resource::<achievements::AchievementStore>()
            .is_completed(0)
    );
    assert!(played.lock().unwrap().contains(&SoundEffect::BlockMined));
    assert!(played.lock().unwrap().contains(&SoundEffect::Achievement));
    assert!(
        world
            .resource::<NotificationQueue>()
            .active()
            .iter()
            .any(|notification| notification.message == "Achievement unlocked: First Coin")
    );
}

#[test]
fn test_mined_block_is_queued_for_the_backend() {
    let (mut app, _) = setup_app();

    mine(&mut app, 5);

    let mut queue = app.world_mut().resource_mut::<ActionQueue>();
    assert_eq!(
        queue.drain_batch(100),
        vec![ActionDescriptor::new("mine_block", [0])]
    );
}

#[test]
fn test_block_full_feedback_on_third_attempt() {
    let (mut app, played) = setup_app();
    mine(&mut app, 5);
    add_transfers(&mut app, 4);

    add_transfers(&mut app, 2);
    assert_eq!(block_full_sounds(&played), 0);
    assert_eq!(block_full_notifications(&app), 0);

    add_transfers(&mut app, 1);
    assert_eq!(block_full_sounds(&played), 1);
    assert_eq!(block_full_notifications(&app), 1);

    add_transfers(&mut app, 2);
    assert_eq!(block_full_sounds(&played), 1);
}

#[test]
fn test_max_level_purchase_keeps_balance() {
    let (mut app, _) = setup_app();
    app.insert_resource(Wallet::with_balance(10_000.0));
    for _ in 0..5 {
        app.world_mut().trigger(BuyUpgrade {
            chain_id: L1_CHAIN_ID,
            upgrade_id: 0,
        });
    }
    app.update();
    let after_max = app.world().resource::<Wallet>().balance();
    assert_eq!(
        app.world().resource::<Upgrades>().upgrade_level(L1_CHAIN_ID, 0),
        Some(4)
    );

    app.world_mut().trigger(BuyUpgrade {
        chain_id: L1_CHAIN_ID,
        upgrade_id: 0,
    });
    app.update();

    assert_eq!(app.world().resource::<Wallet>().balance(), after_max);
    assert_eq!(
        app.world().resource::<Upgrades>().upgrade_level(L1_CHAIN_ID, 0),
        Some(4)
    );
}

#[test]
fn test_one_year_of_staking_pays_five_percent() {
    let (mut app, _) = setup_app();
    app.insert_resource(Wallet::with_balance(100.0));

    app.world_mut().trigger(Stake {
        pool_id: 0,
        amount: 100.0,
    });
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs(31_536_000));
    app.world_mut().trigger(ClaimRewards { pool_id: 0 });

    let balance = app.world().resource::<Wallet>().balance();
    assert!((balance - 5.0).abs() < 1e-6, "balance was {balance}");
    assert_eq!(
        app.world()
            .resource::<StakingPools>()
            .pool(0)
            .unwrap()
            .staked_amount,
        100.0
    );
}
