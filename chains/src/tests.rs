use {
    crate::*,
    bevy::prelude::*,
    chain_components::{L1_CHAIN_ID, L2_CHAIN_ID},
    game_config::GameConfig,
    game_events::{GameEvent, GameEventKind},
    notifier::{FnObserver, GameObserverAppExt, NotifierPlugin, ObserverKey},
    upgrades::{BuyL2, Upgrades, UpgradesPlugin},
    wallet::Wallet,
};

#[derive(Resource, Default)]
struct Seen(Vec<GameEvent>);

fn setup_app(balance: f64) -> App {
    let config = GameConfig::bundled().expect("bundled config");
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(NotifierPlugin)
        .insert_resource(config)
        .insert_resource(Wallet::with_balance(balance))
        .add_plugins((UpgradesPlugin, ChainsPlugin))
        .init_resource::<Seen>()
        .register_game_observer(
            ObserverKey::Custom("spy".into()),
            FnObserver::new(|event: &GameEvent, world: &mut World| {
                world.resource_mut::<Seen>().0.push(event.clone());
                Ok(())
            }),
        );
    // Runs the new game startup systems.
    app.update();
    app
}

fn kinds(app: &App) -> Vec<GameEventKind> {
    app.world()
        .resource::<Seen>()
        .0
        .iter()
        .map(GameEvent::kind)
        .collect()
}

fn click(app: &mut App, chain_id: u32, times: u32) {
    for _ in 0..times {
        app.world_mut().trigger(ConfirmClick { chain_id });
    }
    app.update();
}

fn fill(app: &mut App, chain_id: u32, count: usize) {
    for _ in 0..count {
        app.world_mut().trigger(AddTransaction {
            chain_id,
            type_id: 0,
            is_dapp: false,
        });
    }
    app.update();
}

#[test]
fn test_mining_genesis_pays_reward() {
    let mut app = setup_app(0.0);

    click(&mut app, L1_CHAIN_ID, 5);

    assert_eq!(app.world().resource::<Wallet>().balance(), 1.0);
    let chain = app
        .world()
        .resource::<Chains>()
        .chain(L1_CHAIN_ID)
        .unwrap()
        .clone();
    assert_eq!(chain.blocks.len(), 1);
    assert_eq!(chain.blocks[0].block_id, 0);
    assert_eq!(chain.working_block.block_id, 1);
    assert!(chain.working_block.is_empty());
    assert!(!chain.working_block.is_built);

    let kinds = kinds(&app);
    assert_eq!(
        kinds
            .iter()
            .filter(|kind| **kind == GameEventKind::MineClicked)
            .count(),
        5
    );
    assert_eq!(kinds.last(), Some(&GameEventKind::MineDone));
}

#[test]
fn test_clicks_on_open_block_are_ignored() {
    let mut app = setup_app(0.0);
    click(&mut app, L1_CHAIN_ID, 5);
    app.world_mut().resource_mut::<Seen>().0.clear();

    click(&mut app, L1_CHAIN_ID, 3);

    assert!(kinds(&app).is_empty());
    assert_eq!(
        app.world()
            .resource::<Chains>()
            .chain(L1_CHAIN_ID)
            .unwrap()
            .confirm_clicks,
        0
    );
}

#[test]
fn test_full_block_fires_block_full() {
    let mut app = setup_app(0.0);
    click(&mut app, L1_CHAIN_ID, 5);
    app.world_mut().resource_mut::<Seen>().0.clear();

    fill(&mut app, L1_CHAIN_ID, 5);

    let block = app
        .world()
        .resource::<Chains>()
        .working_block(L1_CHAIN_ID)
        .unwrap()
        .clone();
    assert_eq!(block.transactions.len(), 4);
    assert!(block.is_built);
    assert!((block.fees - 0.4).abs() < 1e-9);
    assert_eq!(
        kinds(&app),
        vec![
            GameEventKind::TxAdded,
            GameEventKind::TxAdded,
            GameEventKind::TxAdded,
            GameEventKind::TxAdded,
            GameEventKind::BlockFull,
        ]
    );
}

#[test]
fn test_mined_block_pays_reward_and_fees() {
    let mut app = setup_app(0.0);
    click(&mut app, L1_CHAIN_ID, 5);
    fill(&mut app, L1_CHAIN_ID, 4);

    click(&mut app, L1_CHAIN_ID, 5);

    // Genesis reward, then block reward 1 plus 4 * 0.1 fees.
    let balance = app.world().resource::<Wallet>().balance();
    assert!((balance - 2.4).abs() < 1e-9);
    let chain = app.world().resource::<Chains>().chain(L1_CHAIN_ID).unwrap();
    assert_eq!(chain.blocks.len(), 2);
    assert_eq!(chain.working_block.block_id, 2);
}

#[test]
fn test_locked_transactions_are_rejected() {
    let mut app = setup_app(0.0);
    click(&mut app, L1_CHAIN_ID, 5);
    app.world_mut().resource_mut::<Seen>().0.clear();

    app.world_mut().trigger(AddTransaction {
        chain_id: L1_CHAIN_ID,
        type_id: 1,
        is_dapp: false,
    });
    app.world_mut().trigger(AddTransaction {
        chain_id: L2_CHAIN_ID,
        type_id: 0,
        is_dapp: false,
    });
    app.update();

    assert!(kinds(&app).is_empty());
    assert!(
        app.world()
            .resource::<Chains>()
            .working_block(L1_CHAIN_ID)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_l2_blocks_batch_into_da_transaction() {
    let mut app = setup_app(1_000.0);
    click(&mut app, L1_CHAIN_ID, 5);
    app.world_mut().trigger(BuyL2);
    app.update();
    assert!(app.world().resource::<Upgrades>().l2_unlocked);
    assert!(app.world().resource::<Chains>().chain(L2_CHAIN_ID).is_some());

    for _ in 0..3 {
        fill(&mut app, L2_CHAIN_ID, 4);
        click(&mut app, L2_CHAIN_ID, 5);
    }
    let da = app
        .world()
        .resource::<Chains>()
        .aggregate(AggregateKind::Da)
        .unwrap()
        .clone();
    assert!(da.is_built);
    assert_eq!(da.blocks, vec![0, 1, 2]);

    app.world_mut().resource_mut::<Seen>().0.clear();
    app.world_mut().trigger(StoreDa);
    app.update();

    let chains = app.world().resource::<Chains>();
    let l1_block = chains.working_block(L1_CHAIN_ID).unwrap();
    assert_eq!(l1_block.transactions.len(), 1);
    assert_eq!(l1_block.transactions[0].type_id, 101);
    assert!((l1_block.fees - 0.6).abs() < 1e-9);
    assert!(!chains.aggregate(AggregateKind::Da).unwrap().is_built);
    assert!(chains.aggregate(AggregateKind::Prover).unwrap().is_built);
    assert_eq!(
        kinds(&app),
        vec![GameEventKind::TxAdded, GameEventKind::DaDone]
    );
}
