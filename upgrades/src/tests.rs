use {
    crate::*,
    bevy::prelude::*,
    game_config::{GameConfig, UpgradeEffect},
    game_events::{GameEvent, InvalidPurchaseReason, PurchaseItem},
    notifier::{FnObserver, GameObserverAppExt, NotifierPlugin, ObserverKey},
    wallet::Wallet,
};

#[derive(Resource, Default)]
struct Seen(Vec<GameEvent>);

#[derive(Resource, Default)]
struct L2Activations(u32);

fn setup_app(balance: f64) -> App {
    let config = GameConfig::bundled().expect("bundled config");
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(NotifierPlugin)
        .insert_resource(Upgrades::new_game(&config))
        .insert_resource(config)
        .insert_resource(Wallet::with_balance(balance))
        .init_resource::<Seen>()
        .init_resource::<L2Activations>()
        .register_game_observer(
            ObserverKey::Custom("spy".into()),
            FnObserver::new(|event: &GameEvent, world: &mut World| {
                world.resource_mut::<Seen>().0.push(event.clone());
                Ok(())
            }),
        )
        .add_observer(systems::buy_upgrade)
        .add_observer(systems::buy_automation)
        .add_observer(systems::buy_tx_fee)
        .add_observer(systems::buy_tx_speed)
        .add_observer(systems::buy_dapps)
        .add_observer(systems::buy_l2)
        .add_observer(|_: On<L2Activated>, mut count: ResMut<L2Activations>| {
            count.0 += 1;
        });
    app
}

fn seen(app: &App) -> &[GameEvent] {
    &app.world().resource::<Seen>().0
}

fn balance(app: &App) -> f64 {
    app.world().resource::<Wallet>().balance()
}

#[test]
fn test_buy_upgrade_raises_level_and_value() {
    let mut app = setup_app(100.0);

    app.world_mut().trigger(BuyUpgrade {
        chain_id: 0,
        upgrade_id: 0,
    });
    app.update();

    let config = app.world().resource::<GameConfig>();
    let upgrades = app.world().resource::<Upgrades>();
    assert_eq!(upgrades.upgrade_level(0, 0), Some(0));
    assert_eq!(
        upgrades.upgrade_value(config, 0, UpgradeEffect::BlockSize),
        Some(6.0)
    );
    assert_eq!(balance(&app), 95.0);
    assert_eq!(
        seen(&app),
        &[
            GameEvent::BalanceUpdated { balance: 95.0 },
            GameEvent::UpgradePurchased {
                chain_id: 0,
                upgrade_id: 0,
                level: 0
            },
        ]
    );
}

#[test]
fn test_max_level_is_rejected_without_deduction() {
    let mut app = setup_app(10_000.0);
    app.world_mut()
        .resource_mut::<Upgrades>()
        .set_upgrade_level(0, 2, 3);

    app.world_mut().trigger(BuyUpgrade {
        chain_id: 0,
        upgrade_id: 2,
    });
    app.update();

    assert_eq!(balance(&app), 10_000.0);
    assert_eq!(
        app.world().resource::<Upgrades>().upgrade_level(0, 2),
        Some(3)
    );
    assert_eq!(
        seen(&app),
        &[GameEvent::InvalidPurchase {
            item: PurchaseItem::Upgrade {
                chain_id: 0,
                upgrade_id: 2
            },
            reason: InvalidPurchaseReason::MaxLevel,
        }]
    );
}

#[test]
fn test_unaffordable_purchase_keeps_level() {
    let mut app = setup_app(1.0);

    app.world_mut().trigger(BuyAutomation {
        chain_id: 0,
        automation_id: 0,
    });
    app.update();

    assert_eq!(app.world().resource::<Upgrades>().automation_level(0, 0), None);
    assert_eq!(
        seen(&app),
        &[GameEvent::BuyFailed {
            cost: 20.0,
            balance: 1.0
        }]
    );
}

#[test]
fn test_l2_chain_purchases_locked_until_bought() {
    let mut app = setup_app(10_000.0);

    app.world_mut().trigger(BuyUpgrade {
        chain_id: 1,
        upgrade_id: 0,
    });
    app.update();
    assert!(matches!(
        seen(&app)[0],
        GameEvent::InvalidPurchase {
            reason: InvalidPurchaseReason::Locked,
            ..
        }
    ));

    app.world_mut().trigger(BuyL2);
    app.update();
    app.world_mut().trigger(BuyUpgrade {
        chain_id: 1,
        upgrade_id: 0,
    });
    app.update();

    let upgrades = app.world().resource::<Upgrades>();
    assert!(upgrades.l2_unlocked);
    assert_eq!(upgrades.upgrade_level(1, 0), Some(0));
    assert_eq!(app.world().resource::<L2Activations>().0, 1);
    assert_eq!(balance(&app), 10_000.0 - 500.0 - 5.0);
}

#[test]
fn test_l2_can_only_be_bought_once() {
    let mut app = setup_app(10_000.0);

    app.world_mut().trigger(BuyL2);
    app.update();
    app.world_mut().trigger(BuyL2);
    app.update();

    assert_eq!(balance(&app), 9_500.0);
    assert_eq!(app.world().resource::<L2Activations>().0, 1);
    assert_eq!(
        seen(&app).last(),
        Some(&GameEvent::InvalidPurchase {
            item: PurchaseItem::L2,
            reason: InvalidPurchaseReason::AlreadyOwned,
        })
    );
}

#[test]
fn test_dapp_fee_needs_dapps_unlock() {
    let mut app = setup_app(10_000.0);
    let buy_lending = BuyTxFee {
        chain_id: 0,
        type_id: 0,
        is_dapp: true,
    };

    app.world_mut().trigger(buy_lending);
    app.update();
    assert_eq!(
        app.world().resource::<Upgrades>().tx_fee_level(0, 0, true),
        None
    );

    app.world_mut().trigger(BuyDapps { chain_id: 0 });
    app.update();
    app.world_mut().trigger(buy_lending);
    app.update();

    let upgrades = app.world().resource::<Upgrades>();
    assert!(upgrades.is_dapps_unlocked(0));
    assert_eq!(upgrades.tx_fee_level(0, 0, true), Some(0));
    assert!(seen(&app).contains(&GameEvent::DappsPurchased { chain_id: 0 }));
}

#[test]
fn test_tx_speed_requires_unlocked_type() {
    let mut app = setup_app(10_000.0);

    // Swap starts locked, Transfer starts at fee level 0.
    app.world_mut().trigger(BuyTxSpeed {
        chain_id: 0,
        type_id: 1,
        is_dapp: false,
    });
    app.world_mut().trigger(BuyTxSpeed {
        chain_id: 0,
        type_id: 0,
        is_dapp: false,
    });
    app.update();

    let upgrades = app.world().resource::<Upgrades>();
    assert_eq!(upgrades.tx_speed_level(0, 1, false), None);
    assert_eq!(upgrades.tx_speed_level(0, 0, false), Some(0));
    assert_eq!(balance(&app), 10_000.0 - 10.0);
}
