use {
    crate::{
        plan_purchase, BuyAutomation, BuyDapps, BuyL2, BuyTxFee, BuyTxSpeed, BuyUpgrade,
        L2Activated, PurchaseError, Upgrades,
    },
    bevy::prelude::*,
    game_config::GameConfig,
    game_events::{GameEvent, PurchaseItem},
    notifier::NotifyCommandsExt,
    progression::{Level, LevelTable},
    wallet::{try_buy, Wallet},
};

fn reject(commands: &mut Commands, item: PurchaseItem, err: PurchaseError) {
    warn!(?item, %err, "invalid purchase");
    commands.notify(GameEvent::InvalidPurchase {
        item,
        reason: err.into(),
    });
}

/// Looks up the next level and pays for it. `None` means nothing changed.
fn pay_for_next_level(
    commands: &mut Commands,
    wallet: &mut Wallet,
    item: PurchaseItem,
    table: Option<&LevelTable>,
    level: Level,
) -> Option<u32> {
    let Some(table) = table else {
        reject(commands, item, PurchaseError::Unknown);
        return None;
    };
    let (next, cost) = match plan_purchase(table, level) {
        Ok(planned) => planned,
        Err(err) => {
            reject(commands, item, err);
            return None;
        }
    };
    try_buy(wallet, commands, cost).then_some(next)
}

pub fn start_new_game(mut commands: Commands, config: Option<Res<GameConfig>>) {
    let Some(config) = config else {
        warn!("no game config, upgrades start empty");
        return;
    };
    commands.insert_resource(Upgrades::new_game(&config));
}

pub fn buy_upgrade(
    trigger: On<BuyUpgrade>,
    config: Res<GameConfig>,
    mut upgrades: ResMut<Upgrades>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let BuyUpgrade {
        chain_id,
        upgrade_id,
    } = *trigger.event();
    let item = PurchaseItem::Upgrade {
        chain_id,
        upgrade_id,
    };
    if !upgrades.is_chain_active(chain_id) {
        reject(&mut commands, item, PurchaseError::Locked);
        return;
    }

    let upgrade = config.upgrade(upgrade_id);
    let level = upgrades.upgrade_level(chain_id, upgrade_id);
    let Some(level) = pay_for_next_level(
        &mut commands,
        &mut wallet,
        item,
        upgrade.map(|upgrade| &upgrade.table),
        level,
    ) else {
        return;
    };

    upgrades.set_upgrade_level(chain_id, upgrade_id, level);
    info!(chain_id, upgrade_id, level, "upgrade purchased");
    commands.notify(GameEvent::UpgradePurchased {
        chain_id,
        upgrade_id,
        level,
    });
}

pub fn buy_automation(
    trigger: On<BuyAutomation>,
    config: Res<GameConfig>,
    mut upgrades: ResMut<Upgrades>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let BuyAutomation {
        chain_id,
        automation_id,
    } = *trigger.event();
    let item = PurchaseItem::Automation {
        chain_id,
        automation_id,
    };
    if !upgrades.is_chain_active(chain_id) {
        reject(&mut commands, item, PurchaseError::Locked);
        return;
    }

    let automation = config.automation(automation_id);
    let level = upgrades.automation_level(chain_id, automation_id);
    let Some(level) = pay_for_next_level(
        &mut commands,
        &mut wallet,
        item,
        automation.map(|automation| &automation.table),
        level,
    ) else {
        return;
    };

    upgrades.set_automation_level(chain_id, automation_id, level);
    info!(chain_id, automation_id, level, "automation purchased");
    commands.notify(GameEvent::AutomationPurchased {
        chain_id,
        automation_id,
        level,
    });
}

pub fn buy_tx_fee(
    trigger: On<BuyTxFee>,
    config: Res<GameConfig>,
    mut upgrades: ResMut<Upgrades>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let BuyTxFee {
        chain_id,
        type_id,
        is_dapp,
    } = *trigger.event();
    let item = PurchaseItem::TxFee {
        chain_id,
        type_id,
        is_dapp,
    };
    let dapps_locked = is_dapp && !upgrades.is_dapps_unlocked(chain_id);
    if !upgrades.is_chain_active(chain_id) || dapps_locked {
        reject(&mut commands, item, PurchaseError::Locked);
        return;
    }

    let tx = config.tx_type(chain_id, type_id, is_dapp);
    let level = upgrades.tx_fee_level(chain_id, type_id, is_dapp);
    let Some(level) = pay_for_next_level(
        &mut commands,
        &mut wallet,
        item,
        tx.map(|tx| &tx.fee),
        level,
    ) else {
        return;
    };

    upgrades.set_tx_fee_level(chain_id, type_id, is_dapp, level);
    info!(chain_id, type_id, is_dapp, level, "transaction fee level purchased");
    commands.notify(GameEvent::TxFeePurchased {
        chain_id,
        type_id,
        is_dapp,
        level,
    });
}

pub fn buy_tx_speed(
    trigger: On<BuyTxSpeed>,
    config: Res<GameConfig>,
    mut upgrades: ResMut<Upgrades>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let BuyTxSpeed {
        chain_id,
        type_id,
        is_dapp,
    } = *trigger.event();
    let item = PurchaseItem::TxSpeed {
        chain_id,
        type_id,
        is_dapp,
    };
    // Speed only makes sense for a type that can already be sent.
    let type_locked = upgrades.tx_fee_level(chain_id, type_id, is_dapp).is_none();
    if !upgrades.is_chain_active(chain_id) || type_locked {
        reject(&mut commands, item, PurchaseError::Locked);
        return;
    }

    let tx = config.tx_type(chain_id, type_id, is_dapp);
    let level = upgrades.tx_speed_level(chain_id, type_id, is_dapp);
    let Some(level) = pay_for_next_level(
        &mut commands,
        &mut wallet,
        item,
        tx.map(|tx| &tx.speed),
        level,
    ) else {
        return;
    };

    upgrades.set_tx_speed_level(chain_id, type_id, is_dapp, level);
    info!(chain_id, type_id, is_dapp, level, "transaction speed level purchased");
    commands.notify(GameEvent::TxSpeedPurchased {
        chain_id,
        type_id,
        is_dapp,
        level,
    });
}

pub fn buy_dapps(
    trigger: On<BuyDapps>,
    config: Res<GameConfig>,
    mut upgrades: ResMut<Upgrades>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let chain_id = trigger.event().chain_id;
    let item = PurchaseItem::Dapps { chain_id };
    if !upgrades.is_chain_active(chain_id) {
        reject(&mut commands, item, PurchaseError::Locked);
        return;
    }
    if upgrades.is_dapps_unlocked(chain_id) {
        reject(&mut commands, item, PurchaseError::AlreadyOwned);
        return;
    }
    if !try_buy(&mut wallet, &mut commands, config.dapps_unlock_cost) {
        return;
    }

    upgrades.dapps_unlocked.insert(chain_id);
    info!(chain_id, "dapps unlocked");
    commands.notify(GameEvent::DappsPurchased { chain_id });
}

pub fn buy_l2(
    _trigger: On<BuyL2>,
    config: Res<GameConfig>,
    mut upgrades: ResMut<Upgrades>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    if upgrades.l2_unlocked {
        reject(&mut commands, PurchaseItem::L2, PurchaseError::AlreadyOwned);
        return;
    }
    if !try_buy(&mut wallet, &mut commands, config.l2.cost) {
        return;
    }

    upgrades.l2_unlocked = true;
    info!("L2 unlocked");
    commands.notify(GameEvent::L2Purchased);
    commands.trigger(L2Activated);
}
