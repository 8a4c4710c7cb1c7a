use {
    crate::{
        block_payout, block_size, difficulty, AddTransaction, AggregateKind, ChainError, Chains,
        ConfirmClick, ProveBlocks, StoreDa,
    },
    bevy::prelude::*,
    chain_components::{ChainId, L1_CHAIN_ID, L2_CHAIN_ID, Transaction, TxTypeId},
    game_config::{GameConfig, UpgradeEffect},
    game_events::GameEvent,
    notifier::NotifyCommandsExt,
    upgrades::{L2Activated, Upgrades},
    wallet::{credit, Wallet},
};

pub fn start_new_game(mut commands: Commands, config: Option<Res<GameConfig>>) {
    let Some(config) = config else {
        warn!("no game config, chains start empty");
        return;
    };
    commands.insert_resource(Chains::new_game(&config));
}

/// Appends `tx` and reports the outcome on the bus.
fn push_transaction(chains: &mut Chains, commands: &mut Commands, chain_id: ChainId, tx: Transaction) -> bool {
    match chains.add_transaction(chain_id, tx.clone()) {
        Ok(block_progress) => {
            commands.notify(GameEvent::TxAdded {
                chain_id,
                tx,
                block_progress,
            });
            true
        }
        Err(ChainError::BlockFull(err)) => {
            debug!(chain_id, %err, "transaction dropped");
            commands.notify(GameEvent::BlockFull { chain_id });
            false
        }
        Err(err) => {
            warn!(chain_id, %err, "transaction rejected");
            false
        }
    }
}

pub fn add_transaction(
    trigger: On<AddTransaction>,
    config: Res<GameConfig>,
    upgrades: Res<Upgrades>,
    mut chains: ResMut<Chains>,
    mut commands: Commands,
) {
    let AddTransaction {
        chain_id,
        type_id,
        is_dapp,
    } = *trigger.event();
    if !upgrades.is_chain_active(chain_id) {
        warn!(chain_id, "transaction on inactive chain");
        return;
    }
    if is_dapp && !upgrades.is_dapps_unlocked(chain_id) {
        warn!(chain_id, type_id, "dapps are locked");
        return;
    }
    let Some(fee) = upgrades.tx_fee(&config, chain_id, type_id, is_dapp) else {
        warn!(chain_id, type_id, is_dapp, "transaction type unknown or locked");
        return;
    };

    let tx = if is_dapp {
        Transaction::dapp(type_id, fee)
    } else {
        Transaction::new(type_id, fee)
    };
    push_transaction(&mut chains, &mut commands, chain_id, tx);
}

pub fn confirm_click(
    trigger: On<ConfirmClick>,
    config: Res<GameConfig>,
    upgrades: Res<Upgrades>,
    mut chains: ResMut<Chains>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let chain_id = trigger.event().chain_id;
    let upgrade = |effect| upgrades.upgrade_value(&config, chain_id, effect);

    let needed = difficulty(upgrade(UpgradeEffect::BlockDifficulty).unwrap_or(1.0));
    let progress = match chains.confirm_click(chain_id, needed) {
        Ok(progress) => progress,
        Err(err) => {
            debug!(chain_id, %err, "confirm click ignored");
            return;
        }
    };
    commands.notify(GameEvent::MineClicked {
        chain_id,
        progress: progress.ratio(),
    });
    if !progress.is_done() {
        return;
    }

    let next_size = block_size(upgrade(UpgradeEffect::BlockSize).unwrap_or(0.0));
    let block = match chains.finalize(chain_id, next_size) {
        Ok(block) => block,
        Err(err) => {
            warn!(chain_id, %err, "failed to finalize block");
            return;
        }
    };

    let payout = block_payout(
        &block,
        upgrade(UpgradeEffect::BlockReward).unwrap_or(0.0),
        upgrade(UpgradeEffect::MevBoost).unwrap_or(1.0),
    );
    info!(chain_id, block_id = block.block_id, payout, "block finalized");
    credit(&mut wallet, &mut commands, payout);

    if chain_id == L1_CHAIN_ID {
        commands.notify(GameEvent::MineDone { chain_id, block });
        return;
    }

    match chains.feed_l2(block.block_id, block.fees) {
        Ok(skipped) => {
            for kind in skipped {
                debug!(block_id = block.block_id, aggregate = %kind, "aggregate full, block not batched");
            }
        }
        Err(err) => warn!(chain_id, %err, "sequenced block not batched"),
    }
    commands.notify(GameEvent::SequenceDone { chain_id, block });
}

/// Moves a built aggregate into a synthetic L1 transaction. The aggregate is
/// kept when the L1 working block has no room.
fn flush_into_l1(chains: &mut Chains, commands: &mut Commands, kind: AggregateKind, type_id: TxTypeId) -> Option<(u32, f64)> {
    if chains.is_built(L1_CHAIN_ID) {
        debug!(aggregate = %kind, "L1 block full, aggregate kept");
        commands.notify(GameEvent::BlockFull {
            chain_id: L1_CHAIN_ID,
        });
        return None;
    }
    let (block_count, fees) = match chains.flush_aggregate(kind) {
        Ok(flushed) => flushed,
        Err(err) => {
            debug!(%err, "nothing to flush");
            return None;
        }
    };
    push_transaction(chains, commands, L1_CHAIN_ID, Transaction::new(type_id, fees));
    Some((block_count, fees))
}

pub fn store_da(
    _trigger: On<StoreDa>,
    config: Res<GameConfig>,
    mut chains: ResMut<Chains>,
    mut commands: Commands,
) {
    if let Some((block_count, fees)) =
        flush_into_l1(&mut chains, &mut commands, AggregateKind::Da, config.l2.da_tx_type_id)
    {
        commands.notify(GameEvent::DaDone { block_count, fees });
    }
}

pub fn prove_blocks(
    _trigger: On<ProveBlocks>,
    config: Res<GameConfig>,
    mut chains: ResMut<Chains>,
    mut commands: Commands,
) {
    if let Some((block_count, fees)) = flush_into_l1(
        &mut chains,
        &mut commands,
        AggregateKind::Prover,
        config.l2.proof_tx_type_id,
    ) {
        commands.notify(GameEvent::ProveDone { block_count, fees });
    }
}

pub fn on_l2_activated(
    _trigger: On<L2Activated>,
    config: Res<GameConfig>,
    upgrades: Res<Upgrades>,
    mut chains: ResMut<Chains>,
) {
    let Some(l2) = config.chain(L2_CHAIN_ID) else {
        warn!("L2 bought but no L2 chain is configured");
        return;
    };
    let size = upgrades
        .upgrade_value(&config, L2_CHAIN_ID, UpgradeEffect::BlockSize)
        .map(block_size)
        .unwrap_or(0);
    chains.open_chain(l2, size);
    chains.open_l2_pipeline(config.l2.da_max_size, config.l2.prover_max_size);
    info!(chain_id = L2_CHAIN_ID, block_size = size, "L2 chain opened");
}
