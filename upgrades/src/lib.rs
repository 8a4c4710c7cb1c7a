//! Everything the player buys in levels: chain upgrades, automations,
//! transaction fee/speed levels, the dapps unlock and the L2 chain.

mod store;
pub mod systems;

#[cfg(test)]
mod tests;

pub use store::*;

use {
    bevy::prelude::*,
    chain_components::{ChainId, TxTypeId},
};

#[derive(Event, Debug, Clone, Copy)]
pub struct BuyUpgrade {
    pub chain_id: ChainId,
    pub upgrade_id: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BuyAutomation {
    pub chain_id: ChainId,
    pub automation_id: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BuyTxFee {
    pub chain_id: ChainId,
    pub type_id: TxTypeId,
    pub is_dapp: bool,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BuyTxSpeed {
    pub chain_id: ChainId,
    pub type_id: TxTypeId,
    pub is_dapp: bool,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BuyDapps {
    pub chain_id: ChainId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BuyL2;

/// Triggered once the L2 purchase went through.
///
/// # Observers
/// - `chains`: creates the L2 chain and its DA/prover aggregates.
#[derive(Event, Debug, Clone, Copy)]
pub struct L2Activated;

pub struct UpgradesPlugin;

impl Plugin for UpgradesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Upgrades>()
            .add_systems(Startup, systems::start_new_game)
            .add_observer(systems::buy_upgrade)
            .add_observer(systems::buy_automation)
            .add_observer(systems::buy_tx_fee)
            .add_observer(systems::buy_tx_speed)
            .add_observer(systems::buy_dapps)
            .add_observer(systems::buy_l2);
    }
}
