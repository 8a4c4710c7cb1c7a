//! Chain and block store, plus the L2 pipeline that batches sequenced L2
//! blocks into DA and proof transactions on the base chain.

mod store;
pub mod systems;

#[cfg(test)]
mod tests;

pub use store::*;

use {
    bevy::prelude::*,
    chain_components::{ChainId, TxTypeId},
};

/// Adds one transaction of the given type to the chain's working block.
#[derive(Event, Debug, Clone, Copy)]
pub struct AddTransaction {
    pub chain_id: ChainId,
    pub type_id: TxTypeId,
    pub is_dapp: bool,
}

/// A mine/sequence click on a chain's built working block.
#[derive(Event, Debug, Clone, Copy)]
pub struct ConfirmClick {
    pub chain_id: ChainId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct StoreDa;

#[derive(Event, Debug, Clone, Copy)]
pub struct ProveBlocks;

pub struct ChainsPlugin;

impl Plugin for ChainsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Chains>()
            .add_systems(Startup, systems::start_new_game)
            .add_observer(systems::add_transaction)
            .add_observer(systems::confirm_click)
            .add_observer(systems::store_da)
            .add_observer(systems::prove_blocks)
            .add_observer(systems::on_l2_activated);
    }
}
