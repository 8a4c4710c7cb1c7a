use {
    chain_components::{ChainId, L2_CHAIN_ID, TxTypeId},
    game_config::GameConfig,
    game_events::GameEvent,
    serde::Serialize,
    std::collections::BTreeMap,
};

/// One backend call: an entrypoint name and its integer arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub action: String,
    pub args: Vec<i64>,
}

impl ActionDescriptor {
    pub fn new(action: &str, args: impl Into<Vec<i64>>) -> Self {
        Self {
            action: action.to_owned(),
            args: args.into(),
        }
    }
}

/// Translates gameplay events into backend actions.
#[derive(Debug, Clone, Default)]
pub struct ActionMapper {
    regular_tx_counts: BTreeMap<ChainId, u32>,
    synthetic_tx_types: [TxTypeId; 2],
}

impl ActionMapper {
    pub fn new(config: &GameConfig) -> Self {
        let regular_tx_counts = config
            .chains
            .iter()
            .map(|chain| (chain.chain_id, config.regular_tx_count(chain.chain_id)))
            .collect();
        Self {
            regular_tx_counts,
            synthetic_tx_types: [config.l2.proof_tx_type_id, config.l2.da_tx_type_id],
        }
    }

    /// Dapp ids live after the chain's regular types in one id space.
    pub fn flat_type_id(&self, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool) -> i64 {
        let offset = if is_dapp {
            self.regular_tx_counts.get(&chain_id).copied().unwrap_or(0)
        } else {
            0
        };
        (type_id + offset) as i64
    }

    pub fn to_action(&self, event: &GameEvent) -> Option<ActionDescriptor> {
        let action = match event {
            GameEvent::TxAdded { chain_id, tx, .. } => {
                // Proof and DA transactions are derived from L2 batches.
                if !tx.is_dapp && self.synthetic_tx_types.contains(&tx.type_id) {
                    return None;
                }
                ActionDescriptor::new(
                    "add_transaction",
                    [
                        *chain_id as i64,
                        self.flat_type_id(*chain_id, tx.type_id, tx.is_dapp),
                    ],
                )
            }
            GameEvent::MineDone { chain_id, .. } | GameEvent::SequenceDone { chain_id, .. } => {
                ActionDescriptor::new("mine_block", [*chain_id as i64])
            }
            GameEvent::ProveDone { .. } => ActionDescriptor::new("prove", [L2_CHAIN_ID as i64]),
            GameEvent::DaDone { .. } => ActionDescriptor::new("store_da", [L2_CHAIN_ID as i64]),
            GameEvent::UpgradePurchased {
                chain_id,
                upgrade_id,
                ..
            } => ActionDescriptor::new("buy_upgrade", [*chain_id as i64, *upgrade_id as i64]),
            GameEvent::AutomationPurchased {
                chain_id,
                automation_id,
                ..
            } => ActionDescriptor::new(
                "buy_automation",
                [*chain_id as i64, *automation_id as i64],
            ),
            GameEvent::TxFeePurchased {
                chain_id,
                type_id,
                is_dapp,
                ..
            } => ActionDescriptor::new(
                "buy_tx_fee",
                [
                    *chain_id as i64,
                    self.flat_type_id(*chain_id, *type_id, *is_dapp),
                ],
            ),
            GameEvent::TxSpeedPurchased {
                chain_id,
                type_id,
                is_dapp,
                ..
            } => ActionDescriptor::new(
                "buy_tx_speed",
                [
                    *chain_id as i64,
                    self.flat_type_id(*chain_id, *type_id, *is_dapp),
                ],
            ),
            GameEvent::DappsPurchased { chain_id } => {
                ActionDescriptor::new("buy_dapps", [*chain_id as i64])
            }
            GameEvent::L2Purchased => ActionDescriptor::new("buy_next_chain", Vec::new()),
            GameEvent::Staked { amount, .. } => {
                ActionDescriptor::new("stake", [amount.round() as i64])
            }
            GameEvent::RewardsClaimed { .. } => ActionDescriptor::new("claim_rewards", Vec::new()),
            GameEvent::StakingValidated { .. } => ActionDescriptor::new("validate_stake", Vec::new()),
            _ => return None,
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chain_components::Transaction};

    fn mapper() -> ActionMapper {
        ActionMapper::new(&GameConfig::bundled().unwrap())
    }

    fn tx_added(tx: Transaction) -> GameEvent {
        GameEvent::TxAdded {
            chain_id: 0,
            tx,
            block_progress: 0.25,
        }
    }

    #[test]
    fn test_dapp_ids_are_offset() {
        let mapper = mapper();
        assert_eq!(
            mapper.to_action(&tx_added(Transaction::new(2, 1.0))),
            Some(ActionDescriptor::new("add_transaction", [0, 2]))
        );
        // Four regular types on chain 0.
        assert_eq!(
            mapper.to_action(&tx_added(Transaction::dapp(1, 1.0))),
            Some(ActionDescriptor::new("add_transaction", [0, 5]))
        );
        assert_eq!(
            mapper.to_action(&GameEvent::TxFeePurchased {
                chain_id: 1,
                type_id: 0,
                is_dapp: true,
                level: 0
            }),
            Some(ActionDescriptor::new("buy_tx_fee", [1, 2]))
        );
    }

    #[test]
    fn test_synthetic_transactions_are_skipped() {
        let mapper = mapper();
        assert_eq!(mapper.to_action(&tx_added(Transaction::new(100, 3.0))), None);
        assert_eq!(mapper.to_action(&tx_added(Transaction::new(101, 3.0))), None);
    }

    #[test]
    fn test_purchases_and_staking_map_to_actions() {
        let mapper = mapper();
        assert_eq!(
            mapper.to_action(&GameEvent::L2Purchased),
            Some(ActionDescriptor::new("buy_next_chain", Vec::new()))
        );
        assert_eq!(
            mapper.to_action(&GameEvent::Staked {
                pool_id: 0,
                amount: 42.0,
                total_staked: 42.0
            }),
            Some(ActionDescriptor::new("stake", [42]))
        );
        assert_eq!(
            mapper.to_action(&GameEvent::UpgradePurchased {
                chain_id: 0,
                upgrade_id: 3,
                level: 1
            }),
            Some(ActionDescriptor::new("buy_upgrade", [0, 3]))
        );
    }

    #[test]
    fn test_feedback_events_have_no_action() {
        let mapper = mapper();
        assert_eq!(mapper.to_action(&GameEvent::BlockFull { chain_id: 0 }), None);
        assert_eq!(
            mapper.to_action(&GameEvent::BuyFailed {
                cost: 1.0,
                balance: 0.0
            }),
            None
        );
    }
}
