use {
    bevy::prelude::Resource,
    chain_components::{ChainId, L1_CHAIN_ID, L2_CHAIN_ID, TxTypeId},
    game_config::{AutomationEffect, GameConfig, UpgradeEffect},
    progression::{Level, LevelTable},
    serde::{Deserialize, Serialize},
    std::collections::{BTreeSet, HashMap},
    thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("already at max level")]
    MaxLevel,
    #[error("already owned")]
    AlreadyOwned,
    #[error("not unlocked yet")]
    Locked,
    #[error("not in config")]
    Unknown,
}

impl From<PurchaseError> for game_events::InvalidPurchaseReason {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::MaxLevel => Self::MaxLevel,
            PurchaseError::AlreadyOwned => Self::AlreadyOwned,
            PurchaseError::Locked => Self::Locked,
            PurchaseError::Unknown => Self::Unknown,
        }
    }
}

/// `chain -> id -> level`; an absent id has never been purchased.
pub type LevelMap<K> = HashMap<ChainId, HashMap<K, u32>>;

fn level_of<K: std::hash::Hash + Eq>(map: &LevelMap<K>, chain_id: ChainId, key: &K) -> Level {
    map.get(&chain_id).and_then(|levels| levels.get(key)).copied()
}

/// Next level and its price, or why there is none.
pub fn plan_purchase(table: &LevelTable, level: Level) -> Result<(u32, f64), PurchaseError> {
    match (table.next_level(level), table.next_cost(level)) {
        (Some(next), Some(cost)) => Ok((next, cost)),
        _ => Err(PurchaseError::MaxLevel),
    }
}

/// Levels of everything bought per chain. Levels only ever go up, and never
/// past the end of their config table.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upgrades {
    pub upgrade_levels: LevelMap<u32>,
    pub automation_levels: LevelMap<u32>,
    pub tx_fee_levels: LevelMap<TxTypeId>,
    pub tx_speed_levels: LevelMap<TxTypeId>,
    pub dapp_fee_levels: LevelMap<TxTypeId>,
    pub dapp_speed_levels: LevelMap<TxTypeId>,
    pub dapps_unlocked: BTreeSet<ChainId>,
    pub l2_unlocked: bool,
}

impl Upgrades {
    /// Fresh save: only the transaction types flagged `unlocked_at_start`.
    pub fn new_game(config: &GameConfig) -> Self {
        let mut upgrades = Self::default();
        for tx in config.transactions.iter().filter(|tx| tx.unlocked_at_start) {
            upgrades
                .tx_fee_levels
                .entry(tx.chain_id)
                .or_default()
                .insert(tx.type_id, 0);
        }
        upgrades
    }

    pub fn is_chain_active(&self, chain_id: ChainId) -> bool {
        chain_id == L1_CHAIN_ID || (chain_id == L2_CHAIN_ID && self.l2_unlocked)
    }

    pub fn upgrade_level(&self, chain_id: ChainId, upgrade_id: u32) -> Level {
        level_of(&self.upgrade_levels, chain_id, &upgrade_id)
    }

    pub fn automation_level(&self, chain_id: ChainId, automation_id: u32) -> Level {
        level_of(&self.automation_levels, chain_id, &automation_id)
    }

    pub fn tx_fee_level(&self, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool) -> Level {
        let map = if is_dapp {
            &self.dapp_fee_levels
        } else {
            &self.tx_fee_levels
        };
        level_of(map, chain_id, &type_id)
    }

    pub fn tx_speed_level(&self, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool) -> Level {
        let map = if is_dapp {
            &self.dapp_speed_levels
        } else {
            &self.tx_speed_levels
        };
        level_of(map, chain_id, &type_id)
    }

    pub fn is_dapps_unlocked(&self, chain_id: ChainId) -> bool {
        self.dapps_unlocked.contains(&chain_id)
    }

    pub fn set_upgrade_level(&mut self, chain_id: ChainId, upgrade_id: u32, level: u32) {
        raise(&mut self.upgrade_levels, chain_id, upgrade_id, level);
    }

    pub fn set_automation_level(&mut self, chain_id: ChainId, automation_id: u32, level: u32) {
        raise(&mut self.automation_levels, chain_id, automation_id, level);
    }

    pub fn set_tx_fee_level(&mut self, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool, level: u32) {
        let map = if is_dapp {
            &mut self.dapp_fee_levels
        } else {
            &mut self.tx_fee_levels
        };
        raise(map, chain_id, type_id, level);
    }

    pub fn set_tx_speed_level(&mut self, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool, level: u32) {
        let map = if is_dapp {
            &mut self.dapp_speed_levels
        } else {
            &mut self.tx_speed_levels
        };
        raise(map, chain_id, type_id, level);
    }

    /// Current effect of the upgrade providing `effect`, or `None` when the
    /// config has no such upgrade.
    pub fn upgrade_value(&self, config: &GameConfig, chain_id: ChainId, effect: UpgradeEffect) -> Option<f64> {
        let upgrade = config.upgrade_by_effect(effect)?;
        Some(upgrade.table.value(self.upgrade_level(chain_id, upgrade.id)))
    }

    /// Actions per second of the automation providing `effect`; 0 when absent.
    pub fn automation_value(&self, config: &GameConfig, chain_id: ChainId, effect: AutomationEffect) -> f64 {
        config
            .automation_by_effect(effect)
            .map(|automation| {
                automation
                    .table
                    .value(self.automation_level(chain_id, automation.id))
            })
            .unwrap_or(0.0)
    }

    /// Fee of a new transaction of this type, `None` while the type is locked.
    pub fn tx_fee(&self, config: &GameConfig, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool) -> Option<f64> {
        let tx = config.tx_type(chain_id, type_id, is_dapp)?;
        let level = self.tx_fee_level(chain_id, type_id, is_dapp)?;
        Some(tx.fee.value(Some(level)))
    }

    pub fn tx_speed(&self, config: &GameConfig, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool) -> f64 {
        config
            .tx_type(chain_id, type_id, is_dapp)
            .map(|tx| tx.speed.value(self.tx_speed_level(chain_id, type_id, is_dapp)))
            .unwrap_or(0.0)
    }
}

fn raise<K: std::hash::Hash + Eq>(map: &mut LevelMap<K>, chain_id: ChainId, key: K, level: u32) {
    let current = map.entry(chain_id).or_default().entry(key).or_insert(level);
    *current = (*current).max(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_unlocks_starting_types() {
        let config = GameConfig::bundled().unwrap();
        let upgrades = Upgrades::new_game(&config);
        assert_eq!(upgrades.tx_fee_level(0, 0, false), Some(0));
        assert_eq!(upgrades.tx_fee_level(0, 1, false), None);
        assert_eq!(upgrades.tx_fee(&config, 0, 0, false), Some(0.1));
        assert_eq!(upgrades.tx_fee(&config, 0, 1, false), None);
    }

    #[test]
    fn test_unpurchased_upgrade_uses_base_value() {
        let config = GameConfig::bundled().unwrap();
        let mut upgrades = Upgrades::default();
        assert_eq!(upgrades.upgrade_value(&config, 0, UpgradeEffect::BlockSize), Some(4.0));

        upgrades.set_upgrade_level(0, 0, 1);
        assert_eq!(upgrades.upgrade_value(&config, 0, UpgradeEffect::BlockSize), Some(8.0));
        // Other chains keep their own levels
        assert_eq!(upgrades.upgrade_value(&config, 1, UpgradeEffect::BlockSize), Some(4.0));
    }

    #[test]
    fn test_levels_never_decrease() {
        let mut upgrades = Upgrades::default();
        upgrades.set_automation_level(0, 0, 2);
        upgrades.set_automation_level(0, 0, 1);
        assert_eq!(upgrades.automation_level(0, 0), Some(2));
    }

    #[test]
    fn test_plan_purchase_rejects_max_level() {
        let table = LevelTable::new(0.0, vec![1.0, 2.0], vec![5.0, 10.0]).unwrap();
        assert_eq!(plan_purchase(&table, None), Ok((0, 5.0)));
        assert_eq!(plan_purchase(&table, Some(0)), Ok((1, 10.0)));
        assert_eq!(plan_purchase(&table, Some(1)), Err(PurchaseError::MaxLevel));
    }

    #[test]
    fn test_l2_chain_inactive_until_unlocked() {
        let mut upgrades = Upgrades::default();
        assert!(upgrades.is_chain_active(L1_CHAIN_ID));
        assert!(!upgrades.is_chain_active(L2_CHAIN_ID));
        upgrades.l2_unlocked = true;
        assert!(upgrades.is_chain_active(L2_CHAIN_ID));
        assert!(!upgrades.is_chain_active(7));
    }
}
