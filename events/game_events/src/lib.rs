//! Gameplay events fanned out by the notifier.
//!
//! Every store action that changes game state ends by notifying one of these
//! variants. Observers match on the variant they care about and ignore the
//! rest, so a new variant is a compile-time change rather than a new string.

use chain_components::{Block, ChainId, Transaction, TxTypeId};

/// Something the player tried to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurchaseItem {
    Upgrade { chain_id: ChainId, upgrade_id: u32 },
    Automation { chain_id: ChainId, automation_id: u32 },
    TxFee { chain_id: ChainId, type_id: TxTypeId, is_dapp: bool },
    TxSpeed { chain_id: ChainId, type_id: TxTypeId, is_dapp: bool },
    Dapps { chain_id: ChainId },
    L2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidPurchaseReason {
    MaxLevel,
    AlreadyOwned,
    Locked,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TxAdded {
        chain_id: ChainId,
        tx: Transaction,
        /// Working block fill ratio after the add.
        block_progress: f64,
    },
    BlockFull {
        chain_id: ChainId,
    },
    MineClicked {
        chain_id: ChainId,
        /// Confirm click progress towards the difficulty, in `[0, 1]`.
        progress: f64,
    },
    MineDone {
        chain_id: ChainId,
        block: Block,
    },
    SequenceDone {
        chain_id: ChainId,
        block: Block,
    },
    ProveDone {
        block_count: u32,
        fees: f64,
    },
    DaDone {
        block_count: u32,
        fees: f64,
    },
    BalanceUpdated {
        balance: f64,
    },
    BuyFailed {
        cost: f64,
        balance: f64,
    },
    InvalidPurchase {
        item: PurchaseItem,
        reason: InvalidPurchaseReason,
    },
    UpgradePurchased {
        chain_id: ChainId,
        upgrade_id: u32,
        level: u32,
    },
    AutomationPurchased {
        chain_id: ChainId,
        automation_id: u32,
        level: u32,
    },
    TxFeePurchased {
        chain_id: ChainId,
        type_id: TxTypeId,
        is_dapp: bool,
        level: u32,
    },
    TxSpeedPurchased {
        chain_id: ChainId,
        type_id: TxTypeId,
        is_dapp: bool,
        level: u32,
    },
    DappsPurchased {
        chain_id: ChainId,
    },
    L2Purchased,
    Staked {
        pool_id: u32,
        amount: f64,
        total_staked: f64,
    },
    StakingValidated {
        pool_id: u32,
    },
    RewardsClaimed {
        pool_id: u32,
        amount: f64,
    },
    Slashed {
        pool_id: u32,
        amount: f64,
    },
    AchievementCompleted {
        achievement_id: u32,
    },
}

/// Payload-free discriminant of [`GameEvent`], usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameEventKind {
    TxAdded,
    BlockFull,
    MineClicked,
    MineDone,
    SequenceDone,
    ProveDone,
    DaDone,
    BalanceUpdated,
    BuyFailed,
    InvalidPurchase,
    UpgradePurchased,
    AutomationPurchased,
    TxFeePurchased,
    TxSpeedPurchased,
    DappsPurchased,
    L2Purchased,
    Staked,
    StakingValidated,
    RewardsClaimed,
    Slashed,
    AchievementCompleted,
}

impl GameEventKind {
    pub fn name(self) -> &'static str {
        match self {
            GameEventKind::TxAdded => "TxAdded",
            GameEventKind::BlockFull => "BlockFull",
            GameEventKind::MineClicked => "MineClicked",
            GameEventKind::MineDone => "MineDone",
            GameEventKind::SequenceDone => "SequenceDone",
            GameEventKind::ProveDone => "ProveDone",
            GameEventKind::DaDone => "DaDone",
            GameEventKind::BalanceUpdated => "BalanceUpdated",
            GameEventKind::BuyFailed => "BuyFailed",
            GameEventKind::InvalidPurchase => "InvalidPurchase",
            GameEventKind::UpgradePurchased => "UpgradePurchased",
            GameEventKind::AutomationPurchased => "AutomationPurchased",
            GameEventKind::TxFeePurchased => "TxFeePurchased",
            GameEventKind::TxSpeedPurchased => "TxSpeedPurchased",
            GameEventKind::DappsPurchased => "DappsPurchased",
            GameEventKind::L2Purchased => "L2Purchased",
            GameEventKind::Staked => "Staked",
            GameEventKind::StakingValidated => "StakingValidated",
            GameEventKind::RewardsClaimed => "RewardsClaimed",
            GameEventKind::Slashed => "Slashed",
            GameEventKind::AchievementCompleted => "AchievementCompleted",
        }
    }
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::TxAdded { .. } => GameEventKind::TxAdded,
            GameEvent::BlockFull { .. } => GameEventKind::BlockFull,
            GameEvent::MineClicked { .. } => GameEventKind::MineClicked,
            GameEvent::MineDone { .. } => GameEventKind::MineDone,
            GameEvent::SequenceDone { .. } => GameEventKind::SequenceDone,
            GameEvent::ProveDone { .. } => GameEventKind::ProveDone,
            GameEvent::DaDone { .. } => GameEventKind::DaDone,
            GameEvent::BalanceUpdated { .. } => GameEventKind::BalanceUpdated,
            GameEvent::BuyFailed { .. } => GameEventKind::BuyFailed,
            GameEvent::InvalidPurchase { .. } => GameEventKind::InvalidPurchase,
            GameEvent::UpgradePurchased { .. } => GameEventKind::UpgradePurchased,
            GameEvent::AutomationPurchased { .. } => GameEventKind::AutomationPurchased,
            GameEvent::TxFeePurchased { .. } => GameEventKind::TxFeePurchased,
            GameEvent::TxSpeedPurchased { .. } => GameEventKind::TxSpeedPurchased,
            GameEvent::DappsPurchased { .. } => GameEventKind::DappsPurchased,
            GameEvent::L2Purchased => GameEventKind::L2Purchased,
            GameEvent::Staked { .. } => GameEventKind::Staked,
            GameEvent::StakingValidated { .. } => GameEventKind::StakingValidated,
            GameEvent::RewardsClaimed { .. } => GameEventKind::RewardsClaimed,
            GameEvent::Slashed { .. } => GameEventKind::Slashed,
            GameEvent::AchievementCompleted { .. } => GameEventKind::AchievementCompleted,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Successful purchases. Observers that debounce negative feedback reset
    /// their counters on these.
    pub fn is_purchase(&self) -> bool {
        matches!(
            self,
            GameEvent::UpgradePurchased { .. }
                | GameEvent::AutomationPurchased { .. }
                | GameEvent::TxFeePurchased { .. }
                | GameEvent::TxSpeedPurchased { .. }
                | GameEvent::DappsPurchased { .. }
                | GameEvent::L2Purchased
                | GameEvent::Staked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chain_components::Transaction};

    #[test]
    fn test_kind_and_name() {
        let event = GameEvent::TxAdded {
            chain_id: 0,
            tx: Transaction::new(1, 2.0),
            block_progress: 0.5,
        };
        assert_eq!(event.kind(), GameEventKind::TxAdded);
        assert_eq!(event.name(), "TxAdded");
        assert!(!event.is_purchase());
    }

    #[test]
    fn test_purchases_are_flagged() {
        assert!(GameEvent::L2Purchased.is_purchase());
        assert!(
            GameEvent::UpgradePurchased {
                chain_id: 0,
                upgrade_id: 1,
                level: 0
            }
            .is_purchase()
        );
        assert!(!GameEvent::BuyFailed { cost: 1.0, balance: 0.0 }.is_purchase());
    }
}
