//! Read-only game balance data.
//!
//! Everything numeric the stores and calculators consume (upgrade tables,
//! transaction fees, staking parameters, achievements, tutorial copy) comes
//! from a single RON document. A default document is compiled in; a file on
//! disk can replace it.

use {
    bevy::prelude::*,
    chain_components::{ChainId, TxTypeId},
    progression::LevelTable,
    serde::Deserialize,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

const BUNDLED_CONFIG: &str = include_str!("../game_config.ron");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: ChainId,
    pub name: String,
    /// Reward of the pre-built block 0. Chains without one start with an
    /// empty working block.
    #[serde(default)]
    pub genesis_reward: Option<f64>,
    pub history_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxTypeConfig {
    pub type_id: TxTypeId,
    pub chain_id: ChainId,
    pub name: String,
    /// Fee per transaction by fee level.
    pub fee: LevelTable,
    /// Transactions added per second by speed level.
    pub speed: LevelTable,
    #[serde(default)]
    pub unlocked_at_start: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum UpgradeEffect {
    /// Capacity of newly created working blocks.
    BlockSize,
    /// Reward paid when a block without its own reward is finalized.
    BlockReward,
    /// Confirm clicks needed to finalize a built block.
    BlockDifficulty,
    /// Multiplier applied to collected fees.
    MevBoost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeConfig {
    pub id: u32,
    pub name: String,
    pub effect: UpgradeEffect,
    pub table: LevelTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum AutomationEffect {
    /// Confirm clicks per second on the chain's working block.
    Miner,
    /// Prover flushes per second once the prover aggregate is built.
    Prover,
    /// DA flushes per second once the DA aggregate is built.
    DataAvailability,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutomationConfig {
    pub id: u32,
    pub name: String,
    pub effect: AutomationEffect,
    pub table: LevelTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct L2Config {
    pub cost: f64,
    pub da_max_size: u32,
    pub prover_max_size: u32,
    pub proof_tx_type_id: TxTypeId,
    pub da_tx_type_id: TxTypeId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakingPoolConfig {
    pub pool_id: u32,
    pub name: String,
    /// APY in percent.
    pub yield_multiplier: f64,
    pub due_time_secs: f64,
    pub slashing_fraction: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakingConfig {
    pub pools: Vec<StakingPoolConfig>,
    pub sweep_interval_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum AchievementCondition {
    BalanceAtLeast { target: f64 },
    BlocksMined { chain_id: ChainId, target: u32 },
    UpgradeMaxed { chain_id: ChainId, upgrade_id: u32 },
    AutomationMaxed { chain_id: ChainId, automation_id: u32 },
    L2Unlocked,
    DappsUnlocked { chain_id: ChainId },
    StakedAtLeast { target: f64 },
    ProofsSubmitted { target: u32 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AchievementConfig {
    pub id: u32,
    pub name: String,
    pub condition: AchievementCondition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TutorialStepConfig {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoundConfig {
    pub min_pitch_shift: f32,
    pub max_pitch_shift: f32,
    /// Pitch added per order of magnitude of a transaction's fee.
    pub fee_pitch_step: f32,
    /// Consecutive `BlockFull` events before one is voiced.
    pub block_full_threshold: u32,
    pub effect_volume: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub duration_secs: f32,
    pub max_active: usize,
    pub block_full_threshold: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxBatchConfig {
    pub batch_interval_secs: f32,
    pub max_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveConfig {
    pub directory: PathBuf,
    pub autosave_interval_secs: f32,
}

#[derive(Resource, Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub chains: Vec<ChainConfig>,
    pub transactions: Vec<TxTypeConfig>,
    pub dapps: Vec<TxTypeConfig>,
    pub upgrades: Vec<UpgradeConfig>,
    pub automations: Vec<AutomationConfig>,
    pub l2: L2Config,
    pub dapps_unlock_cost: f64,
    pub staking: StakingConfig,
    pub achievements: Vec<AchievementConfig>,
    pub tutorial: Vec<TutorialStepConfig>,
    pub sound: SoundConfig,
    pub notifications: NotificationConfig,
    pub tx_batching: TxBatchConfig,
    pub save: SaveConfig,
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// The config compiled into the binary.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_ron_str(BUNDLED_CONFIG)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chain(chain_components::L1_CHAIN_ID).is_none() {
            return Err(ConfigError::Invalid("chain 0 is not configured".into()));
        }
        for effect in [
            UpgradeEffect::BlockSize,
            UpgradeEffect::BlockReward,
            UpgradeEffect::BlockDifficulty,
        ] {
            if self.upgrade_by_effect(effect).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "no upgrade provides {effect:?}"
                )));
            }
        }
        let synthetic = [self.l2.proof_tx_type_id, self.l2.da_tx_type_id];
        if let Some(clash) = self
            .transactions
            .iter()
            .find(|tx| tx.chain_id == chain_components::L1_CHAIN_ID && synthetic.contains(&tx.type_id))
        {
            return Err(ConfigError::Invalid(format!(
                "transaction type {} clashes with a synthetic L2 type id",
                clash.type_id
            )));
        }
        Ok(())
    }

    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|chain| chain.chain_id == chain_id)
    }

    pub fn tx_type(&self, chain_id: ChainId, type_id: TxTypeId, is_dapp: bool) -> Option<&TxTypeConfig> {
        let types = if is_dapp { &self.dapps } else { &self.transactions };
        types
            .iter()
            .find(|tx| tx.chain_id == chain_id && tx.type_id == type_id)
    }

    pub fn tx_types(&self, chain_id: ChainId, is_dapp: bool) -> impl Iterator<Item = &TxTypeConfig> {
        let types = if is_dapp { &self.dapps } else { &self.transactions };
        types.iter().filter(move |tx| tx.chain_id == chain_id)
    }

    /// Number of non-dapp transaction types on a chain. Dapp ids are offset by
    /// this to form one flat id space.
    pub fn regular_tx_count(&self, chain_id: ChainId) -> u32 {
        self.tx_types(chain_id, false).count() as u32
    }

    pub fn upgrade(&self, id: u32) -> Option<&UpgradeConfig> {
        self.upgrades.iter().find(|upgrade| upgrade.id == id)
    }

    pub fn upgrade_by_effect(&self, effect: UpgradeEffect) -> Option<&UpgradeConfig> {
        self.upgrades.iter().find(|upgrade| upgrade.effect == effect)
    }

    pub fn automation(&self, id: u32) -> Option<&AutomationConfig> {
        self.automations.iter().find(|automation| automation.id == id)
    }

    pub fn automation_by_effect(&self, effect: AutomationEffect) -> Option<&AutomationConfig> {
        self.automations
            .iter()
            .find(|automation| automation.effect == effect)
    }

    pub fn staking_pool(&self, pool_id: u32) -> Option<&StakingPoolConfig> {
        self.staking.pools.iter().find(|pool| pool.pool_id == pool_id)
    }
}

/// Inserts [`GameConfig`] from `path`, falling back to the bundled document.
#[derive(Default)]
pub struct GameConfigPlugin {
    pub path: Option<PathBuf>,
}

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        let loaded = match &self.path {
            Some(path) => GameConfig::load(path).or_else(|err| {
                warn!(path = %path.display(), %err, "falling back to bundled config");
                GameConfig::bundled()
            }),
            None => GameConfig::bundled(),
        };

        match loaded {
            Ok(config) => {
                info!(
                    chains = config.chains.len(),
                    upgrades = config.upgrades.len(),
                    achievements = config.achievements.len(),
                    "game config loaded"
                );
                app.insert_resource(config);
            }
            Err(err) => error!(%err, "no usable game config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_config_parses() {
        let config = GameConfig::bundled().expect("bundled config should be valid");
        assert!(config.chain(0).is_some());
        assert_eq!(config.chain(0).unwrap().genesis_reward, Some(1.0));
        assert!(config.upgrade_by_effect(UpgradeEffect::BlockSize).is_some());
        assert!(config.staking_pool(0).is_some());
        assert_eq!(config.tutorial.len(), 2);
        assert_eq!(config.sound.block_full_threshold, 3);
    }

    #[test]
    fn test_regular_tx_count_excludes_dapps() {
        let config = GameConfig::bundled().unwrap();
        assert_eq!(config.regular_tx_count(0), 4);
        assert!(config.tx_type(0, 0, true).is_some());
        assert!(config.tx_type(0, config.l2.proof_tx_type_id, false).is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = GameConfig::from_ron_str("(chains: 5)").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
