use {
    bevy::prelude::Resource,
    chain_components::{
        Block, BlockFullError, BlockId, Chain, ChainId, L1_CHAIN_ID, L2Aggregate, Transaction,
    },
    game_config::{ChainConfig, GameConfig, UpgradeEffect},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ChainError {
    #[error("chain {0} does not exist")]
    UnknownChain(ChainId),
    #[error(transparent)]
    BlockFull(#[from] BlockFullError),
    #[error("working block of chain {0} is not built yet")]
    NotBuilt(ChainId),
    #[error("{0} aggregate is not built yet")]
    AggregateNotBuilt(AggregateKind),
    #[error("L2 pipeline is not active")]
    L2Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Da,
    Prover,
}

impl std::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateKind::Da => f.write_str("DA"),
            AggregateKind::Prover => f.write_str("prover"),
        }
    }
}

/// State of a working block after a confirm click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickProgress {
    pub clicks: u32,
    pub difficulty: u32,
}

impl ClickProgress {
    pub fn ratio(&self) -> f64 {
        (self.clicks as f64 / self.difficulty as f64).min(1.0)
    }

    pub fn is_done(&self) -> bool {
        self.clicks >= self.difficulty
    }
}

/// DA and prover batches fed by L2 blocks. Present once L2 is bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L2Pipeline {
    pub da: L2Aggregate,
    pub prover: L2Aggregate,
}

impl L2Pipeline {
    pub fn aggregate_mut(&mut self, kind: AggregateKind) -> &mut L2Aggregate {
        match kind {
            AggregateKind::Da => &mut self.da,
            AggregateKind::Prover => &mut self.prover,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chains {
    pub chains: BTreeMap<ChainId, Chain>,
    pub l2: Option<L2Pipeline>,
}

/// Capacity of fresh blocks before any BlockSize upgrade.
pub fn base_block_size(config: &GameConfig) -> u32 {
    config
        .upgrade_by_effect(UpgradeEffect::BlockSize)
        .map(|upgrade| block_size(upgrade.table.base_value()))
        .unwrap_or(0)
}

pub fn block_size(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Clicks needed to finalize a built block, at least one.
pub fn difficulty(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

fn first_block(chain: &ChainConfig, block_size: u32) -> Block {
    match chain.genesis_reward {
        Some(reward) => Block::genesis(reward),
        None => Block::new(0, block_size),
    }
}

impl Chains {
    /// Only the base chain exists in a new game.
    pub fn new_game(config: &GameConfig) -> Self {
        let mut chains = Self::default();
        if let Some(l1) = config.chain(L1_CHAIN_ID) {
            chains.open_chain(l1, base_block_size(config));
        }
        chains
    }

    pub fn open_chain(&mut self, config: &ChainConfig, block_size: u32) {
        self.chains.entry(config.chain_id).or_insert_with(|| {
            Chain::new(
                config.chain_id,
                first_block(config, block_size),
                config.history_len,
            )
        });
    }

    pub fn open_l2_pipeline(&mut self, da_max_size: u32, prover_max_size: u32) {
        self.l2.get_or_insert_with(|| L2Pipeline {
            da: L2Aggregate::new(da_max_size),
            prover: L2Aggregate::new(prover_max_size),
        });
    }

    pub fn chain(&self, chain_id: ChainId) -> Option<&Chain> {
        self.chains.get(&chain_id)
    }

    fn chain_mut(&mut self, chain_id: ChainId) -> Result<&mut Chain, ChainError> {
        self.chains
            .get_mut(&chain_id)
            .ok_or(ChainError::UnknownChain(chain_id))
    }

    pub fn working_block(&self, chain_id: ChainId) -> Option<&Block> {
        self.chain(chain_id).map(|chain| &chain.working_block)
    }

    pub fn is_built(&self, chain_id: ChainId) -> bool {
        self.working_block(chain_id)
            .is_some_and(|block| block.is_built)
    }

    /// Appends `tx` to the working block, returning its new fill ratio.
    pub fn add_transaction(&mut self, chain_id: ChainId, tx: Transaction) -> Result<f64, ChainError> {
        let block = &mut self.chain_mut(chain_id)?.working_block;
        block.try_add(tx)?;
        Ok(block.progress())
    }

    pub fn confirm_click(&mut self, chain_id: ChainId, difficulty: u32) -> Result<ClickProgress, ChainError> {
        let chain = self.chain_mut(chain_id)?;
        if !chain.working_block.is_built {
            return Err(ChainError::NotBuilt(chain_id));
        }
        chain.confirm_clicks += 1;
        Ok(ClickProgress {
            clicks: chain.confirm_clicks,
            difficulty,
        })
    }

    /// Archives the built working block and opens block `id + 1` with
    /// `next_size` capacity.
    pub fn finalize(&mut self, chain_id: ChainId, next_size: u32) -> Result<Block, ChainError> {
        let chain = self.chain_mut(chain_id)?;
        if !chain.working_block.is_built {
            return Err(ChainError::NotBuilt(chain_id));
        }
        let next = Block::new(chain.next_block_id(), next_size);
        Ok(chain.archive(next))
    }

    /// Records a sequenced L2 block in both aggregates. Returns which
    /// aggregates could not take it because they are already built.
    pub fn feed_l2(&mut self, block_id: BlockId, fees: f64) -> Result<Vec<AggregateKind>, ChainError> {
        let l2 = self.l2.as_mut().ok_or(ChainError::L2Inactive)?;
        let mut skipped = Vec::new();
        for kind in [AggregateKind::Da, AggregateKind::Prover] {
            if l2.aggregate_mut(kind).push(block_id, fees).is_err() {
                skipped.push(kind);
            }
        }
        Ok(skipped)
    }

    pub fn aggregate(&self, kind: AggregateKind) -> Option<&L2Aggregate> {
        self.l2.as_ref().map(|l2| match kind {
            AggregateKind::Da => &l2.da,
            AggregateKind::Prover => &l2.prover,
        })
    }

    /// Empties a built aggregate, returning `(block_count, fees)`.
    pub fn flush_aggregate(&mut self, kind: AggregateKind) -> Result<(u32, f64), ChainError> {
        let aggregate = self
            .l2
            .as_mut()
            .ok_or(ChainError::L2Inactive)?
            .aggregate_mut(kind);
        if !aggregate.is_built {
            return Err(ChainError::AggregateNotBuilt(kind));
        }
        Ok(aggregate.flush())
    }
}

/// What finalizing `block` pays: its own reward (or the current block reward)
/// plus its fees boosted by MEV.
pub fn block_payout(block: &Block, block_reward: f64, mev_boost: f64) -> f64 {
    block.reward.unwrap_or(block_reward) + block.fees * mev_boost
}
