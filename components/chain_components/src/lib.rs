//! Plain data owned by the chain store: transactions, blocks, chains and the
//! L2 batching aggregates. Nothing here knows about the event bus.

use {
    serde::{Deserialize, Serialize},
    std::collections::VecDeque,
    thiserror::Error,
};

pub type ChainId = u32;
pub type BlockId = u64;
pub type TxTypeId = u32;

/// Chain 0 is the base chain every other chain settles into.
pub const L1_CHAIN_ID: ChainId = 0;
pub const L2_CHAIN_ID: ChainId = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub type_id: TxTypeId,
    pub fee: f64,
    #[serde(default)]
    pub is_dapp: bool,
}

impl Transaction {
    pub fn new(type_id: TxTypeId, fee: f64) -> Self {
        Self {
            type_id,
            fee,
            is_dapp: false,
        }
    }

    pub fn dapp(type_id: TxTypeId, fee: f64) -> Self {
        Self {
            type_id,
            fee,
            is_dapp: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("block {block_id} is full ({max_size} transactions)")]
pub struct BlockFullError {
    pub block_id: BlockId,
    pub max_size: u32,
}

/// A chain's working block.
///
/// Lifecycle: empty -> accumulating -> built (capacity reached) -> finalized
/// (archived by [`Chain::archive`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub block_id: BlockId,
    pub fees: f64,
    pub transactions: Vec<Transaction>,
    pub max_size: u32,
    pub is_built: bool,
    /// Fixed reward carried by the block itself (genesis). Other blocks are
    /// rewarded from the current upgrade levels when finalized.
    pub reward: Option<f64>,
}

impl Block {
    /// A zero-capacity block is built as soon as it exists.
    pub fn new(block_id: BlockId, max_size: u32) -> Self {
        Self {
            block_id,
            fees: 0.0,
            transactions: Vec::new(),
            max_size,
            is_built: max_size == 0,
            reward: None,
        }
    }

    pub fn genesis(reward: f64) -> Self {
        Self {
            reward: Some(reward),
            ..Self::new(0, 0)
        }
    }

    pub fn try_add(&mut self, tx: Transaction) -> Result<(), BlockFullError> {
        if self.is_built || self.transactions.len() >= self.max_size as usize {
            return Err(BlockFullError {
                block_id: self.block_id,
                max_size: self.max_size,
            });
        }
        self.fees += tx.fee;
        self.transactions.push(tx);
        self.is_built = self.transactions.len() == self.max_size as usize;
        Ok(())
    }

    /// Fill ratio in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.max_size == 0 {
            return 1.0;
        }
        self.transactions.len() as f64 / self.max_size as f64
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub chain_id: ChainId,
    pub working_block: Block,
    /// Most recent finalized blocks, newest first.
    pub blocks: VecDeque<Block>,
    pub history_len: usize,
    /// Confirm clicks spent on the current built block.
    pub confirm_clicks: u32,
}

impl Chain {
    pub fn new(chain_id: ChainId, working_block: Block, history_len: usize) -> Self {
        Self {
            chain_id,
            working_block,
            blocks: VecDeque::with_capacity(history_len),
            history_len,
            confirm_clicks: 0,
        }
    }

    pub fn next_block_id(&self) -> BlockId {
        self.working_block.block_id + 1
    }

    /// Replaces the working block with `next` and pushes the old one onto the
    /// bounded history. Returns a copy of the finalized block.
    pub fn archive(&mut self, next: Block) -> Block {
        let finalized = std::mem::replace(&mut self.working_block, next);
        self.confirm_clicks = 0;
        self.blocks.push_front(finalized.clone());
        self.blocks.truncate(self.history_len);
        finalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("aggregate already holds {max_size} blocks")]
pub struct AggregateFullError {
    pub max_size: u32,
}

/// DA or prover batch: collects finalized L2 blocks until `max_size`, then is
/// flushed into a single synthetic L1 transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L2Aggregate {
    pub blocks: Vec<BlockId>,
    pub block_fees: f64,
    pub max_size: u32,
    pub is_built: bool,
}

impl L2Aggregate {
    pub fn new(max_size: u32) -> Self {
        Self {
            blocks: Vec::new(),
            block_fees: 0.0,
            max_size,
            is_built: max_size == 0,
        }
    }

    pub fn push(&mut self, block_id: BlockId, fees: f64) -> Result<(), AggregateFullError> {
        if self.is_built {
            return Err(AggregateFullError {
                max_size: self.max_size,
            });
        }
        self.blocks.push(block_id);
        self.block_fees += fees;
        self.is_built = self.blocks.len() >= self.max_size as usize;
        Ok(())
    }

    /// Empties the aggregate, returning `(block_count, fees)` of what it held.
    pub fn flush(&mut self) -> (u32, f64) {
        let flushed = (self.blocks.len() as u32, self.block_fees);
        *self = Self::new(self.max_size);
        flushed
    }
}
