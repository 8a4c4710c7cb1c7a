use {
    bevy::prelude::Resource,
    game_config::StakingPoolConfig,
    progression::{slash_check, staking_reward, SlashOutcome},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StakingError {
    #[error("staking pool {0} is not configured")]
    UnknownPool(u32),
    #[error("invalid stake amount {0}")]
    InvalidAmount(f64),
    #[error("pool {0} has no rewards to claim")]
    NothingToClaim(u32),
    #[error("pool {0} has nothing staked")]
    NothingStaked(u32),
}

/// Times are seconds on the game clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingPool {
    pub staked_amount: f64,
    pub last_update_secs: f64,
    pub last_validation_secs: f64,
    pub reward_accrued: f64,
}

impl StakingPool {
    /// Folds the reward earned since the last update into `reward_accrued`.
    pub fn accrue(&mut self, yield_multiplier: f64, now: f64) {
        self.reward_accrued += staking_reward(
            self.staked_amount,
            yield_multiplier,
            now - self.last_update_secs,
        );
        self.last_update_secs = now;
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingPools {
    pub pools: BTreeMap<u32, StakingPool>,
}

impl StakingPools {
    pub fn pool(&self, pool_id: u32) -> Option<&StakingPool> {
        self.pools.get(&pool_id)
    }

    pub fn total_staked(&self) -> f64 {
        self.pools.values().map(|pool| pool.staked_amount).sum()
    }

    /// Adds `amount` to the pool. The first stake starts the validation
    /// clock. Returns the pool's new total.
    pub fn stake(&mut self, config: &StakingPoolConfig, amount: f64, now: f64) -> Result<f64, StakingError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(StakingError::InvalidAmount(amount));
        }
        let pool = self.pools.entry(config.pool_id).or_default();
        if pool.staked_amount <= 0.0 {
            pool.last_update_secs = now;
            pool.last_validation_secs = now;
        }
        pool.accrue(config.yield_multiplier, now);
        pool.staked_amount += amount;
        Ok(pool.staked_amount)
    }

    /// Takes the whole accrued reward out of the pool.
    pub fn claim(&mut self, config: &StakingPoolConfig, now: f64) -> Result<f64, StakingError> {
        let pool = self
            .pools
            .get_mut(&config.pool_id)
            .ok_or(StakingError::NothingToClaim(config.pool_id))?;
        pool.accrue(config.yield_multiplier, now);
        if pool.reward_accrued <= 0.0 {
            return Err(StakingError::NothingToClaim(config.pool_id));
        }
        Ok(std::mem::take(&mut pool.reward_accrued))
    }

    pub fn validate(&mut self, pool_id: u32, now: f64) -> Result<(), StakingError> {
        let pool = self
            .pools
            .get_mut(&pool_id)
            .filter(|pool| pool.staked_amount > 0.0)
            .ok_or(StakingError::NothingStaked(pool_id))?;
        pool.last_validation_secs = now;
        Ok(())
    }

    /// Accrues and runs the slashing check on one pool. Once overdue the
    /// validation clock restarts whether or not the stake was slashed.
    pub fn sweep_pool(&mut self, config: &StakingPoolConfig, now: f64, roll: f64) -> SlashOutcome {
        let Some(pool) = self.pools.get_mut(&config.pool_id) else {
            return SlashOutcome::NotDue;
        };
        if pool.staked_amount <= 0.0 {
            return SlashOutcome::NotDue;
        }
        pool.accrue(config.yield_multiplier, now);

        let outcome = slash_check(
            now - pool.last_validation_secs,
            config.due_time_secs,
            config.slashing_fraction,
            pool.staked_amount,
            roll,
        );
        match outcome {
            SlashOutcome::NotDue => {}
            SlashOutcome::Spared => pool.last_validation_secs = now,
            SlashOutcome::Slashed { amount } => {
                pool.staked_amount = (pool.staked_amount - amount).max(0.0);
                pool.last_validation_secs = now;
            }
        }
        outcome
    }

    /// Moves every clock to `now`, e.g. after loading a save taken on another
    /// game clock. Time spent offline neither earns nor counts as overdue.
    pub fn rebase(&mut self, now: f64) {
        for pool in self.pools.values_mut() {
            pool.last_update_secs = now;
            pool.last_validation_secs = now;
        }
    }
}
