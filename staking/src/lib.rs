//! Staking pools: linear yield on staked balance, with a slashing risk for
//! stakes that are not validated in time.

mod store;

pub use store::*;

use {
    bevy::prelude::*,
    game_config::{GameConfig, StakingPoolConfig},
    game_events::GameEvent,
    notifier::NotifyCommandsExt,
    progression::SlashOutcome,
    rand::Rng,
    states::GameState,
    system_schedule::GameSchedule,
    wallet::{credit, try_buy, Wallet},
};

#[derive(Event, Debug, Clone, Copy)]
pub struct Stake {
    pub pool_id: u32,
    pub amount: f64,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ClaimRewards {
    pub pool_id: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ValidateStake {
    pub pool_id: u32,
}

#[derive(Resource, Debug)]
pub struct StakingSweepTimer(pub Timer);

impl StakingSweepTimer {
    pub fn from_config(config: &GameConfig) -> Self {
        Self(Timer::from_seconds(
            config.staking.sweep_interval_secs,
            TimerMode::Repeating,
        ))
    }
}

impl Default for StakingSweepTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(10.0, TimerMode::Repeating))
    }
}

/// Config entry of `pool_id`.
pub fn pool_config(config: &GameConfig, pool_id: u32) -> Result<&StakingPoolConfig, StakingError> {
    config
        .staking_pool(pool_id)
        .ok_or(StakingError::UnknownPool(pool_id))
}

pub fn stake(
    trigger: On<Stake>,
    config: Res<GameConfig>,
    time: Res<Time>,
    mut pools: ResMut<StakingPools>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let Stake { pool_id, amount } = *trigger.event();
    let pool_config = match pool_config(&config, pool_id) {
        Ok(pool_config) => pool_config,
        Err(err) => {
            warn!(%err, "stake rejected");
            return;
        }
    };
    if !amount.is_finite() || amount <= 0.0 {
        warn!(pool_id, amount, "invalid stake amount");
        return;
    }
    if !try_buy(&mut wallet, &mut commands, amount) {
        return;
    }

    match pools.stake(pool_config, amount, time.elapsed_secs_f64()) {
        Ok(pool_total) => {
            info!(pool_id, amount, pool_total, "staked");
            commands.notify(GameEvent::Staked {
                pool_id,
                amount,
                total_staked: pools.total_staked(),
            });
        }
        Err(err) => warn!(pool_id, %err, "stake failed"),
    }
}

pub fn claim_rewards(
    trigger: On<ClaimRewards>,
    config: Res<GameConfig>,
    time: Res<Time>,
    mut pools: ResMut<StakingPools>,
    mut wallet: ResMut<Wallet>,
    mut commands: Commands,
) {
    let pool_id = trigger.event().pool_id;
    let pool_config = match pool_config(&config, pool_id) {
        Ok(pool_config) => pool_config,
        Err(err) => {
            warn!(%err, "nothing claimed");
            return;
        }
    };
    match pools.claim(pool_config, time.elapsed_secs_f64()) {
        Ok(amount) => {
            credit(&mut wallet, &mut commands, amount);
            info!(pool_id, amount, "staking rewards claimed");
            commands.notify(GameEvent::RewardsClaimed { pool_id, amount });
        }
        Err(err) => warn!(pool_id, %err, "nothing claimed"),
    }
}

pub fn validate_stake(
    trigger: On<ValidateStake>,
    time: Res<Time>,
    mut pools: ResMut<StakingPools>,
    mut commands: Commands,
) {
    let pool_id = trigger.event().pool_id;
    match pools.validate(pool_id, time.elapsed_secs_f64()) {
        Ok(()) => commands.notify(GameEvent::StakingValidated { pool_id }),
        Err(err) => warn!(pool_id, %err, "stake not validated"),
    }
}

/// Accrues every pool and rolls for slashing on overdue ones.
pub fn sweep_pools(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut timer: ResMut<StakingSweepTimer>,
    mut pools: ResMut<StakingPools>,
    mut commands: Commands,
) {
    timer.0.tick(time.delta());
    if !timer.0.just_finished() {
        return;
    }

    let now = time.elapsed_secs_f64();
    let mut rng = rand::rng();
    for pool_config in &config.staking.pools {
        let roll = rng.random::<f64>();
        if let SlashOutcome::Slashed { amount } = pools.sweep_pool(pool_config, now, roll) {
            warn!(pool_id = pool_config.pool_id, amount, "stake slashed");
            commands.notify(GameEvent::Slashed {
                pool_id: pool_config.pool_id,
                amount,
            });
        }
    }
}

fn reset_sweep_timer(mut commands: Commands, config: Option<Res<GameConfig>>) {
    if let Some(config) = config {
        commands.insert_resource(StakingSweepTimer::from_config(&config));
    }
}

pub struct StakingPlugin;

impl Plugin for StakingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StakingPools>()
            .init_resource::<StakingSweepTimer>()
            .add_systems(Startup, reset_sweep_timer)
            .add_systems(
                Update,
                sweep_pools
                    .in_set(GameSchedule::Sweep)
                    .run_if(in_state(GameState::Running).and(resource_exists::<GameConfig>)),
            )
            .add_observer(stake)
            .add_observer(claim_rewards)
            .add_observer(validate_stake);
    }
}
