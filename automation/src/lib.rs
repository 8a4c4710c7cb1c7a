//! Purchased automations acting on their own: auto-miners clicking built
//! blocks, transaction speed levels sending transactions, and the L2 prover
//! and DA flushing built aggregates.

use {
    bevy::prelude::*,
    chain_components::{ChainId, TxTypeId},
    chains::{AddTransaction, AggregateKind, Chains, ConfirmClick, ProveBlocks, StoreDa},
    game_config::{AutomationEffect, GameConfig},
    states::GameState,
    std::{collections::BTreeMap, time::Duration},
    system_schedule::GameSchedule,
    upgrades::Upgrades,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAction {
    Click(ChainId),
    AddTransaction {
        chain_id: ChainId,
        type_id: TxTypeId,
        is_dapp: bool,
    },
    Prove,
    StoreDa,
}

/// Repeating timer firing `rate` times per second; `None` when idle.
fn rate_timer(rate: f64) -> Option<Timer> {
    (rate > 0.0).then(|| Timer::from_seconds((1.0 / rate) as f32, TimerMode::Repeating))
}

/// A faster new rate fires on the next tick instead of overshooting.
fn carry_elapsed(timer: &mut Timer, previous: Option<&Timer>) {
    if let Some(previous) = previous {
        timer.set_elapsed(previous.elapsed().min(timer.duration()));
    }
}

#[derive(Resource, Debug, Default)]
pub struct AutomationTimers {
    miners: BTreeMap<ChainId, Timer>,
    tx_speed: BTreeMap<(ChainId, TxTypeId, bool), Timer>,
    prover: Option<Timer>,
    da: Option<Timer>,
}

impl AutomationTimers {
    /// Timers for every automation and speed level currently owned.
    pub fn from_levels(config: &GameConfig, upgrades: &Upgrades) -> Self {
        let mut timers = Self::default();
        for chain in &config.chains {
            let chain_id = chain.chain_id;
            if !upgrades.is_chain_active(chain_id) {
                continue;
            }
            let miner = upgrades.automation_value(config, chain_id, AutomationEffect::Miner);
            if let Some(timer) = rate_timer(miner) {
                timers.miners.insert(chain_id, timer);
            }
            for is_dapp in [false, true] {
                for tx in config.tx_types(chain_id, is_dapp) {
                    let speed = upgrades.tx_speed(config, chain_id, tx.type_id, is_dapp);
                    if let Some(timer) = rate_timer(speed) {
                        timers.tx_speed.insert((chain_id, tx.type_id, is_dapp), timer);
                    }
                }
            }
        }
        if upgrades.l2_unlocked {
            let chain_id = chain_components::L2_CHAIN_ID;
            timers.prover = rate_timer(upgrades.automation_value(config, chain_id, AutomationEffect::Prover));
            timers.da = rate_timer(upgrades.automation_value(
                config,
                chain_id,
                AutomationEffect::DataAvailability,
            ));
        }
        timers
    }

    /// Keeps the progress of timers that exist in both sets, so buying one
    /// level does not restart every other automation.
    pub fn carry_progress_from(mut self, previous: &Self) -> Self {
        for (chain_id, timer) in self.miners.iter_mut() {
            carry_elapsed(timer, previous.miners.get(chain_id));
        }
        for (key, timer) in self.tx_speed.iter_mut() {
            carry_elapsed(timer, previous.tx_speed.get(key));
        }
        if let Some(timer) = self.prover.as_mut() {
            carry_elapsed(timer, previous.prover.as_ref());
        }
        if let Some(timer) = self.da.as_mut() {
            carry_elapsed(timer, previous.da.as_ref());
        }
        self
    }

    pub fn is_idle(&self) -> bool {
        self.miners.is_empty() && self.tx_speed.is_empty() && self.prover.is_none() && self.da.is_none()
    }

    /// Advances every timer and lists what came due, one entry per firing.
    pub fn tick(&mut self, delta: Duration) -> Vec<AutoAction> {
        let mut due = Vec::new();
        for (chain_id, timer) in self.miners.iter_mut() {
            timer.tick(delta);
            for _ in 0..timer.times_finished_this_tick() {
                due.push(AutoAction::Click(*chain_id));
            }
        }
        for ((chain_id, type_id, is_dapp), timer) in self.tx_speed.iter_mut() {
            timer.tick(delta);
            for _ in 0..timer.times_finished_this_tick() {
                due.push(AutoAction::AddTransaction {
                    chain_id: *chain_id,
                    type_id: *type_id,
                    is_dapp: *is_dapp,
                });
            }
        }
        for (timer, action) in [(&mut self.prover, AutoAction::Prove), (&mut self.da, AutoAction::StoreDa)] {
            if let Some(timer) = timer {
                timer.tick(delta);
                if timer.just_finished() {
                    due.push(action);
                }
            }
        }
        due
    }
}

pub fn rebuild_timers(config: Res<GameConfig>, upgrades: Res<Upgrades>, mut timers: ResMut<AutomationTimers>) {
    let rebuilt = AutomationTimers::from_levels(&config, &upgrades).carry_progress_from(&timers);
    *timers = rebuilt;
    debug!(idle = timers.is_idle(), "automation timers rebuilt");
}

pub fn run_automations(
    time: Res<Time>,
    chains: Res<Chains>,
    mut timers: ResMut<AutomationTimers>,
    mut commands: Commands,
) {
    for action in timers.tick(time.delta()) {
        match action {
            // Clicks on an open block would be wasted.
            AutoAction::Click(chain_id) if chains.is_built(chain_id) => {
                commands.trigger(ConfirmClick { chain_id });
            }
            AutoAction::Click(_) => {}
            AutoAction::AddTransaction {
                chain_id,
                type_id,
                is_dapp,
            } => commands.trigger(AddTransaction {
                chain_id,
                type_id,
                is_dapp,
            }),
            AutoAction::Prove if aggregate_built(&chains, AggregateKind::Prover) => {
                commands.trigger(ProveBlocks);
            }
            AutoAction::StoreDa if aggregate_built(&chains, AggregateKind::Da) => {
                commands.trigger(StoreDa);
            }
            AutoAction::Prove | AutoAction::StoreDa => {}
        }
    }
}

fn aggregate_built(chains: &Chains, kind: AggregateKind) -> bool {
    chains.aggregate(kind).is_some_and(|aggregate| aggregate.is_built)
}

pub struct AutomationPlugin;

impl Plugin for AutomationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutomationTimers>().add_systems(
            Update,
            (
                rebuild_timers.run_if(resource_exists::<GameConfig>.and(resource_changed::<Upgrades>)),
                run_automations,
            )
                .chain()
                .in_set(GameSchedule::FrameStart)
                .run_if(in_state(GameState::Running)),
        );
    }
}
