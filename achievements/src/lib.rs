//! Achievement progress driven by gameplay events.

use {
    bevy::prelude::*,
    chain_components::ChainId,
    game_config::{AchievementCondition, GameConfig},
    game_events::{GameEvent, GameEventKind},
    notifier::{notify, GameObserver, ObserverError},
    serde::{Deserialize, Serialize},
    std::collections::{BTreeMap, BTreeSet, HashMap},
};

pub const COMPLETE: f64 = 100.0;

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementStore {
    /// Percent towards completion, `0..=100`.
    pub progress: BTreeMap<u32, f64>,
    pub completed: BTreeSet<u32>,
    pub blocks_mined: BTreeMap<ChainId, u32>,
    pub proofs_submitted: u32,
}

impl AchievementStore {
    /// Records progress and returns whether this call completed the
    /// achievement. Completed achievements never change again.
    pub fn update_achievement(&mut self, id: u32, progress: f64) -> bool {
        if self.completed.contains(&id) {
            return false;
        }
        let progress = progress.clamp(0.0, COMPLETE);
        self.progress.insert(id, progress);
        if progress >= COMPLETE {
            self.completed.insert(id);
            return true;
        }
        false
    }

    pub fn is_completed(&self, id: u32) -> bool {
        self.completed.contains(&id)
    }

    pub fn progress(&self, id: u32) -> f64 {
        self.progress.get(&id).copied().unwrap_or(0.0)
    }

    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::MineDone { chain_id, .. } | GameEvent::SequenceDone { chain_id, .. } => {
                *self.blocks_mined.entry(*chain_id).or_default() += 1;
            }
            GameEvent::ProveDone { .. } => self.proofs_submitted += 1,
            _ => {}
        }
    }
}

pub fn progress_percent(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return COMPLETE;
    }
    (value / target * COMPLETE).min(COMPLETE)
}

#[derive(Debug, Clone)]
struct Tracked {
    id: u32,
    condition: AchievementCondition,
    /// Table length for the `*Maxed` conditions.
    max_levels: u32,
}

fn trigger_kinds(condition: &AchievementCondition) -> &'static [GameEventKind] {
    match condition {
        AchievementCondition::BalanceAtLeast { .. } => &[GameEventKind::BalanceUpdated],
        AchievementCondition::BlocksMined { .. } => {
            &[GameEventKind::MineDone, GameEventKind::SequenceDone]
        }
        AchievementCondition::UpgradeMaxed { .. } => &[GameEventKind::UpgradePurchased],
        AchievementCondition::AutomationMaxed { .. } => &[GameEventKind::AutomationPurchased],
        AchievementCondition::L2Unlocked => &[GameEventKind::L2Purchased],
        AchievementCondition::DappsUnlocked { .. } => &[GameEventKind::DappsPurchased],
        AchievementCondition::StakedAtLeast { .. } => &[GameEventKind::Staked],
        AchievementCondition::ProofsSubmitted { .. } => &[GameEventKind::ProveDone],
    }
}

impl Tracked {
    /// Progress implied by `event`, or `None` when the event is about
    /// something else (another chain, another upgrade).
    fn evaluate(&self, event: &GameEvent, store: &AchievementStore) -> Option<f64> {
        use AchievementCondition as C;

        let percent = match (&self.condition, event) {
            (C::BalanceAtLeast { target }, GameEvent::BalanceUpdated { balance }) => {
                progress_percent(*balance, *target)
            }
            (C::BlocksMined { chain_id, target }, GameEvent::MineDone { chain_id: mined, .. })
            | (C::BlocksMined { chain_id, target }, GameEvent::SequenceDone { chain_id: mined, .. })
                if chain_id == mined =>
            {
                let mined = store.blocks_mined.get(chain_id).copied().unwrap_or(0);
                progress_percent(mined as f64, *target as f64)
            }
            (
                C::UpgradeMaxed {
                    chain_id,
                    upgrade_id,
                },
                GameEvent::UpgradePurchased {
                    chain_id: bought_chain,
                    upgrade_id: bought,
                    level,
                },
            ) if chain_id == bought_chain && upgrade_id == bought => {
                progress_percent((*level + 1) as f64, self.max_levels as f64)
            }
            (
                C::AutomationMaxed {
                    chain_id,
                    automation_id,
                },
                GameEvent::AutomationPurchased {
                    chain_id: bought_chain,
                    automation_id: bought,
                    level,
                },
            ) if chain_id == bought_chain && automation_id == bought => {
                progress_percent((*level + 1) as f64, self.max_levels as f64)
            }
            (C::L2Unlocked, GameEvent::L2Purchased) => COMPLETE,
            (C::DappsUnlocked { chain_id }, GameEvent::DappsPurchased { chain_id: bought })
                if chain_id == bought =>
            {
                COMPLETE
            }
            (C::StakedAtLeast { target }, GameEvent::Staked { total_staked, .. }) => {
                progress_percent(*total_staked, *target)
            }
            (C::ProofsSubmitted { target }, GameEvent::ProveDone { .. }) => {
                progress_percent(store.proofs_submitted as f64, *target as f64)
            }
            _ => return None,
        };
        Some(percent)
    }
}

/// Updates [`AchievementStore`] and announces completions.
pub struct AchievementObserver {
    achievements_by_event: HashMap<GameEventKind, Vec<Tracked>>,
}

impl AchievementObserver {
    pub fn new(config: &GameConfig) -> Self {
        let mut achievements_by_event: HashMap<GameEventKind, Vec<Tracked>> = HashMap::new();
        for achievement in &config.achievements {
            let max_levels = match &achievement.condition {
                AchievementCondition::UpgradeMaxed { upgrade_id, .. } => config
                    .upgrade(*upgrade_id)
                    .map_or(0, |upgrade| upgrade.table.len() as u32),
                AchievementCondition::AutomationMaxed { automation_id, .. } => config
                    .automation(*automation_id)
                    .map_or(0, |automation| automation.table.len() as u32),
                _ => 0,
            };
            let tracked = Tracked {
                id: achievement.id,
                condition: achievement.condition.clone(),
                max_levels,
            };
            for kind in trigger_kinds(&achievement.condition) {
                achievements_by_event
                    .entry(*kind)
                    .or_default()
                    .push(tracked.clone());
            }
        }
        Self {
            achievements_by_event,
        }
    }
}

impl GameObserver for AchievementObserver {
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError> {
        let mut completed = Vec::new();
        {
            let mut store = world
                .get_resource_mut::<AchievementStore>()
                .ok_or(ObserverError::MissingResource("AchievementStore"))?;
            store.record(event);

            let Some(tracked) = self.achievements_by_event.get(&event.kind()) else {
                return Ok(());
            };
            for achievement in tracked {
                if store.is_completed(achievement.id) {
                    continue;
                }
                let Some(progress) = achievement.evaluate(event, &store) else {
                    continue;
                };
                if store.update_achievement(achievement.id, progress) {
                    completed.push(achievement.id);
                }
            }
        }

        for achievement_id in completed {
            info!(achievement_id, "achievement completed");
            notify(world, GameEvent::AchievementCompleted { achievement_id });
        }
        Ok(())
    }
}

pub struct AchievementsPlugin;

impl Plugin for AchievementsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AchievementStore>();
    }
}
