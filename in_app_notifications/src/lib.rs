//! Toast-style messages for the player, shown for a few seconds each.

use {
    bevy::prelude::*,
    game_config::{GameConfig, NotificationConfig},
    game_events::{GameEvent, InvalidPurchaseReason},
    notifier::{Debounce, GameObserver, ObserverError},
    states::GameState,
    std::{collections::{HashMap, VecDeque}, time::Duration},
    system_schedule::GameSchedule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    timer: Timer,
}

#[derive(Resource, Debug)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
    active: Vec<Notification>,
    max_active: usize,
    duration_secs: f32,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(5, 5.0)
    }
}

impl NotificationQueue {
    pub fn new(max_active: usize, duration_secs: f32) -> Self {
        Self {
            pending: VecDeque::new(),
            active: Vec::new(),
            max_active: max_active.max(1),
            duration_secs,
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config.max_active, config.duration_secs)
    }

    /// Shows the message right away when there is room, otherwise queues it.
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            kind,
            message: message.into(),
            timer: Timer::from_seconds(self.duration_secs, TimerMode::Once),
        };
        if self.active.len() < self.max_active {
            self.active.push(notification);
        } else {
            self.pending.push_back(notification);
        }
    }

    /// Expires finished notifications and moves pending ones into the freed
    /// slots.
    pub fn tick(&mut self, delta: Duration) {
        for notification in &mut self.active {
            notification.timer.tick(delta);
        }
        self.active
            .retain(|notification| !notification.timer.is_finished());
        while self.active.len() < self.max_active {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            self.active.push(next);
        }
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn invalid_purchase_message(reason: InvalidPurchaseReason) -> &'static str {
    match reason {
        InvalidPurchaseReason::MaxLevel => "Already at max level",
        InvalidPurchaseReason::AlreadyOwned => "Already owned",
        InvalidPurchaseReason::Locked => "Not unlocked yet",
        InvalidPurchaseReason::Unknown => "Unknown item",
    }
}

pub struct InAppNotificationsObserver {
    achievement_names: HashMap<u32, String>,
    block_full: Debounce,
}

impl InAppNotificationsObserver {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            achievement_names: config
                .achievements
                .iter()
                .map(|achievement| (achievement.id, achievement.name.clone()))
                .collect(),
            block_full: Debounce::new(config.notifications.block_full_threshold),
        }
    }

    fn notification_for(&mut self, event: &GameEvent) -> Option<(NotificationKind, String)> {
        if matches!(event, GameEvent::TxAdded { .. }) || event.is_purchase() {
            self.block_full.reset();
        }

        let notification = match event {
            GameEvent::BuyFailed { cost, balance } => (
                NotificationKind::Error,
                format!("Not enough funds: need {cost:.2}, have {balance:.2}"),
            ),
            GameEvent::InvalidPurchase { reason, .. } => (
                NotificationKind::Warning,
                invalid_purchase_message(*reason).to_owned(),
            ),
            GameEvent::BlockFull { chain_id } => {
                if !self.block_full.hit() {
                    return None;
                }
                (
                    NotificationKind::Warning,
                    format!("Block on chain {chain_id} is full, mine it to make room"),
                )
            }
            GameEvent::AchievementCompleted { achievement_id } => {
                let name = self
                    .achievement_names
                    .get(achievement_id)
                    .map_or("?", String::as_str);
                (
                    NotificationKind::Success,
                    format!("Achievement unlocked: {name}"),
                )
            }
            GameEvent::Slashed { amount, .. } => (
                NotificationKind::Error,
                format!("Stake slashed: -{amount:.2}"),
            ),
            GameEvent::L2Purchased => (NotificationKind::Success, "L2 unlocked".to_owned()),
            GameEvent::DappsPurchased { chain_id } => (
                NotificationKind::Success,
                format!("Dapps unlocked on chain {chain_id}"),
            ),
            _ => return None,
        };
        Some(notification)
    }
}

impl GameObserver for InAppNotificationsObserver {
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError> {
        let Some((kind, message)) = self.notification_for(event) else {
            return Ok(());
        };
        world
            .get_resource_mut::<NotificationQueue>()
            .ok_or(ObserverError::MissingResource("NotificationQueue"))?
            .push(kind, message);
        Ok(())
    }
}

fn expire_notifications(time: Res<Time>, mut queue: ResMut<NotificationQueue>) {
    queue.tick(time.delta());
}

fn configure_queue(mut commands: Commands, config: Option<Res<GameConfig>>) {
    if let Some(config) = config {
        commands.insert_resource(NotificationQueue::from_config(&config.notifications));
    }
}

pub struct InAppNotificationsPlugin;

impl Plugin for InAppNotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NotificationQueue>()
            .add_systems(Startup, configure_queue)
            .add_systems(
                Update,
                expire_notifications
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(in_state(GameState::Running)),
            );
    }
}
