//! Mirrors gameplay onto the backend: events become [`ActionDescriptor`]s,
//! which are queued and submitted in batches through a [`ChainConnector`].

mod actions;

pub use actions::*;

use {
    bevy::prelude::*,
    game_config::{GameConfig, TxBatchConfig},
    game_events::GameEvent,
    notifier::{GameObserver, ObserverError},
    states::GameState,
    std::collections::VecDeque,
    system_schedule::GameSchedule,
    thiserror::Error,
};

/// Receives every action the observer builds.
pub trait ActionSink: Send + Sync + 'static {
    fn add_action(&mut self, action: ActionDescriptor, world: &mut World) -> Result<(), ObserverError>;
}

/// Pushes actions onto the [`ActionQueue`] resource.
#[derive(Debug, Default)]
pub struct QueueSink;

impl ActionSink for QueueSink {
    fn add_action(&mut self, action: ActionDescriptor, world: &mut World) -> Result<(), ObserverError> {
        world
            .get_resource_mut::<ActionQueue>()
            .ok_or(ObserverError::MissingResource("ActionQueue"))?
            .push(action);
        Ok(())
    }
}

/// Adapts a closure into an [`ActionSink`].
pub struct FnSink<F>(F);

impl<F> FnSink<F>
where
    F: FnMut(ActionDescriptor) + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ActionSink for FnSink<F>
where
    F: FnMut(ActionDescriptor) + Send + Sync + 'static,
{
    fn add_action(&mut self, action: ActionDescriptor, _world: &mut World) -> Result<(), ObserverError> {
        (self.0)(action);
        Ok(())
    }
}

#[derive(Resource, Debug, Default)]
pub struct ActionQueue {
    actions: VecDeque<ActionDescriptor>,
}

impl ActionQueue {
    pub fn push(&mut self, action: ActionDescriptor) {
        self.actions.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Removes up to `max` actions, oldest first.
    pub fn drain_batch(&mut self, max: usize) -> Vec<ActionDescriptor> {
        let count = self.actions.len().min(max);
        self.actions.drain(..count).collect()
    }
}

pub struct TxBuilderObserver {
    mapper: ActionMapper,
    sink: Box<dyn ActionSink>,
}

impl TxBuilderObserver {
    pub fn new(config: &GameConfig, sink: impl ActionSink) -> Self {
        Self {
            mapper: ActionMapper::new(config),
            sink: Box::new(sink),
        }
    }
}

impl GameObserver for TxBuilderObserver {
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError> {
        let Some(action) = self.mapper.to_action(event) else {
            return Ok(());
        };
        trace!(action = %action.action, args = ?action.args, "action queued");
        self.sink.add_action(action, world)
    }
}

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("connector unavailable: {0}")]
    Unavailable(String),
    #[error("batch rejected: {0}")]
    Rejected(String),
}

/// Submits batches of actions to the chain backend.
pub trait ChainConnector: Send + Sync + 'static {
    fn submit(&mut self, batch: &[ActionDescriptor]) -> Result<(), ConnectorError>;
}

/// Offline connector: logs each batch.
#[derive(Debug, Default)]
pub struct LogConnector {
    pub submitted: usize,
}

impl ChainConnector for LogConnector {
    fn submit(&mut self, batch: &[ActionDescriptor]) -> Result<(), ConnectorError> {
        self.submitted += batch.len();
        info!(actions = batch.len(), total = self.submitted, "action batch submitted");
        Ok(())
    }
}

#[derive(Resource)]
pub struct Connector(pub Box<dyn ChainConnector>);

impl Default for Connector {
    fn default() -> Self {
        Self(Box::new(LogConnector::default()))
    }
}

#[derive(Resource, Debug)]
pub struct BatchTimer {
    pub timer: Timer,
    pub max_batch_size: usize,
}

impl BatchTimer {
    pub fn from_config(config: &TxBatchConfig) -> Self {
        Self {
            timer: Timer::from_seconds(config.batch_interval_secs, TimerMode::Repeating),
            max_batch_size: config.max_batch_size,
        }
    }
}

impl Default for BatchTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(5.0, TimerMode::Repeating),
            max_batch_size: 100,
        }
    }
}

/// Submits one batch; a failed batch is dropped.
pub fn submit_batch(queue: &mut ActionQueue, connector: &mut dyn ChainConnector, max: usize) -> usize {
    let batch = queue.drain_batch(max);
    if batch.is_empty() {
        return 0;
    }
    match connector.submit(&batch) {
        Ok(()) => batch.len(),
        Err(err) => {
            warn!(actions = batch.len(), %err, "action batch dropped");
            0
        }
    }
}

pub fn flush_action_batch(
    time: Res<Time>,
    mut timer: ResMut<BatchTimer>,
    mut queue: ResMut<ActionQueue>,
    mut connector: ResMut<Connector>,
) {
    timer.timer.tick(time.delta());
    if !timer.timer.just_finished() {
        return;
    }
    let max = timer.max_batch_size;
    submit_batch(&mut queue, connector.0.as_mut(), max);
}

fn configure_batching(mut commands: Commands, config: Option<Res<GameConfig>>) {
    if let Some(config) = config {
        commands.insert_resource(BatchTimer::from_config(&config.tx_batching));
    }
}

pub struct TxBuilderPlugin;

impl Plugin for TxBuilderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionQueue>()
            .init_resource::<Connector>()
            .init_resource::<BatchTimer>()
            .add_systems(Startup, configure_batching)
            .add_systems(
                Update,
                flush_action_batch
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(in_state(GameState::Running)),
            );
    }
}
