//! The event bus connecting store actions to their side effects.
//!
//! Stores mutate their own resource and then call [`NotifyCommandsExt::notify`].
//! The [`Notifier`] resource hands the event to every registered
//! [`GameObserver`] synchronously, in registration order. Observers get
//! `&mut World` so they can update their own store or trigger store actions.

use {
    bevy::prelude::*,
    game_events::GameEvent,
    std::{collections::VecDeque, fmt},
    thiserror::Error,
};

mod debounce;

pub use {
    debounce::Debounce,
    game_events::{GameEventKind, InvalidPurchaseReason, PurchaseItem},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObserverKey {
    Achievements,
    Sound,
    TxBuilder,
    Tutorial,
    InAppNotifications,
    Custom(String),
}

impl fmt::Display for ObserverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserverKey::Achievements => f.write_str("achievements"),
            ObserverKey::Sound => f.write_str("sound"),
            ObserverKey::TxBuilder => f.write_str("tx_builder"),
            ObserverKey::Tutorial => f.write_str("tutorial"),
            ObserverKey::InAppNotifications => f.write_str("in_app_notifications"),
            ObserverKey::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("required resource `{0}` is missing")]
    MissingResource(&'static str),
    #[error("{0}")]
    Failed(String),
}

pub trait GameObserver: Send + Sync + 'static {
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError>;
}

/// Adapts a closure into a [`GameObserver`].
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: FnMut(&GameEvent, &mut World) -> Result<(), ObserverError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> GameObserver for FnObserver<F>
where
    F: FnMut(&GameEvent, &mut World) -> Result<(), ObserverError> + Send + Sync + 'static,
{
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError> {
        (self.0)(event, world)
    }
}

type ObserverSlot = (ObserverKey, Box<dyn GameObserver>);

/// Registry of observers plus the queue of events waiting for delivery.
///
/// While an event is being delivered the observer list is moved out of the
/// resource. Registrations and removals made meanwhile are applied once the
/// current event has reached every observer.
#[derive(Resource, Default)]
pub struct Notifier {
    observers: Vec<ObserverSlot>,
    queue: VecDeque<GameEvent>,
    dispatching: bool,
    pending_removals: Vec<ObserverKey>,
}

impl Notifier {
    /// Registering an existing key replaces that observer in its original slot.
    pub fn register_observer(&mut self, key: ObserverKey, observer: impl GameObserver) {
        self.pending_removals.retain(|pending| pending != &key);
        self.insert_slot(key, Box::new(observer));
    }

    pub fn unregister_observer(&mut self, key: &ObserverKey) {
        self.observers.retain(|(registered, _)| registered != key);
        if self.dispatching {
            self.pending_removals.push(key.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObserverKey> {
        self.observers.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn insert_slot(&mut self, key: ObserverKey, observer: Box<dyn GameObserver>) {
        match self.observers.iter_mut().find(|(registered, _)| registered == &key) {
            Some(slot) => slot.1 = observer,
            None => self.observers.push((key, observer)),
        }
    }

    fn restore(&mut self, dispatched: Vec<ObserverSlot>) {
        let added = std::mem::replace(&mut self.observers, dispatched);
        for key in std::mem::take(&mut self.pending_removals) {
            self.observers.retain(|(registered, _)| registered != &key);
        }
        for (key, observer) in added {
            self.insert_slot(key, observer);
        }
    }
}

/// Delivers `event` to every registered observer.
///
/// Events notified by an observer while another event is being delivered are
/// queued and delivered, in order, before this call returns. An observer
/// returning an error is logged and the remaining observers still run.
pub fn notify(world: &mut World, event: GameEvent) {
    let Some(mut notifier) = world.get_resource_mut::<Notifier>() else {
        debug!(event = event.name(), "notifier disposed, dropping event");
        return;
    };
    notifier.queue.push_back(event);
    if notifier.dispatching {
        return;
    }
    notifier.dispatching = true;

    loop {
        let (event, mut observers) = {
            let Some(mut notifier) = world.get_resource_mut::<Notifier>() else {
                return;
            };
            let Some(event) = notifier.queue.pop_front() else {
                notifier.dispatching = false;
                return;
            };
            let observers = std::mem::take(&mut notifier.observers);
            (event, observers)
        };

        trace!(event = event.name(), observers = observers.len(), "notify");
        for (key, observer) in observers.iter_mut() {
            if let Err(err) = observer.on_notify(&event, world) {
                warn!(observer = %key, event = event.name(), %err, "observer failed");
            }
        }

        match world.get_resource_mut::<Notifier>() {
            Some(mut notifier) => notifier.restore(observers),
            None => {
                debug!("notifier disposed during dispatch");
                return;
            }
        }
    }
}

/// Tears the bus down. Observers are dropped and later notifications are
/// discarded until a new [`Notifier`] is inserted.
pub fn dispose_notifier(world: &mut World) -> Option<Notifier> {
    world.remove_resource::<Notifier>()
}

pub trait NotifyCommandsExt {
    /// Queues delivery of `event`; it runs when the commands are applied.
    fn notify(&mut self, event: GameEvent);
}

impl NotifyCommandsExt for Commands<'_, '_> {
    fn notify(&mut self, event: GameEvent) {
        self.queue(move |world: &mut World| notify(world, event));
    }
}

pub trait GameObserverAppExt {
    fn register_game_observer(
        &mut self,
        key: ObserverKey,
        observer: impl GameObserver,
    ) -> &mut Self;
}

impl GameObserverAppExt for App {
    fn register_game_observer(
        &mut self,
        key: ObserverKey,
        observer: impl GameObserver,
    ) -> &mut Self {
        self.init_resource::<Notifier>();
        self.world_mut()
            .resource_mut::<Notifier>()
            .register_observer(key, observer);
        self
    }
}

pub struct NotifierPlugin;

impl Plugin for NotifierPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Notifier>();
    }
}
