use {
    bevy::prelude::*,
    game_config::TutorialStepConfig,
    game_events::GameEvent,
    notifier::{GameObserver, ObserverError},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialStep {
    #[default]
    MineBlock,
    Transactions,
    Completed,
}

impl TutorialStep {
    pub fn next(self) -> Self {
        match self {
            TutorialStep::MineBlock => TutorialStep::Transactions,
            TutorialStep::Transactions | TutorialStep::Completed => TutorialStep::Completed,
        }
    }

    /// Index into the configured step texts; `None` once completed.
    pub fn index(self) -> Option<usize> {
        match self {
            TutorialStep::MineBlock => Some(0),
            TutorialStep::Transactions => Some(1),
            TutorialStep::Completed => None,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialState {
    pub step: TutorialStep,
    pub overlay_visible: bool,
}

impl Default for TutorialState {
    fn default() -> Self {
        Self {
            step: TutorialStep::MineBlock,
            overlay_visible: true,
        }
    }
}

impl TutorialState {
    pub fn is_completed(&self) -> bool {
        self.step == TutorialStep::Completed
    }

    /// Text for the overlay, when there is one to show.
    pub fn current_text<'a>(&self, steps: &'a [TutorialStepConfig]) -> Option<&'a TutorialStepConfig> {
        if !self.overlay_visible {
            return None;
        }
        self.step.index().and_then(|index| steps.get(index))
    }
}

/// Advances the tutorial on mined blocks; a mine click hides the overlay.
#[derive(Debug, Default)]
pub struct TutorialObserver;

impl GameObserver for TutorialObserver {
    fn on_notify(&mut self, event: &GameEvent, world: &mut World) -> Result<(), ObserverError> {
        let mut state = world
            .get_resource_mut::<TutorialState>()
            .ok_or(ObserverError::MissingResource("TutorialState"))?;
        if state.is_completed() {
            return Ok(());
        }

        match event {
            GameEvent::MineDone { .. } => {
                state.step = state.step.next();
                state.overlay_visible = !state.is_completed();
                debug!(step = ?state.step, "tutorial advanced");
            }
            GameEvent::MineClicked { .. } => state.overlay_visible = false,
            _ => {}
        }
        Ok(())
    }
}

pub struct TutorialPlugin;

impl Plugin for TutorialPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TutorialState>();
    }
}
