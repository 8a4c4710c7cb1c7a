use {
    bevy::prelude::*,
    game_events::GameEvent,
    notifier::NotifyCommandsExt,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WalletError {
    #[error("insufficient balance: cost {cost}, balance {balance}")]
    Insufficient { cost: f64, balance: f64 },
    #[error("invalid amount {0}")]
    InvalidAmount(f64),
}

#[derive(Resource, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    balance: f64,
}

impl Wallet {
    pub fn with_balance(balance: f64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Deducts `cost` when affordable, returning the new balance. The balance
    /// is untouched on error.
    pub fn spend(&mut self, cost: f64) -> Result<f64, WalletError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(WalletError::InvalidAmount(cost));
        }
        if self.balance < cost {
            return Err(WalletError::Insufficient {
                cost,
                balance: self.balance,
            });
        }
        self.balance -= cost;
        Ok(self.balance)
    }

    pub fn credit(&mut self, amount: f64) -> Result<f64, WalletError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        self.balance += amount;
        Ok(self.balance)
    }

    pub fn reset(&mut self) {
        self.balance = 0.0;
    }
}

/// Spends `cost` and notifies the outcome: `BalanceUpdated` on success,
/// `BuyFailed` with the unchanged balance otherwise.
pub fn try_buy(wallet: &mut Wallet, commands: &mut Commands, cost: f64) -> bool {
    match wallet.spend(cost) {
        Ok(balance) => {
            commands.notify(GameEvent::BalanceUpdated { balance });
            true
        }
        Err(WalletError::Insufficient { cost, balance }) => {
            debug!(cost, balance, "purchase rejected, insufficient balance");
            commands.notify(GameEvent::BuyFailed { cost, balance });
            false
        }
        Err(err) => {
            warn!(%err, "purchase rejected");
            false
        }
    }
}

pub fn credit(wallet: &mut Wallet, commands: &mut Commands, amount: f64) {
    match wallet.credit(amount) {
        Ok(balance) => commands.notify(GameEvent::BalanceUpdated { balance }),
        Err(err) => warn!(%err, "credit rejected"),
    }
}

pub struct WalletPlugin;

impl Plugin for WalletPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Wallet>();
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        notifier::{FnObserver, GameObserverAppExt, NotifierPlugin, ObserverKey},
    };

    #[test]
    fn test_spend_deducts_when_affordable() {
        let mut wallet = Wallet::with_balance(10.0);
        assert_eq!(wallet.spend(4.0), Ok(6.0));
        assert_eq!(wallet.spend(6.0), Ok(0.0));
    }

    #[test]
    fn test_spend_leaves_balance_on_failure() {
        let mut wallet = Wallet::with_balance(3.0);
        assert_eq!(
            wallet.spend(5.0),
            Err(WalletError::Insufficient {
                cost: 5.0,
                balance: 3.0
            })
        );
        assert_eq!(wallet.spend(-1.0), Err(WalletError::InvalidAmount(-1.0)));
        assert_eq!(wallet.balance(), 3.0);
    }

    #[derive(Resource, Default)]
    struct Seen(Vec<GameEvent>);

    #[derive(Resource)]
    struct Cost(f64);

    #[derive(Resource, Default)]
    struct Outcome(Option<bool>);

    fn app(balance: f64, cost: f64) -> App {
        let mut app = App::new();
        app.add_plugins(NotifierPlugin)
            .insert_resource(Wallet::with_balance(balance))
            .insert_resource(Cost(cost))
            .init_resource::<Seen>()
            .init_resource::<Outcome>()
            .register_game_observer(
                ObserverKey::Custom("spy".into()),
                FnObserver::new(|event: &GameEvent, world: &mut World| {
                    world.resource_mut::<Seen>().0.push(event.clone());
                    Ok(())
                }),
            )
            .add_systems(
                Update,
                |mut wallet: ResMut<Wallet>,
                 cost: Res<Cost>,
                 mut outcome: ResMut<Outcome>,
                 mut commands: Commands| {
                    if outcome.0.is_none() {
                        outcome.0 = Some(try_buy(&mut wallet, &mut commands, cost.0));
                    }
                },
            );
        app
    }

    #[test]
    fn test_try_buy_success_notifies_balance() {
        let mut app = app(10.0, 4.0);
        app.update();

        assert_eq!(app.world().resource::<Outcome>().0, Some(true));
        assert_eq!(app.world().resource::<Wallet>().balance(), 6.0);
        assert_eq!(
            app.world().resource::<Seen>().0,
            vec![GameEvent::BalanceUpdated { balance: 6.0 }]
        );
    }

    #[test]
    fn test_try_buy_failure_notifies_buy_failed() {
        let mut app = app(2.0, 4.0);
        app.update();

        assert_eq!(app.world().resource::<Outcome>().0, Some(false));
        assert_eq!(app.world().resource::<Wallet>().balance(), 2.0);
        assert_eq!(
            app.world().resource::<Seen>().0,
            vec![GameEvent::BuyFailed {
                cost: 4.0,
                balance: 2.0
            }]
        );
    }
}
