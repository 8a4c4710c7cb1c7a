//! Pure progression math shared by the stores and observers: level tables for
//! upgrades/automations/transactions and the growth curves that generate them,
//! staking reward and slashing formulas, transaction sound pitch.

mod growth;
mod levels;
mod pitch;
mod staking;

pub use growth::*;
pub use levels::*;
pub use pitch::*;
pub use staking::*;
