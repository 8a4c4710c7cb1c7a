pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Linear annualised yield. `yield_multiplier` is a percentage (5.0 = 5% APY);
/// rewards never compound.
pub fn staking_reward(staked_amount: f64, yield_multiplier: f64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    staked_amount * yield_multiplier * elapsed_secs / (SECONDS_PER_YEAR * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlashOutcome {
    /// The stake was validated within `due_time`.
    NotDue,
    /// Overdue, but the roll spared the stake.
    Spared,
    Slashed { amount: f64 },
}

/// Chance of being slashed once overdue: grows linearly with how far past
/// `due_time` the stake is, reaching certainty at twice the due time.
pub fn slash_probability(elapsed_secs: f64, due_time_secs: f64) -> f64 {
    if elapsed_secs <= due_time_secs {
        return 0.0;
    }
    if due_time_secs <= 0.0 {
        return 1.0;
    }
    ((elapsed_secs - due_time_secs) / due_time_secs).min(1.0)
}

/// `roll` is a uniform sample in `[0, 1)`.
pub fn slash_check(
    elapsed_secs: f64,
    due_time_secs: f64,
    fraction: f64,
    staked_amount: f64,
    roll: f64,
) -> SlashOutcome {
    if elapsed_secs <= due_time_secs {
        return SlashOutcome::NotDue;
    }
    if roll < slash_probability(elapsed_secs, due_time_secs) {
        SlashOutcome::Slashed {
            amount: staked_amount * fraction.clamp(0.0, 1.0),
        }
    } else {
        SlashOutcome::Spared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_year_at_five_percent() {
        let reward = staking_reward(100.0, 5.0, SECONDS_PER_YEAR);
        assert!((reward - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_reward_is_linear_in_time() {
        let half = staking_reward(250.0, 12.0, SECONDS_PER_YEAR / 2.0);
        let full = staking_reward(250.0, 12.0, SECONDS_PER_YEAR);
        assert!((full - 2.0 * half).abs() < 1e-9);
        assert!((full - 250.0 * 12.0 / 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_reward_without_elapsed_time() {
        assert_eq!(staking_reward(100.0, 5.0, 0.0), 0.0);
        assert_eq!(staking_reward(100.0, 5.0, -10.0), 0.0);
    }

    #[test]
    fn test_not_due_never_slashes() {
        assert_eq!(slash_check(50.0, 60.0, 0.1, 100.0, 0.0), SlashOutcome::NotDue);
        assert_eq!(slash_probability(60.0, 60.0), 0.0);
    }

    #[test]
    fn test_probability_scales_and_caps() {
        assert!((slash_probability(90.0, 60.0) - 0.5).abs() < 1e-12);
        assert_eq!(slash_probability(600.0, 60.0), 1.0);
    }

    #[test]
    fn test_roll_decides_slash() {
        // 50% overdue
        assert_eq!(
            slash_check(90.0, 60.0, 0.1, 100.0, 0.4),
            SlashOutcome::Slashed { amount: 10.0 }
        );
        assert_eq!(slash_check(90.0, 60.0, 0.1, 100.0, 0.6), SlashOutcome::Spared);
    }
}
