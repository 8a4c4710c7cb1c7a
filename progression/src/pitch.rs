/// Pitch shift (cents) for a transaction sound: rises as the block fills and
/// by `fee_pitch_step` per order of magnitude of the fee, clamped to
/// `[min, max]`.
pub fn tx_pitch_shift(block_progress: f64, fee: f64, min: f32, max: f32, fee_pitch_step: f32) -> f32 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    let fill = block_progress.clamp(0.0, 1.0) as f32;
    let fee_shift = if fee > 0.0 {
        fee.log10() as f32 * fee_pitch_step
    } else {
        0.0
    };
    (low + fill * (high - low) + fee_shift).clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_rises_with_progress() {
        assert_eq!(tx_pitch_shift(0.0, 1.0, -300.0, 600.0, 50.0), -300.0);
        assert_eq!(tx_pitch_shift(0.5, 1.0, -300.0, 600.0, 50.0), 150.0);
        assert_eq!(tx_pitch_shift(1.0, 1.0, -300.0, 600.0, 50.0), 600.0);
    }

    #[test]
    fn test_fee_magnitude_shifts_pitch() {
        assert!((tx_pitch_shift(0.5, 10.0, -300.0, 600.0, 50.0) - 200.0).abs() < 1e-3);
        assert!((tx_pitch_shift(0.5, 0.1, -300.0, 600.0, 50.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_is_clamped() {
        assert_eq!(tx_pitch_shift(1.0, 1e9, -300.0, 600.0, 50.0), 600.0);
        assert_eq!(tx_pitch_shift(0.0, 1e-9, -300.0, 600.0, 50.0), -300.0);
    }
}
