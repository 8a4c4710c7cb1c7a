use serde::{Deserialize, Serialize};

pub trait GrowthStrategy {
    /// Value at a 0-indexed level.
    fn calculate(&self, level: u32) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearGrowth {
    /// Value at level 0
    pub base: f64,
    /// Amount added per level
    pub increment: f64,
}

impl GrowthStrategy for LinearGrowth {
    fn calculate(&self, level: u32) -> f64 {
        self.base + self.increment * level as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialGrowth {
    /// Value at level 0
    pub base: f64,
    /// Multiplier per level (2.0 doubles every level)
    pub factor: f64,
}

impl GrowthStrategy for ExponentialGrowth {
    fn calculate(&self, level: u32) -> f64 {
        self.base * self.factor.powi(level as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepGrowth {
    pub base: f64,
    pub step_at: u32,
    pub step_increment: f64,
}

impl GrowthStrategy for StepGrowth {
    fn calculate(&self, level: u32) -> f64 {
        let steps = level / self.step_at.max(1);
        self.base + self.step_increment * steps as f64
    }
}

/// Curve used to generate config tables that would be tedious to list by hand
/// (dapp fees, late-game upgrade costs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Growth {
    Linear(LinearGrowth),
    Exponential(ExponentialGrowth),
    Step(StepGrowth),
    Static(f64),
}

impl GrowthStrategy for Growth {
    fn calculate(&self, level: u32) -> f64 {
        match self {
            Growth::Linear(g) => g.calculate(level),
            Growth::Exponential(g) => g.calculate(level),
            Growth::Step(g) => g.calculate(level),
            Growth::Static(value) => *value,
        }
    }
}

impl Growth {
    /// Samples the curve for levels `0..levels`.
    pub fn sample(&self, levels: u32) -> Vec<f64> {
        (0..levels).map(|level| self.calculate(level)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_sample() {
        let growth = Growth::Exponential(ExponentialGrowth {
            base: 10.0,
            factor: 2.0,
        });
        assert_eq!(growth.sample(4), vec![10.0, 20.0, 40.0, 80.0]);
    }

    #[test]
    fn test_step_growth() {
        // +2 every 5 levels
        let growth = StepGrowth {
            base: 10.0,
            step_at: 5,
            step_increment: 2.0,
        };
        assert_eq!(growth.calculate(4), 10.0);
        assert_eq!(growth.calculate(5), 12.0);
        assert_eq!(growth.calculate(10), 14.0);
    }

    #[test]
    fn test_deserialize_from_ron() {
        let growth: Growth = ron::from_str("Linear((base:1.0,increment:0.5))").unwrap();
        assert_eq!(growth.sample(3), vec![1.0, 1.5, 2.0]);
    }
}
