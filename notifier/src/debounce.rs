/// Lets a repeated negative event through only on its `threshold`th
/// consecutive occurrence, then starts counting again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    threshold: u32,
    count: u32,
}

impl Debounce {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            count: 0,
        }
    }

    /// Counts one occurrence; `true` when it should be acted on.
    pub fn hit(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.threshold {
            self.count = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
