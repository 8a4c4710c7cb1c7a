use {
    crate::Growth,
    serde::Deserialize,
    std::fmt,
};

/// A purchase level. `None` means "not purchased yet"; `Some(n)` indexes the
/// `values`/`costs` tables.
pub type Level = Option<u32>;

/// Where a table's entries come from in config files.
#[derive(Debug, Clone, Deserialize)]
pub enum TableSource {
    List(Vec<f64>),
    Curve { growth: Growth, levels: u32 },
}

impl TableSource {
    fn resolve(self) -> Vec<f64> {
        match self {
            TableSource::List(values) => values,
            TableSource::Curve { growth, levels } => growth.sample(levels),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawLevelTable {
    #[serde(default)]
    base_value: f64,
    values: TableSource,
    costs: TableSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLengthMismatch {
    pub values: usize,
    pub costs: usize,
}

impl fmt::Display for TableLengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level table has {} values but {} costs",
            self.values, self.costs
        )
    }
}

/// Value/cost lookup for anything bought in levels.
///
/// `values[n]` is the effect at level `n` and `costs[n]` is the price of
/// reaching level `n`, so both tables always have the same length.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawLevelTable")]
pub struct LevelTable {
    base_value: f64,
    values: Vec<f64>,
    costs: Vec<f64>,
}

impl TryFrom<RawLevelTable> for LevelTable {
    type Error = TableLengthMismatch;

    fn try_from(raw: RawLevelTable) -> Result<Self, Self::Error> {
        LevelTable::new(raw.base_value, raw.values.resolve(), raw.costs.resolve())
    }
}

impl LevelTable {
    pub fn new(
        base_value: f64,
        values: Vec<f64>,
        costs: Vec<f64>,
    ) -> Result<Self, TableLengthMismatch> {
        if values.len() != costs.len() {
            return Err(TableLengthMismatch {
                values: values.len(),
                costs: costs.len(),
            });
        }
        Ok(Self {
            base_value,
            values,
            costs,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Highest reachable level, `None` for an empty table.
    pub fn max_level(&self) -> Level {
        self.len().checked_sub(1).map(|max| max as u32)
    }

    /// Effect at `level`; `base_value` when nothing was purchased.
    pub fn value(&self, level: Level) -> f64 {
        match level {
            None => self.base_value,
            Some(level) => self
                .values
                .get(level as usize)
                .or(self.values.last())
                .copied()
                .unwrap_or(self.base_value),
        }
    }

    /// The level a purchase would move to, `None` when already maxed.
    pub fn next_level(&self, level: Level) -> Level {
        let next = level.map_or(0, |level| level + 1);
        ((next as usize) < self.len()).then_some(next)
    }

    /// Price of the next level, `None` at max level.
    pub fn next_cost(&self, level: Level) -> Option<f64> {
        self.next_level(level).map(|next| self.costs[next as usize])
    }

    pub fn is_maxed(&self, level: Level) -> bool {
        self.next_level(level).is_none()
    }
}
