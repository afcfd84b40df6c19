//! Lookup tables mapping a numeric reading onto a descriptive tier.

/// Thresholds keyed by distinct values.
#[derive(Debug, Clone)]
pub struct Tiers<T> {
    entries: Vec<(u64, T)>,
}

impl<T> Tiers<T> {
    pub fn new(mut entries: Vec<(u64, T)>) -> Self {
        entries.sort_by_key(|(threshold, _)| *threshold);
        Self { entries }
    }

    /// Highest threshold that is `<= value`.
    pub fn at_least(&self, value: u64) -> Option<&T> {
        self.entries
            .iter()
            .rev()
            .find(|(threshold, _)| value >= *threshold)
            .map(|(_, tier)| tier)
    }

    /// Lowest threshold that is strictly above `value`.
    pub fn below(&self, value: u64) -> Option<&T> {
        self.entries
            .iter()
            .find(|(threshold, _)| value < *threshold)
            .map(|(_, tier)| tier)
    }
}
