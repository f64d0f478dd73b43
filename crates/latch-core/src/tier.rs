//! Plan tiers - named duration buckets used to compute grant expiry

use std::collections::HashMap;
use std::time::Duration;

/// Duration applied when a plan label is unknown
pub const DEFAULT_PLAN_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

const DAY: u64 = 24 * 60 * 60;

/// Named duration mapping, admin-editable at runtime
///
/// Ships with weekly/monthly/yearly defaults; unknown labels fall back to
/// the default duration rather than failing intake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierTable {
    tiers: HashMap<String, Duration>,
    default_duration: Duration,
}

impl TierTable {
    pub fn new() -> Self {
        let mut tiers = HashMap::new();
        tiers.insert("weekly".to_owned(), Duration::from_secs(7 * DAY));
        tiers.insert("monthly".to_owned(), Duration::from_secs(30 * DAY));
        tiers.insert("yearly".to_owned(), Duration::from_secs(365 * DAY));

        TierTable {
            tiers,
            default_duration: DEFAULT_PLAN_DURATION,
        }
    }

    /// Empty table (every label resolves to the default duration)
    pub fn empty() -> Self {
        TierTable {
            tiers: HashMap::new(),
            default_duration: DEFAULT_PLAN_DURATION,
        }
    }

    /// Duration for a plan label, falling back to the default
    pub fn duration_for(&self, plan: &str) -> Duration {
        self.tiers
            .get(plan)
            .copied()
            .unwrap_or(self.default_duration)
    }

    /// Whether a label names a configured tier
    pub fn contains(&self, plan: &str) -> bool {
        self.tiers.contains_key(plan)
    }

    /// Insert or replace a tier
    pub fn set(&mut self, plan: impl Into<String>, duration: Duration) {
        self.tiers.insert(plan.into(), duration);
    }

    /// Remove a tier; removed labels fall back to the default
    pub fn remove(&mut self, plan: &str) -> Option<Duration> {
        self.tiers.remove(plan)
    }

    pub fn set_default_duration(&mut self, duration: Duration) {
        self.default_duration = duration;
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Iterate over configured tiers
    pub fn iter(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.tiers.iter().map(|(label, d)| (label.as_str(), *d))
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tier_mapping() {
        let table = TierTable::new();

        assert_eq!(table.duration_for("weekly"), Duration::from_secs(7 * DAY));
        assert_eq!(table.duration_for("monthly"), Duration::from_secs(30 * DAY));
        assert_eq!(table.duration_for("yearly"), Duration::from_secs(365 * DAY));
    }

    #[test]
    fn test_unknown_plan_falls_back_to_default() {
        let table = TierTable::new();
        assert_eq!(table.duration_for("lifetime"), DEFAULT_PLAN_DURATION);
    }

    #[test]
    fn test_admin_edit() {
        let mut table = TierTable::new();
        table.set("quarterly", Duration::from_secs(90 * DAY));

        assert_eq!(
            table.duration_for("quarterly"),
            Duration::from_secs(90 * DAY)
        );

        table.remove("quarterly");
        assert_eq!(table.duration_for("quarterly"), DEFAULT_PLAN_DURATION);
    }
}
