// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single FRED series: observations sorted ascending by date.
///
/// Missing source observations are simply absent; the series never holds
/// interior nulls. This is also the shape persisted to the file cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    pub observations: Vec<(NaiveDate, f64)>,
}

impl DataSeries {
    pub fn new(observations: Vec<(NaiveDate, f64)>) -> Self {
        let mut observations = observations;
        observations.sort_by_key(|(date, _)| *date);
        DataSeries { observations }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|(d, _)| *d)
    }

    /// Last observation dated on or before `date`. Future-dated observations
    /// (which some sources publish in advance) never qualify.
    pub fn last_on_or_before(&self, date: NaiveDate) -> Option<f64> {
        let end = self.observations.partition_point(|(d, _)| *d <= date);
        if end == 0 {
            None
        } else {
            Some(self.observations[end - 1].1)
        }
    }

    /// Signed positional lookup: negative offsets count from the end, so
    /// `at_offset(-1)` is the latest observation and `at_offset(-12)` the
    /// value twelve reporting periods back. Out of range yields `None`.
    pub fn at_offset(&self, offset: i64) -> Option<f64> {
        let len = self.observations.len() as i64;
        let index = if offset < 0 { len + offset } else { offset };
        if index < 0 || index >= len {
            None
        } else {
            Some(self.observations[index as usize].1)
        }
    }

    /// The `periods`-period lag of this series: each date keeps its place in
    /// the calendar but carries the value from `periods` positions earlier.
    /// The first `periods` observations have no lagged value and are dropped.
    ///
    /// Lags are taken on the original series before any alignment so that
    /// they reflect the series' native reporting interval, not row offsets
    /// of a joined table.
    pub fn shifted(&self, periods: usize) -> DataSeries {
        if periods == 0 {
            return self.clone();
        }
        if periods >= self.observations.len() {
            return DataSeries::default();
        }
        let observations = self
            .observations
            .iter()
            .skip(periods)
            .zip(self.observations.iter())
            .map(|((date, _), (_, lagged))| (*date, *lagged))
            .collect();
        DataSeries { observations }
    }
}

/// Current-period economic indicators plus the FRED series ids used to
/// resolve any value the caller left unset.
#[derive(Debug, Clone)]
pub struct EconomicIndicators {
    pub current_fed_rate: Option<f64>,
    pub current_inflation_rate: Option<f64>,
    pub current_unemployment_rate: Option<f64>,
    pub natural_unemployment_rate: Option<f64>,
    pub long_term_real_interest_rate: Option<f64>,
    pub lagged_unemployment_rate: Option<f64>,
    pub lagged_natural_unemployment_rate: Option<f64>,
    pub inflation_series_id: String,
    pub unemployment_rate_series_id: String,
    pub natural_unemployment_series_id: String,
    pub real_interest_rate_series_id: String,
}

impl Default for EconomicIndicators {
    fn default() -> Self {
        EconomicIndicators {
            current_fed_rate: None,
            current_inflation_rate: None,
            current_unemployment_rate: None,
            natural_unemployment_rate: None,
            long_term_real_interest_rate: None,
            lagged_unemployment_rate: None,
            lagged_natural_unemployment_rate: None,
            inflation_series_id: "PCETRIM12M159SFRBDAL".to_string(),
            unemployment_rate_series_id: "UNRATE".to_string(),
            natural_unemployment_series_id: "NROU".to_string(),
            real_interest_rate_series_id: "DFII10".to_string(),
        }
    }
}

/// Taylor rule coefficients and adjustment knobs.
#[derive(Debug, Clone)]
pub struct TaylorRuleParameters {
    pub inflation_target: f64,
    pub alpha: f64,
    pub beta: f64,
    pub okun_factor: f64,
    pub rho: f64,
    pub elb: f64,
    pub apply_elb: bool,
}

impl Default for TaylorRuleParameters {
    fn default() -> Self {
        TaylorRuleParameters {
            inflation_target: 2.0,
            alpha: 0.5,
            beta: 0.5,
            okun_factor: 2.0,
            rho: 0.0,
            elb: 0.125,
            apply_elb: false,
        }
    }
}

/// Balanced approach rule coefficients. With `use_shortfalls_rule` set, the
/// unemployment gap only counts when unemployment is above its natural rate.
#[derive(Debug, Clone)]
pub struct BalancedApproachRuleParameters {
    pub inflation_target: f64,
    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    pub elb: f64,
    pub apply_elb: bool,
    pub use_shortfalls_rule: bool,
}

impl Default for BalancedApproachRuleParameters {
    fn default() -> Self {
        BalancedApproachRuleParameters {
            inflation_target: 2.0,
            alpha: 0.5,
            beta: 2.0,
            rho: 0.0,
            elb: 0.125,
            apply_elb: false,
            use_shortfalls_rule: false,
        }
    }
}

/// First difference rule coefficients.
#[derive(Debug, Clone)]
pub struct FirstDifferenceRuleParameters {
    pub inflation_target: f64,
    pub alpha: f64,
    pub rho: f64,
    pub elb: f64,
    pub apply_elb: bool,
}

impl Default for FirstDifferenceRuleParameters {
    fn default() -> Self {
        FirstDifferenceRuleParameters {
            inflation_target: 2.0,
            alpha: 0.5,
            rho: 0.0,
            elb: 0.125,
            apply_elb: false,
        }
    }
}

/// Shared knobs the orchestrator fans out to every rule.
#[derive(Debug, Clone)]
pub struct PolicyRulesParameters {
    pub inflation_target: f64,
    pub rho: f64,
    pub elb: f64,
    pub apply_elb: bool,
}

impl Default for PolicyRulesParameters {
    fn default() -> Self {
        PolicyRulesParameters {
            inflation_target: 2.0,
            rho: 0.0,
            elb: 0.125,
            apply_elb: false,
        }
    }
}

/// One rule's computed estimate with all three adjustment stages. Values are
/// rounded to two decimals at this reporting boundary, never between stages.
#[derive(Debug, Clone, Serialize)]
pub struct RuleEstimate {
    pub rule: String,
    pub unadjusted: f64,
    pub after_elb: f64,
    pub adjusted: f64,
}
