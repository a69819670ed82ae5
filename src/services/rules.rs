// src/services/rules.rs
use log::info;

use crate::error::{PolicyError, Result};
use crate::models::{
    BalancedApproachRuleParameters, EconomicIndicators, FirstDifferenceRuleParameters,
    RuleEstimate, TaylorRuleParameters,
};
use crate::services::fred::{fetch_fed_funds_rate, SeriesProvider};
use crate::services::history::{align, HistoricalTable};
use crate::services::resolver;

pub const TAYLOR_RULE: &str = "Taylor Rule (TR)";
pub const BALANCED_APPROACH_RULE: &str = "Balanced Approach Rule (BAR)";
pub const BALANCED_APPROACH_SHORTFALLS_RULE: &str = "Balanced Approach Shortfalls Rule (BASR)";
pub const FIRST_DIFFERENCE_RULE: &str = "First Difference Rule (FDR)";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Stage 1: clamp at the effective lower bound when enabled.
fn elb_stage(unadjusted: f64, elb: f64, apply_elb: bool) -> f64 {
    if apply_elb {
        unadjusted.max(elb)
    } else {
        unadjusted
    }
}

// Stage 2: blend with the prevailing rate by the inertia coefficient.
fn inertia_stage(after_elb: f64, previous_rate: f64, rho: f64) -> f64 {
    rho * previous_rate + (1.0 - rho) * after_elb
}

fn require(value: Option<f64>, field: &str) -> Result<f64> {
    value.ok_or_else(|| PolicyError::DataUnavailable(format!("indicator '{}' is unset", field)))
}

fn estimate(rule: &str, unadjusted: f64, previous_rate: f64, rho: f64, elb: f64, apply_elb: bool) -> RuleEstimate {
    let after_elb = elb_stage(unadjusted, elb, apply_elb);
    let adjusted = inertia_stage(after_elb, previous_rate, rho);
    // Rounding happens only here, at the reporting boundary.
    RuleEstimate {
        rule: rule.to_string(),
        unadjusted: round2(unadjusted),
        after_elb: round2(after_elb),
        adjusted: round2(adjusted),
    }
}

/// Taylor rule over an already-resolved indicator set. Purely functional;
/// a missing required indicator is an error, never a default.
pub fn taylor_rule_estimate(
    indicators: &EconomicIndicators,
    params: &TaylorRuleParameters,
) -> Result<RuleEstimate> {
    let inflation = require(indicators.current_inflation_rate, "current_inflation_rate")?;
    let unemployment = require(
        indicators.current_unemployment_rate,
        "current_unemployment_rate",
    )?;
    let natural_unemployment = require(
        indicators.natural_unemployment_rate,
        "natural_unemployment_rate",
    )?;
    let real_rate = require(
        indicators.long_term_real_interest_rate,
        "long_term_real_interest_rate",
    )?;
    let fed_rate = require(indicators.current_fed_rate, "current_fed_rate")?;

    let inflation_gap = inflation - params.inflation_target;
    let unemployment_gap = natural_unemployment - unemployment;
    let unadjusted = real_rate
        + inflation
        + params.alpha * inflation_gap
        + params.beta * params.okun_factor * unemployment_gap;

    Ok(estimate(
        TAYLOR_RULE,
        unadjusted,
        fed_rate,
        params.rho,
        params.elb,
        params.apply_elb,
    ))
}

/// Balanced approach rule over an already-resolved indicator set. With the
/// shortfalls variant the unemployment gap is clamped to `min(0, gap)`, so
/// only unemployment above its natural rate moves the estimate.
pub fn balanced_approach_rule_estimate(
    indicators: &EconomicIndicators,
    params: &BalancedApproachRuleParameters,
) -> Result<RuleEstimate> {
    let inflation = require(indicators.current_inflation_rate, "current_inflation_rate")?;
    let unemployment = require(
        indicators.current_unemployment_rate,
        "current_unemployment_rate",
    )?;
    let natural_unemployment = require(
        indicators.natural_unemployment_rate,
        "natural_unemployment_rate",
    )?;
    let real_rate = require(
        indicators.long_term_real_interest_rate,
        "long_term_real_interest_rate",
    )?;
    let fed_rate = require(indicators.current_fed_rate, "current_fed_rate")?;

    let inflation_gap = inflation - params.inflation_target;
    let mut unemployment_gap = natural_unemployment - unemployment;
    if params.use_shortfalls_rule {
        unemployment_gap = unemployment_gap.min(0.0);
    }

    let unadjusted =
        real_rate + inflation + params.alpha * inflation_gap + params.beta * unemployment_gap;
    let rule = if params.use_shortfalls_rule {
        BALANCED_APPROACH_SHORTFALLS_RULE
    } else {
        BALANCED_APPROACH_RULE
    };

    Ok(estimate(
        rule,
        unadjusted,
        fed_rate,
        params.rho,
        params.elb,
        params.apply_elb,
    ))
}

/// First difference rule over an already-resolved indicator set: adjusts the
/// prevailing rate by the inflation gap and the year-over-year change in the
/// unemployment gap.
pub fn first_difference_rule_estimate(
    indicators: &EconomicIndicators,
    params: &FirstDifferenceRuleParameters,
) -> Result<RuleEstimate> {
    let inflation = require(indicators.current_inflation_rate, "current_inflation_rate")?;
    let unemployment = require(
        indicators.current_unemployment_rate,
        "current_unemployment_rate",
    )?;
    let natural_unemployment = require(
        indicators.natural_unemployment_rate,
        "natural_unemployment_rate",
    )?;
    let fed_rate = require(indicators.current_fed_rate, "current_fed_rate")?;
    let lagged_unemployment = require(
        indicators.lagged_unemployment_rate,
        "lagged_unemployment_rate",
    )?;
    let lagged_natural_unemployment = require(
        indicators.lagged_natural_unemployment_rate,
        "lagged_natural_unemployment_rate",
    )?;

    let inflation_gap = inflation - params.inflation_target;
    let unemployment_gap = natural_unemployment - unemployment;
    let lagged_unemployment_gap = lagged_natural_unemployment - lagged_unemployment;

    let unadjusted =
        fed_rate + params.alpha * inflation_gap + unemployment_gap - lagged_unemployment_gap;

    Ok(estimate(
        FIRST_DIFFERENCE_RULE,
        unadjusted,
        fed_rate,
        params.rho,
        params.elb,
        params.apply_elb,
    ))
}

/// Resolve indicators from the source, then evaluate the Taylor rule.
pub async fn taylor_rule<P: SeriesProvider>(
    client: &P,
    indicators: &mut EconomicIndicators,
    params: &TaylorRuleParameters,
) -> Result<RuleEstimate> {
    resolver::resolve_level_inputs(client, indicators).await?;
    taylor_rule_estimate(indicators, params)
}

/// Resolve indicators from the source, then evaluate the balanced approach
/// rule (or its shortfalls variant).
pub async fn balanced_approach_rule<P: SeriesProvider>(
    client: &P,
    indicators: &mut EconomicIndicators,
    params: &BalancedApproachRuleParameters,
) -> Result<RuleEstimate> {
    resolver::resolve_level_inputs(client, indicators).await?;
    balanced_approach_rule_estimate(indicators, params)
}

/// Resolve indicators from the source, then evaluate the first difference
/// rule.
pub async fn first_difference_rule<P: SeriesProvider>(
    client: &P,
    indicators: &mut EconomicIndicators,
    params: &FirstDifferenceRuleParameters,
) -> Result<RuleEstimate> {
    resolver::resolve_difference_inputs(client, indicators).await?;
    first_difference_rule_estimate(indicators, params)
}

// Both adjustment stages applied row-wise against the same-dated fed rate.
fn adjustment_columns(
    unadjusted: &[f64],
    fed_rate: &[f64],
    rho: f64,
    elb: f64,
    apply_elb: bool,
) -> (Vec<f64>, Vec<f64>) {
    let after_elb: Vec<f64> = unadjusted
        .iter()
        .map(|&u| elb_stage(u, elb, apply_elb))
        .collect();
    let adjusted: Vec<f64> = after_elb
        .iter()
        .zip(fed_rate)
        .map(|(&u, &prev)| inertia_stage(u, prev, rho))
        .collect();
    (after_elb, adjusted)
}

/// Taylor rule trajectory over the reconciled history of its inputs, ending
/// at the last date with real interest rate data.
pub async fn historical_taylor_rule<P: SeriesProvider>(
    client: &P,
    indicators: &EconomicIndicators,
    params: &TaylorRuleParameters,
) -> Result<HistoricalTable> {
    let inflation = client.fetch_series(&indicators.inflation_series_id).await?;
    let unemployment = client
        .fetch_series(&indicators.unemployment_rate_series_id)
        .await?;
    let natural_unemployment = client
        .fetch_series(&indicators.natural_unemployment_series_id)
        .await?;
    let real_rate = client
        .fetch_series(&indicators.real_interest_rate_series_id)
        .await?;
    let fed_rate = fetch_fed_funds_rate(client).await?;

    let mut table = align(
        &[
            ("Inflation", &inflation),
            ("UnemploymentRate", &unemployment),
            ("NaturalUnemploymentRate", &natural_unemployment),
            ("RealInterestRate", &real_rate),
            ("FedRate", &fed_rate),
        ],
        "RealInterestRate",
    )?;

    let (inflation_gap, unemployment_gap, unadjusted) = {
        let inflation = table.column("Inflation")?;
        let unemployment = table.column("UnemploymentRate")?;
        let natural = table.column("NaturalUnemploymentRate")?;
        let real_rate = table.column("RealInterestRate")?;

        let inflation_gap: Vec<f64> = inflation
            .iter()
            .map(|&pi| pi - params.inflation_target)
            .collect();
        let unemployment_gap: Vec<f64> = natural
            .iter()
            .zip(unemployment)
            .map(|(&nat, &u)| nat - u)
            .collect();
        let unadjusted: Vec<f64> = (0..table.len())
            .map(|i| {
                real_rate[i]
                    + inflation[i]
                    + params.alpha * inflation_gap[i]
                    + params.beta * params.okun_factor * unemployment_gap[i]
            })
            .collect();
        (inflation_gap, unemployment_gap, unadjusted)
    };

    let (after_elb, adjusted) = adjustment_columns(
        &unadjusted,
        table.column("FedRate")?,
        params.rho,
        params.elb,
        params.apply_elb,
    );

    table.add_column("InflationGap", inflation_gap);
    table.add_column("UnemploymentGap", unemployment_gap);
    table.add_column("TaylorRule", unadjusted);
    table.add_column("TaylorRuleAfterElb", after_elb);
    table.add_column("AdjustedTaylorRule", adjusted);

    info!("Computed historical Taylor rule over {} rows", table.len());
    Ok(table.rounded(2))
}

/// Balanced approach rule trajectory. Column names carry the shortfalls
/// variant so both flavors can coexist in one combined table.
pub async fn historical_balanced_approach_rule<P: SeriesProvider>(
    client: &P,
    indicators: &EconomicIndicators,
    params: &BalancedApproachRuleParameters,
) -> Result<HistoricalTable> {
    let inflation = client.fetch_series(&indicators.inflation_series_id).await?;
    let unemployment = client
        .fetch_series(&indicators.unemployment_rate_series_id)
        .await?;
    let natural_unemployment = client
        .fetch_series(&indicators.natural_unemployment_series_id)
        .await?;
    let real_rate = client
        .fetch_series(&indicators.real_interest_rate_series_id)
        .await?;
    let fed_rate = fetch_fed_funds_rate(client).await?;

    let mut table = align(
        &[
            ("Inflation", &inflation),
            ("UnemploymentRate", &unemployment),
            ("NaturalUnemploymentRate", &natural_unemployment),
            ("RealInterestRate", &real_rate),
            ("FedRate", &fed_rate),
        ],
        "RealInterestRate",
    )?;

    let rule_name = if params.use_shortfalls_rule {
        "BalancedApproachShortfallsRule"
    } else {
        "BalancedApproachRule"
    };

    let (inflation_gap, unemployment_gap, unadjusted) = {
        let inflation = table.column("Inflation")?;
        let unemployment = table.column("UnemploymentRate")?;
        let natural = table.column("NaturalUnemploymentRate")?;
        let real_rate = table.column("RealInterestRate")?;

        let inflation_gap: Vec<f64> = inflation
            .iter()
            .map(|&pi| pi - params.inflation_target)
            .collect();
        let unemployment_gap: Vec<f64> = natural
            .iter()
            .zip(unemployment)
            .map(|(&nat, &u)| {
                let gap = nat - u;
                if params.use_shortfalls_rule {
                    gap.min(0.0)
                } else {
                    gap
                }
            })
            .collect();
        let unadjusted: Vec<f64> = (0..table.len())
            .map(|i| {
                real_rate[i]
                    + inflation[i]
                    + params.alpha * inflation_gap[i]
                    + params.beta * unemployment_gap[i]
            })
            .collect();
        (inflation_gap, unemployment_gap, unadjusted)
    };

    let (after_elb, adjusted) = adjustment_columns(
        &unadjusted,
        table.column("FedRate")?,
        params.rho,
        params.elb,
        params.apply_elb,
    );

    table.add_column("InflationGap", inflation_gap);
    table.add_column("UnemploymentGap", unemployment_gap);
    table.add_column(rule_name, unadjusted);
    table.add_column(format!("{}AfterElb", rule_name), after_elb);
    table.add_column(format!("Adjusted{}", rule_name), adjusted);

    info!(
        "Computed historical {} over {} rows",
        rule_name,
        table.len()
    );
    Ok(table.rounded(2))
}

/// First difference rule trajectory. The lagged gap components are taken as
/// shifts of the original series before alignment, so the lag reflects each
/// series' native calendar rather than post-join row offsets.
pub async fn historical_first_difference_rule<P: SeriesProvider>(
    client: &P,
    indicators: &EconomicIndicators,
    params: &FirstDifferenceRuleParameters,
) -> Result<HistoricalTable> {
    let inflation = client.fetch_series(&indicators.inflation_series_id).await?;
    let unemployment = client
        .fetch_series(&indicators.unemployment_rate_series_id)
        .await?;
    let natural_unemployment = client
        .fetch_series(&indicators.natural_unemployment_series_id)
        .await?;
    let lagged_unemployment =
        unemployment.shifted(resolver::UNEMPLOYMENT_LAG_PERIODS.unsigned_abs() as usize);
    let lagged_natural_unemployment = natural_unemployment
        .shifted(resolver::NATURAL_UNEMPLOYMENT_LAG_PERIODS.unsigned_abs() as usize);
    let fed_rate = fetch_fed_funds_rate(client).await?;

    let mut table = align(
        &[
            ("Inflation", &inflation),
            ("UnemploymentRate", &unemployment),
            ("LaggedUnemploymentRate", &lagged_unemployment),
            ("NaturalUnemploymentRate", &natural_unemployment),
            ("LaggedNaturalUnemploymentRate", &lagged_natural_unemployment),
            ("FedRate", &fed_rate),
        ],
        "FedRate",
    )?;

    let (inflation_gap, unemployment_gap, lagged_unemployment_gap, unadjusted) = {
        let inflation = table.column("Inflation")?;
        let unemployment = table.column("UnemploymentRate")?;
        let natural = table.column("NaturalUnemploymentRate")?;
        let lagged_unemployment = table.column("LaggedUnemploymentRate")?;
        let lagged_natural = table.column("LaggedNaturalUnemploymentRate")?;
        let fed_rate = table.column("FedRate")?;

        let inflation_gap: Vec<f64> = inflation
            .iter()
            .map(|&pi| pi - params.inflation_target)
            .collect();
        let unemployment_gap: Vec<f64> = natural
            .iter()
            .zip(unemployment)
            .map(|(&nat, &u)| nat - u)
            .collect();
        let lagged_unemployment_gap: Vec<f64> = lagged_natural
            .iter()
            .zip(lagged_unemployment)
            .map(|(&nat, &u)| nat - u)
            .collect();
        let unadjusted: Vec<f64> = (0..table.len())
            .map(|i| {
                fed_rate[i] + params.alpha * inflation_gap[i] + unemployment_gap[i]
                    - lagged_unemployment_gap[i]
            })
            .collect();
        (inflation_gap, unemployment_gap, lagged_unemployment_gap, unadjusted)
    };

    let (after_elb, adjusted) = adjustment_columns(
        &unadjusted,
        table.column("FedRate")?,
        params.rho,
        params.elb,
        params.apply_elb,
    );

    table.add_column("InflationGap", inflation_gap);
    table.add_column("UnemploymentGap", unemployment_gap);
    table.add_column("LaggedUnemploymentGap", lagged_unemployment_gap);
    table.add_column("FirstDifferenceRule", unadjusted);
    table.add_column("FirstDifferenceRuleAfterElb", after_elb);
    table.add_column("AdjustedFirstDifferenceRule", adjusted);

    info!(
        "Computed historical first difference rule over {} rows",
        table.len()
    );
    Ok(table.rounded(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn resolved_indicators() -> EconomicIndicators {
        EconomicIndicators {
            current_inflation_rate: Some(2.5),
            current_unemployment_rate: Some(4.0),
            natural_unemployment_rate: Some(4.5),
            long_term_real_interest_rate: Some(1.0),
            current_fed_rate: Some(5.5),
            lagged_unemployment_rate: Some(3.9),
            lagged_natural_unemployment_rate: Some(4.4),
            ..EconomicIndicators::default()
        }
    }

    #[test]
    fn taylor_rule_matches_the_worked_example() {
        let params = TaylorRuleParameters {
            inflation_target: 2.0,
            alpha: 0.5,
            beta: 0.5,
            okun_factor: 2.0,
            rho: 0.0,
            apply_elb: false,
            ..TaylorRuleParameters::default()
        };
        let estimate = taylor_rule_estimate(&resolved_indicators(), &params).unwrap();
        // 1.0 + 2.5 + 0.5*0.5 + 0.5*2.0*0.5 = 4.25
        assert_relative_eq!(estimate.unadjusted, 4.25);
        assert_relative_eq!(estimate.adjusted, 4.25);
    }

    #[test]
    fn balanced_approach_matches_the_worked_example() {
        let params = BalancedApproachRuleParameters {
            inflation_target: 2.0,
            alpha: 0.5,
            beta: 2.0,
            rho: 0.0,
            apply_elb: false,
            use_shortfalls_rule: false,
            ..BalancedApproachRuleParameters::default()
        };
        let estimate = balanced_approach_rule_estimate(&resolved_indicators(), &params).unwrap();
        // 1.0 + 2.5 + 0.5*0.5 + 2.0*0.5 = 4.75
        assert_relative_eq!(estimate.adjusted, 4.75);
        assert_eq!(estimate.rule, BALANCED_APPROACH_RULE);
    }

    #[test]
    fn shortfalls_variant_ignores_unemployment_below_natural() {
        let params = BalancedApproachRuleParameters {
            use_shortfalls_rule: true,
            ..BalancedApproachRuleParameters::default()
        };
        let estimate = balanced_approach_rule_estimate(&resolved_indicators(), &params).unwrap();
        // Gap of 0.5 is not a shortfall, so it clamps to zero:
        // 1.0 + 2.5 + 0.25 + 0 = 3.75
        assert_relative_eq!(estimate.adjusted, 3.75);
        assert_eq!(estimate.rule, BALANCED_APPROACH_SHORTFALLS_RULE);
    }

    #[test]
    fn shortfalls_variant_keeps_unemployment_above_natural() {
        let mut indicators = resolved_indicators();
        indicators.current_unemployment_rate = Some(5.5);
        let params = BalancedApproachRuleParameters {
            use_shortfalls_rule: true,
            ..BalancedApproachRuleParameters::default()
        };
        let estimate = balanced_approach_rule_estimate(&indicators, &params).unwrap();
        // Gap of -1.0 is a shortfall and counts in full:
        // 1.0 + 2.5 + 0.25 - 2.0 = 1.75
        assert_relative_eq!(estimate.adjusted, 1.75);
    }

    #[test]
    fn first_difference_rule_moves_from_the_prevailing_rate() {
        let estimate = first_difference_rule_estimate(
            &resolved_indicators(),
            &FirstDifferenceRuleParameters::default(),
        )
        .unwrap();
        // 5.5 + 0.5*0.5 + 0.5 - 0.5 = 5.75
        assert_relative_eq!(estimate.adjusted, 5.75);
    }

    #[test]
    fn elb_clamps_only_when_enabled() {
        let mut indicators = resolved_indicators();
        // Deep negative estimate: strongly negative real rate and deflation.
        indicators.long_term_real_interest_rate = Some(-4.0);
        indicators.current_inflation_rate = Some(-2.0);

        let unclamped = taylor_rule_estimate(
            &indicators,
            &TaylorRuleParameters {
                apply_elb: false,
                ..TaylorRuleParameters::default()
            },
        )
        .unwrap();
        assert!(unclamped.after_elb < 0.0);
        assert_relative_eq!(unclamped.after_elb, unclamped.unadjusted);

        let clamped = taylor_rule_estimate(
            &indicators,
            &TaylorRuleParameters {
                apply_elb: true,
                elb: 0.125,
                ..TaylorRuleParameters::default()
            },
        )
        .unwrap();
        assert_relative_eq!(clamped.after_elb, 0.125);
    }

    #[test]
    fn inertia_boundaries() {
        let indicators = resolved_indicators();
        let zero_rho = taylor_rule_estimate(
            &indicators,
            &TaylorRuleParameters {
                rho: 0.0,
                ..TaylorRuleParameters::default()
            },
        )
        .unwrap();
        assert_relative_eq!(zero_rho.adjusted, zero_rho.after_elb);

        let full_rho = taylor_rule_estimate(
            &indicators,
            &TaylorRuleParameters {
                rho: 1.0,
                ..TaylorRuleParameters::default()
            },
        )
        .unwrap();
        assert_relative_eq!(full_rho.adjusted, indicators.current_fed_rate.unwrap());
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let indicators = resolved_indicators();
        let params = BalancedApproachRuleParameters::default();
        let first = balanced_approach_rule_estimate(&indicators, &params).unwrap();
        for _ in 0..10 {
            let again = balanced_approach_rule_estimate(&indicators, &params).unwrap();
            assert_eq!(first.adjusted, again.adjusted);
            assert_eq!(first.unadjusted, again.unadjusted);
        }
    }

    #[test]
    fn missing_indicator_is_an_error_not_a_default() {
        let mut indicators = resolved_indicators();
        indicators.natural_unemployment_rate = None;
        let result = taylor_rule_estimate(&indicators, &TaylorRuleParameters::default());
        assert!(matches!(result, Err(PolicyError::DataUnavailable(_))));
    }

    #[test]
    fn no_adjustments_means_identical_stages() {
        let estimate = taylor_rule_estimate(
            &resolved_indicators(),
            &TaylorRuleParameters {
                rho: 0.0,
                apply_elb: false,
                ..TaylorRuleParameters::default()
            },
        )
        .unwrap();
        assert_eq!(estimate.unadjusted, estimate.after_elb);
        assert_eq!(estimate.after_elb, estimate.adjusted);
    }
}
