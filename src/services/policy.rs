// src/services/policy.rs
use log::info;

use crate::error::Result;
use crate::models::{
    BalancedApproachRuleParameters, DataSeries, EconomicIndicators,
    FirstDifferenceRuleParameters, PolicyRulesParameters, RuleEstimate, TaylorRuleParameters,
};
use crate::services::fred::{fetch_fed_funds_rate, SeriesProvider, FED_TARGET_SERIES};
use crate::services::history::{combine, HistoricalTable};
use crate::services::rules;

fn taylor_params(params: &PolicyRulesParameters) -> TaylorRuleParameters {
    TaylorRuleParameters {
        inflation_target: params.inflation_target,
        rho: params.rho,
        elb: params.elb,
        apply_elb: params.apply_elb,
        ..TaylorRuleParameters::default()
    }
}

fn balanced_approach_params(params: &PolicyRulesParameters) -> BalancedApproachRuleParameters {
    BalancedApproachRuleParameters {
        inflation_target: params.inflation_target,
        rho: params.rho,
        elb: params.elb,
        apply_elb: params.apply_elb,
        ..BalancedApproachRuleParameters::default()
    }
}

fn first_difference_params(params: &PolicyRulesParameters) -> FirstDifferenceRuleParameters {
    FirstDifferenceRuleParameters {
        inflation_target: params.inflation_target,
        rho: params.rho,
        elb: params.elb,
        apply_elb: params.apply_elb,
        ..FirstDifferenceRuleParameters::default()
    }
}

/// Evaluate every rule at the current point in time and collect the named
/// estimates into one table. Any single failure aborts the whole table; no
/// partial output is produced.
pub async fn calculate_policy_rule_estimates<P: SeriesProvider>(
    client: &P,
    indicators: &mut EconomicIndicators,
    params: &PolicyRulesParameters,
) -> Result<Vec<RuleEstimate>> {
    if indicators.current_fed_rate.is_none() {
        indicators.current_fed_rate = client.latest_value(FED_TARGET_SERIES).await?;
    }

    let tr_params = taylor_params(params);
    let bar_params = balanced_approach_params(params);
    let fdr_params = first_difference_params(params);

    let tr_estimate = rules::taylor_rule(client, indicators, &tr_params).await?;
    let bar_estimate = rules::balanced_approach_rule(client, indicators, &bar_params).await?;

    // The shortfalls variant gets its own copy of the parameters; flipping
    // the flag on the shared set would leak into the plain evaluation.
    let basr_params = BalancedApproachRuleParameters {
        use_shortfalls_rule: true,
        ..bar_params.clone()
    };
    let basr_estimate = rules::balanced_approach_rule(client, indicators, &basr_params).await?;

    let fdr_estimate = rules::first_difference_rule(client, indicators, &fdr_params).await?;

    info!("Computed all four current policy rule estimates");
    Ok(vec![tr_estimate, bar_estimate, basr_estimate, fdr_estimate])
}

/// Evaluate every rule's historical trajectory and merge the unadjusted and
/// adjusted columns, plus the fed funds rate, into one table. The combined
/// range is anchored on the Taylor column, which is bounded by the
/// slowest-updating required input (the real interest rate series).
pub async fn calculate_historical_policy_rates<P: SeriesProvider>(
    client: &P,
    indicators: &EconomicIndicators,
    params: &PolicyRulesParameters,
) -> Result<HistoricalTable> {
    let tr_params = taylor_params(params);
    let bar_params = balanced_approach_params(params);
    let basr_params = BalancedApproachRuleParameters {
        use_shortfalls_rule: true,
        ..bar_params.clone()
    };
    let fdr_params = first_difference_params(params);

    let historical_tr = rules::historical_taylor_rule(client, indicators, &tr_params).await?;
    let historical_bar =
        rules::historical_balanced_approach_rule(client, indicators, &bar_params).await?;
    let historical_basr =
        rules::historical_balanced_approach_rule(client, indicators, &basr_params).await?;
    let historical_fdr =
        rules::historical_first_difference_rule(client, indicators, &fdr_params).await?;
    let fed_rate = fetch_fed_funds_rate(client).await?;

    let columns: Vec<(&str, DataSeries)> = vec![
        ("TaylorRule", historical_tr.column_series("TaylorRule")?),
        (
            "AdjustedTaylorRule",
            historical_tr.column_series("AdjustedTaylorRule")?,
        ),
        (
            "BalancedApproachRule",
            historical_bar.column_series("BalancedApproachRule")?,
        ),
        (
            "AdjustedBalancedApproachRule",
            historical_bar.column_series("AdjustedBalancedApproachRule")?,
        ),
        (
            "BalancedApproachShortfallsRule",
            historical_basr.column_series("BalancedApproachShortfallsRule")?,
        ),
        (
            "AdjustedBalancedApproachShortfallsRule",
            historical_basr.column_series("AdjustedBalancedApproachShortfallsRule")?,
        ),
        (
            "FirstDifferenceRule",
            historical_fdr.column_series("FirstDifferenceRule")?,
        ),
        (
            "AdjustedFirstDifferenceRule",
            historical_fdr.column_series("AdjustedFirstDifferenceRule")?,
        ),
        ("FedRate", fed_rate),
    ];
    let series: Vec<(&str, &DataSeries)> =
        columns.iter().map(|(name, data)| (*name, data)).collect();

    let table = combine(&series, "TaylorRule")?.rounded(2);
    info!(
        "Combined historical policy rates over {} rows ending {:?}",
        table.len(),
        table.last_date()
    );
    Ok(table)
}
