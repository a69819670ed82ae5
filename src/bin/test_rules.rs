// src/bin/test_rules.rs
use dotenv::dotenv;
use policy_rules_api::models::{EconomicIndicators, PolicyRulesParameters};
use policy_rules_api::services::fred::FredClient;
use policy_rules_api::services::policy::{
    calculate_historical_policy_rates, calculate_policy_rule_estimates,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let client = FredClient::shared()?;
    let params = PolicyRulesParameters::default();

    let mut indicators = EconomicIndicators::default();
    let estimates =
        calculate_policy_rule_estimates(client.as_ref(), &mut indicators, &params).await?;
    for estimate in &estimates {
        println!(
            "{:45} unadjusted {:6.2}%  adjusted {:6.2}%",
            estimate.rule, estimate.unadjusted, estimate.adjusted
        );
    }

    let historical =
        calculate_historical_policy_rates(client.as_ref(), &EconomicIndicators::default(), &params)
            .await?;
    println!(
        "Historical table: {} rows, {} columns, ending {:?}",
        historical.len(),
        historical.columns.len(),
        historical.last_date()
    );
    Ok(())
}
