//! Variation command - resolves experiment variations

use clap::Args;
use serde::Serialize;

use crate::domain::experiment::{AbTest, ExperimentContext, Variation};
use crate::infrastructure::experiment::HashedVariationSource;
use crate::infrastructure::services::CachedVariationProvider;
use crate::AppServices;

#[derive(Debug, Clone, Args)]
pub struct VariationArgs {
    /// Experiment key
    #[arg(long)]
    pub experiment: String,

    /// Identity scope (logged-in experiments are never pinned)
    #[arg(long, default_value = "logged-out")]
    pub context: ExperimentContext,

    /// Freshly computed variation (control, treatment, treatment:<name>)
    #[arg(long, conflicts_with = "anonymous_id")]
    pub variation: Option<Variation>,

    /// Anonymous identity used to compute the variation locally
    #[arg(long)]
    pub anonymous_id: Option<String>,

    /// Share of identities bucketed into treatment when computing locally
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub treatment_percent: u8,

    /// Treatment name used when computing locally
    #[arg(long)]
    pub treatment_name: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VariationReport {
    pub experiment_key: String,
    pub context: String,
    pub variation: Variation,
}

pub async fn run(services: &AppServices, args: &VariationArgs) -> anyhow::Result<()> {
    let report = resolve(&services.variations, args).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Builds the experiment from the arguments and resolves it
pub async fn resolve(
    provider: &CachedVariationProvider,
    args: &VariationArgs,
) -> anyhow::Result<VariationReport> {
    let ab_test = AbTest::new(&args.experiment, args.context)?
        .with_optional_variation(fresh_variation(args)?);

    let variation = provider.variation(&ab_test).await;

    Ok(VariationReport {
        experiment_key: ab_test.key().to_string(),
        context: ab_test.context().to_string(),
        variation,
    })
}

fn fresh_variation(args: &VariationArgs) -> anyhow::Result<Option<Variation>> {
    if let Some(variation) = &args.variation {
        return Ok(Some(variation.clone()));
    }

    let Some(identity) = &args.anonymous_id else {
        return Ok(None);
    };

    let mut source = HashedVariationSource::new(args.treatment_percent)?;

    if let Some(name) = &args.treatment_name {
        source = source.with_treatment_name(name.clone());
    }

    Ok(Some(source.variation_for(identity, args.experiment.trim())))
}
