use anyhow::Context;

use promo_runner::{CheckoutInput, RunnerConfig, default_campaigns, execute};

fn main() -> anyhow::Result<()> {
    promo_observability::init();

    let config = RunnerConfig::from_env().with_args(std::env::args().skip(1));
    tracing::debug!(?config, "runner configured");

    let raw = config.input.read().context("failed to read checkout input")?;
    let input = CheckoutInput::from_json(&raw).context("failed to parse checkout input")?;
    let campaigns = default_campaigns().context("failed to build campaigns")?;

    let output = execute(input, &campaigns);
    let rendered = output
        .to_json(config.pretty)
        .context("failed to render output")?;
    config
        .output
        .write(&rendered)
        .context("failed to write output")?;

    Ok(())
}
