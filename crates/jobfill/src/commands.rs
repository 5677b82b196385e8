use anyhow::Context;
use jobfill_engine::autofill::{Autofill, RunOutcome};
use jobfill_engine::config::JobfillConfig;
use jobfill_engine::formatter::{format_outcome, format_report, format_site_check};
use jobfill_engine::memory::MemoryPage;
use jobfill_engine::protocol::ProcessHtmlResponse;
use jobfill_h::HeadlessPage;
use std::path::Path;
use tracing::{error, info};
use url::Url;

/// Accept `boards.greenhouse.io/...` as well as full URLs.
pub fn normalize_url(input: &str) -> anyhow::Result<String> {
    let trimmed = input.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", trimmed))
            .with_context(|| format!("Invalid URL '{}'", input))?,
        Err(e) => return Err(e).with_context(|| format!("Invalid URL '{}'", input)),
    };
    Ok(parsed.to_string())
}

fn print_outcome(outcome: &RunOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        println!("{}", format_outcome(outcome));
    }
    Ok(())
}

async fn open(url: &str, visible: bool) -> anyhow::Result<HeadlessPage> {
    let mut page = HeadlessPage::new_with_visibility(visible);
    page.launch().await.context("Failed to launch browser")?;
    if let Err(e) = page.navigate(&normalize_url(url)?).await {
        page.close().await.ok();
        return Err(e.into());
    }
    Ok(page)
}

pub async fn check(config: JobfillConfig, url: &str, visible: bool) -> anyhow::Result<()> {
    let autofill = Autofill::from_config(config)?;
    let mut page = open(url, visible).await?;

    let result = autofill.check(&page).await;
    page.close().await?;
    println!("{}", format_site_check(&result?));
    Ok(())
}

pub async fn fill(
    config: JobfillConfig,
    url: &str,
    visible: bool,
    json: bool,
    keep_open: bool,
) -> anyhow::Result<()> {
    let autofill = Autofill::from_config(config)?;
    let mut page = open(url, visible).await?;

    let outcome = autofill.run(&mut page).await;
    if let Ok(outcome) = &outcome {
        print_outcome(outcome, json)?;
    }

    if keep_open && outcome.is_ok() {
        info!("Leaving the browser open; press Ctrl-C to close");
        tokio::signal::ctrl_c().await?;
    }
    page.close().await?;
    outcome?;
    Ok(())
}

pub async fn watch(config: JobfillConfig, url: Option<&str>) -> anyhow::Result<()> {
    let label = config.trigger.label.clone();
    let autofill = Autofill::from_config(config)?;

    let mut page = HeadlessPage::new_with_visibility(true);
    page.launch().await.context("Failed to launch browser")?;
    if let Some(url) = url {
        page.navigate(&normalize_url(url)?).await?;
    }

    autofill.install_trigger(&mut page).await?;
    let mut clicks = page.trigger_events().await?;
    println!("Watching. Click '{}' on an application page; Ctrl-C to quit.", label);

    loop {
        tokio::select! {
            click = clicks.next() => {
                let Some(click) = click else {
                    info!("Browser closed");
                    break;
                };
                info!("Fill requested on {}", click.url);
                match autofill.run(&mut page).await {
                    Ok(outcome) => print_outcome(&outcome, false)?,
                    Err(e) => error!("Autofill failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    page.close().await?;
    Ok(())
}

pub async fn apply(
    config: JobfillConfig,
    html: &Path,
    fields: &Path,
    url: &str,
    json: bool,
) -> anyhow::Result<()> {
    let markup = tokio::fs::read_to_string(html)
        .await
        .with_context(|| format!("Failed to read {}", html.display()))?;
    let raw = tokio::fs::read_to_string(fields)
        .await
        .with_context(|| format!("Failed to read {}", fields.display()))?;
    let response: ProcessHtmlResponse = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", fields.display()))?;

    let instructions = response.into_instruction_set();
    if instructions.is_empty()
        && let Some(reason) = &instructions.error
    {
        anyhow::bail!("Extraction result carries an error: {}", reason);
    }

    let autofill = Autofill::from_config(config)?;
    let mut page = MemoryPage::new(url, &markup);
    let report = autofill.apply(&mut page, &instructions).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}
