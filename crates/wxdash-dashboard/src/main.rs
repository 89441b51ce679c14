use anyhow::Result;
use wxdash_core::Config;
use wxdash_dashboard::{location_label, Dashboard};

#[tokio::main]
async fn main() -> Result<()> {
    wxdash_core::init()?;

    let config = Config::load()?;
    let dashboard = Dashboard::from_config(&config)?;

    tracing::info!("wxdash started");

    // Optional city query; otherwise the first featured city
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        dashboard.load_initial().await?;
    } else {
        let results = dashboard.search(&query).await.unwrap_or_default();
        let Some(first) = results.into_iter().next() else {
            anyhow::bail!("No places found for \"{}\"", query);
        };
        tracing::info!("Using {}", location_label(&first));
        dashboard.select_location(first).await?;
    }

    println!("{}", serde_json::to_string_pretty(&dashboard.view())?);

    Ok(())
}
