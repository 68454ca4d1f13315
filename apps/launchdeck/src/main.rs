use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    distance_to_launchpad_km, maps_links, GeoPoint, LaunchCatalog, LaunchDetailController,
    LaunchListController, LoadOutcome, SpacexClient,
};
use futures::StreamExt;
use shared::domain::{Launch, LaunchId, Launchpad};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "launchdeck", about = "Browse the SpaceX launch catalog")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Newest launches first, optionally filtered by name.
    List {
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    /// Distance from a position to the launch's launchpad.
    Distance {
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(page_size) = cli.page_size {
        settings.page_size = page_size;
    }
    info!(api = %settings.api_base_url, "launchdeck starting");

    let catalog: Arc<dyn LaunchCatalog> = Arc::new(
        SpacexClient::with_timeout(&settings.api_base_url, settings.request_timeout())
            .context("failed to build catalog client")?,
    );

    match cli.command {
        Command::List { pages, search } => {
            list_launches(catalog, settings.page_size, pages, search).await
        }
        Command::Show { id } => {
            let (launch, launchpad) = load_details(catalog, id).await?;
            print_launch(&launch);
            match launchpad {
                Some(launchpad) => print_launchpad(&launchpad),
                None => println!("No launchpad on record."),
            }
            Ok(())
        }
        Command::Distance { id, lat, lon } => {
            let here = GeoPoint::new(lat, lon)?;
            let (launch, launchpad) = load_details(catalog, id).await?;
            let Some(launchpad) = launchpad else {
                bail!("launch {} has no launchpad", launch.id);
            };
            let km = distance_to_launchpad_km(&here, &launchpad);
            let links = maps_links(&launchpad)?;
            println!("{} is {km:.2} km away", launchpad.full_name);
            println!("Apple Maps: {}", links.apple);
            println!("Android:    {}", links.android);
            Ok(())
        }
    }
}

async fn list_launches(
    catalog: Arc<dyn LaunchCatalog>,
    page_size: u32,
    pages: u32,
    search: Option<String>,
) -> Result<()> {
    let list = Arc::new(LaunchListController::with_page_size(catalog, page_size));
    let mut updates = list.updates();
    tokio::spawn(async move {
        while let Some(view) = updates.next().await {
            debug!(
                page = view.page,
                held = view.total,
                loading = view.loading || view.loading_more,
                "list updated"
            );
        }
    });

    list.initialize(page_size).await;
    for _ in 1..pages.max(1) {
        match list.load_more().await {
            LoadOutcome::Committed | LoadOutcome::Busy | LoadOutcome::Stale => {}
            LoadOutcome::Exhausted | LoadOutcome::Failed(_) => break,
        }
    }
    if let Some(term) = search {
        list.set_search(term).await;
    }

    let view = list.snapshot();
    for launch in view.launches.iter() {
        println!(
            "{}  {:<8}  {}  [{}]",
            launch.date_utc.format("%Y-%m-%d"),
            launch.status().label(),
            launch.name,
            launch.id
        );
    }
    println!(
        "{} shown / {} loaded, page {}{}",
        view.launches.len(),
        view.total,
        view.page,
        if view.has_more { "" } else { " (end of catalog)" }
    );
    if let Some(error) = view.error {
        bail!("launch list incomplete: {error}");
    }
    Ok(())
}

async fn load_details(
    catalog: Arc<dyn LaunchCatalog>,
    id: String,
) -> Result<(Launch, Option<Launchpad>)> {
    let details = LaunchDetailController::new(catalog);
    details.load(LaunchId::new(id)).await;
    let view = details.snapshot();
    if let Some(error) = view.error {
        bail!("failed to load launch details: {error}");
    }
    let launch = view.launch.context("launch details missing")?;
    Ok((launch, view.launchpad))
}

fn print_launch(launch: &Launch) {
    println!("{}", launch.name);
    println!("  date:   {}", launch.date_utc.to_rfc2822());
    println!("  status: {}", launch.status().label());
    if let Some(image) = launch.image_url() {
        println!("  image:  {image}");
    }
    if let Some(webcast) = launch.links.as_ref().and_then(|links| links.webcast.as_deref()) {
        println!("  webcast: {webcast}");
    }
}

fn print_launchpad(launchpad: &Launchpad) {
    println!("Launchpad: {}", launchpad.full_name);
    println!("  {}", launchpad.location_label());
    println!("  timezone: {}", launchpad.timezone);
    println!(
        "  launches: {} attempted, {} successful",
        launchpad.launch_attempts, launchpad.launch_successes
    );
    if let Some(rate) = launchpad.success_rate() {
        println!("  success rate: {:.1}%", rate * 100.0);
    }
}
