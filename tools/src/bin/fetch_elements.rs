// cargo run --bin fetch-elements -- --label "ISS (ZARYA)" --save /tmp/stations.txt

use clap::Parser;
use std::{fs, path::PathBuf};

use tracker_lib::{
    frame, propagator,
    refresher::{ElementSource, HttpElementSource},
    settings::{nominal, parse_url},
    store::ElementSetStore,
    units::{Time, Timestamp},
};

/// Fetch the element set payload once and summarize the tracked object
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Element set source URL
    #[arg(long, default_value = nominal::SOURCE_URL)]
    source: String,

    /// Label of the object in the payload
    #[arg(long, default_value = nominal::SOURCE_LABEL)]
    label: String,

    /// Request timeout
    #[arg(long, default_value = "10s")]
    timeout: humantime::Duration,

    /// Also write the raw payload to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let source = HttpElementSource::new(parse_url(&opts.source)?, *opts.timeout)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let payload = rt.block_on(source.fetch())?;
    println!("Fetched {} bytes from {}", payload.len(), source.url());

    if let Some(p) = opts.save.as_ref() {
        fs::write(p, &payload)?;
        println!("Wrote payload to '{}'", p.display());
    }

    let now = Timestamp::now();
    let store = ElementSetStore::new(opts.label, Time::ZERO);
    let elements = store.refresh(&payload, now)?;

    println!("Name          : {}", elements.name());
    println!("Catalog       : {}", elements.catalog_number());
    println!("Epoch         : {}", elements.epoch());
    println!("Age           : {}", elements.age_at(now).round_secs());
    println!("Mean motion   : {:.8} rev/day", elements.mean_motion());
    println!("Period        : {}", elements.orbital_period().round_secs());

    let state = propagator::propagate(&elements, now)?;
    let subpoint = frame::subpoint(&state, now.julian_date())?;
    println!("Radius        : {:.1} km", state.radius());
    println!("Subpoint      : {subpoint}");

    Ok(())
}
