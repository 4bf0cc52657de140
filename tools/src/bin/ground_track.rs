// cargo run --bin ground-track -- --tle stations.txt --label "ISS (ZARYA)" --at 2024-03-20T12:00:00Z --window-end 3h /tmp/track.csv

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::prelude::*;
use std::path::PathBuf;
use std::{fs, fs::File};

use tle_protocol::find_element_set;
use tracker_lib::{
    elements::ElementSet,
    frame, propagator,
    projector::{project, Viewport},
    settings::config::parse_signed_duration,
    track::{build_track_with, TrackWindow},
    units::Timestamp,
};

/// Write the ground track of one object as CSV or JSON
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Element set payload file (e.g. a saved CelesTrak stations.txt)
    #[arg(long)]
    tle: PathBuf,

    /// Label of the object in the payload
    #[arg(long, default_value = tle_protocol::ISS_LABEL)]
    label: String,

    /// Center of the window, RFC 3339. Defaults to now
    #[arg(long)]
    at: Option<String>,

    /// Window start relative to the center, e.g. "-10m"
    #[arg(long, default_value = "-10m", allow_hyphen_values = true)]
    window_start: String,

    /// Window end relative to the center, e.g. "90m"
    #[arg(long, default_value = "90m", allow_hyphen_values = true)]
    window_end: String,

    /// Sample step
    #[arg(long, default_value = "1m")]
    step: String,

    /// Also emit pixel coordinates for a map of this width (height is half)
    #[arg(long)]
    map_width: Option<u32>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Output file path to write
    output: PathBuf,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Debug, Serialize)]
struct Sample {
    utc: String,
    offset_minutes: f64,
    latitude_deg: f64,
    /// Unwrapped
    longitude_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let payload = fs::read_to_string(&opts.tle)?;
    let elements = ElementSet::from_tle(find_element_set(&payload, &opts.label)?)?;

    let center = match opts.at.as_deref() {
        Some(s) => Timestamp::parse_rfc3339(s)?,
        None => Timestamp::now(),
    };
    let window = TrackWindow {
        start: parse_signed_duration("--window-start", &opts.window_start)?,
        end: parse_signed_duration("--window-end", &opts.window_end)?,
        step: parse_signed_duration("--step", &opts.step)?,
    };
    let viewport = opts
        .map_width
        .map(|w| Viewport::new(f64::from(w), f64::from(w) / 2.0));

    let mut sampled_at = Vec::new();
    let track = build_track_with(center, &window, |t| {
        let state = propagator::propagate(&elements, t)?;
        let p = frame::subpoint(&state, t.julian_date())?;
        sampled_at.push(t);
        Ok(p)
    });

    let samples: Vec<Sample> = sampled_at
        .into_iter()
        .zip(track)
        .map(|(t, p)| {
            let px = viewport.map(|vp| project(&p.wrapped(), &vp));
            Sample {
                utc: t.as_utc().to_rfc3339(),
                offset_minutes: (t - center).as_minutes(),
                latitude_deg: p.latitude_deg,
                longitude_deg: p.longitude_deg,
                x: px.map(|p| p.x),
                y: px.map(|p| p.y),
            }
        })
        .collect();

    println!(
        "{} #{}: {} samples around {center}",
        elements.name(),
        elements.catalog_number(),
        samples.len()
    );

    let mut output = File::create(&opts.output)?;
    match opts.format {
        Format::Json => serde_json::to_writer_pretty(&mut output, &samples)?,
        Format::Csv => {
            writeln!(&mut output, "utc,offset_minutes,latitude_deg,longitude_deg,x,y")?;
            for s in samples.iter() {
                writeln!(
                    &mut output,
                    "{},{},{},{},{},{}",
                    s.utc,
                    s.offset_minutes,
                    s.latitude_deg,
                    s.longitude_deg,
                    s.x.map(|v| v.to_string()).unwrap_or_default(),
                    s.y.map(|v| v.to_string()).unwrap_or_default(),
                )?;
            }
        }
    }

    Ok(())
}
