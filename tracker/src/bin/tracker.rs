use clap::Parser;
use std::{path::PathBuf, time::Instant};
use tracing::info;

use tracker_lib::{
    base_map::{BaseMapProvider, FileBaseMap},
    context::TrackerContext,
    gui::{GuiEvent, GuiState},
    observer,
    projector::Viewport,
    refresher::{HttpElementSource, Refresher},
    render::{draw_frame, RenderDriver},
    settings::{nominal, parse_url, Settings},
    store::ElementSetStore,
    units::Timestamp,
};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Settings toml file.
    ///
    /// The nominal settings are used when not provided.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Equirectangular base map image (PNG or JPEG)
    #[arg(long)]
    base_map: Option<PathBuf>,

    /// Label of the tracked object in the element set payload, e.g. "ISS (ZARYA)"
    #[arg(long)]
    label: Option<String>,

    /// Element set source URL
    #[arg(long)]
    source: Option<String>,

    /// Locate the observer by IP address when no observer position is configured
    #[arg(long)]
    locate: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let mut settings = Settings::load(opts.settings.as_ref())?;
    if let Some(p) = opts.base_map {
        settings.render.base_map = Some(p);
    }
    if let Some(label) = opts.label {
        settings.source.label = label;
    }
    if let Some(url) = opts.source.as_deref() {
        settings.source.url = parse_url(url)?;
    }
    settings.observer.locate |= opts.locate;

    info!(
        label = %settings.source.label,
        source = %settings.source.url,
        "Tracking"
    );

    let store = ElementSetStore::new(settings.source.label.clone(), settings.stale_threshold());
    let source = HttpElementSource::new(settings.source.url.clone(), settings.source.fetch_timeout)?;
    let refresher = Refresher::new(store.clone(), source, settings.refresher_config()).spawn()?;

    let observer = observer::resolve(&settings.observer, nominal::LOCATE_TIMEOUT);
    let base_map = settings
        .render
        .base_map
        .as_ref()
        .and_then(|p| FileBaseMap::new(p).base_map());

    let mut gui = GuiState::new(
        &settings.render.title,
        Viewport::new(
            f64::from(settings.render.width),
            f64::from(settings.render.height),
        ),
    );
    let mut driver = RenderDriver::new(settings.render.period);
    let mut ctx = TrackerContext::new(settings, store)
        .with_observer(observer)
        .with_base_map(base_map);
    let vp = gui.viewport();
    ctx.resize(vp.width, vp.height);

    'outer: loop {
        if intr.is_set() {
            break 'outer;
        }

        for event in gui.events() {
            match event {
                GuiEvent::Time(cmd) => {
                    ctx.time.apply(cmd);
                    driver.invalidate();
                }
                GuiEvent::Resize(vp) => {
                    if ctx.resize(vp.width, vp.height) {
                        driver.invalidate();
                    }
                }
                GuiEvent::Quit => break 'outer,
            }
        }

        driver.tick(&ctx, Timestamp::now(), Instant::now());
        if let Some(frame) = driver.frame() {
            draw_frame(frame, &ctx.settings.render, &mut gui);
        }

        if !gui.present() {
            break 'outer;
        }
    }

    info!("Shutting down");
    refresher.stop();

    Ok(())
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }
    }

    impl Default for Interruptor {
        fn default() -> Self {
            Self::new()
        }
    }
}
