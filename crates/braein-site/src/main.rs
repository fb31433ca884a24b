//! BRÆIN Site - headless preview
//!
//! Builds the contact page on an in-memory surface, mounts every behaviour
//! and walks through a visit: scroll, open the menu, jump to the form and
//! send an enquiry through the simulated transport.
//!
//! ```bash
//! braein-site --config site.json
//! RUST_LOG=debug braein-site --width 390 --simulate-failure "offline"
//! ```

use braein_common::{init_tracing, MemorySurface, RenderSurface, SiteConfig};
use braein_forms::{SimulatedTransport, SubmissionState};
use braein_site::{preview, Site};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "braein-site")]
#[command(version)]
#[command(about = "Headless preview of the BRÆIN site behaviours", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long, short, env = "BRAEIN_SITE_CONFIG")]
    config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Page path used for active link highlighting
    #[arg(long, default_value = "/kontakt.html")]
    path: String,

    /// Make the simulated transport fail with this message
    #[arg(long)]
    simulate_failure: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing("info")?;

    tracing::info!("BRÆIN site preview v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => SiteConfig::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "config not loaded, using defaults");
            SiteConfig::default()
        }),
        None => SiteConfig::default(),
    };
    if let Some(reason) = args.simulate_failure {
        config.forms.simulated_failure = Some(reason);
    }
    tracing::debug!(config = %serde_json::to_string(&config)?, "effective config");

    let surface = Arc::new(
        MemorySurface::new()
            .with_viewport_width(args.width)
            .with_location(args.path),
    );
    let page = preview::build(&surface);
    let transport = Arc::new(SimulatedTransport::from_config(&config.forms));
    let site = Site::init(surface.clone(), transport, &config);

    surface.scroll_window(120.0);
    surface.click(page.nav_toggle);
    surface.click(page.contact_link);
    tracing::info!(scroll_y = surface.scroll_y(), "jumped to contact section");

    let Some(form) = site.form().cloned() else {
        tracing::warn!("preview page has no contact form");
        site.teardown();
        return Ok(());
    };

    page.fill_sample(&surface);
    surface.submit(page.form);

    // the submit handler runs on the runtime; poll until it settles
    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = form.state() == SubmissionState::Idle && form.message_panel().is_some();
        if settled {
            break;
        }
    }

    for event in form.take_events() {
        tracing::info!(?event, "form event");
    }
    if let Some(panel) = form.message_panel() {
        tracing::info!(
            class = %surface.attribute(panel, "class").unwrap_or_default(),
            text = %surface.text(panel),
            "message shown"
        );
    }

    surface.advance(config.forms.message_auto_hide());
    if let Some(panel) = form.message_panel() {
        tracing::info!(display = ?surface.style(panel, "display"), "after auto-hide");
    }

    site.teardown();
    Ok(())
}
