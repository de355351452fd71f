use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use promo_countdown::api::{ApiClient, Masterclass};
use promo_countdown::banner::Banner;
use promo_countdown::config::Config;
use promo_countdown::countdown::{Clock, CountdownEngine, SystemClock};
use promo_countdown::events::{CountdownId, Event};
use promo_countdown::logging;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load("config.toml")?;
    logging::init(&cfg.general.log_level);
    info!("Loaded config: {:?}", cfg);

    let client = ApiClient::new(&cfg.api.base_url);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let offset = cfg.countdown.utc_offset();

    // Create the event channel
    let (tx, mut rx) = mpsc::channel::<Event>(100);
    let new_engine = |id| {
        CountdownEngine::new(id, Arc::clone(&clock))
            .with_interval(cfg.countdown.tick_interval())
            .with_events(tx.clone())
    };
    let mut engines: HashMap<CountdownId, CountdownEngine> = HashMap::new();

    // Sitewide banner
    let discounts = client.discounts().await.unwrap_or_else(|e| {
        warn!("Failed to fetch discounts: {e}");
        Vec::new()
    });
    let banner = Banner::select(&discounts, clock.now());
    let mut banner_engine = new_engine(CountdownId::Banner);
    banner_engine.set_window(banner.window());
    if let Some(msg) = banner.message(&banner_engine.display()) {
        info!("{msg}");
    } else {
        info!("No running global discount, banner hidden");
    }
    engines.insert(CountdownId::Banner, banner_engine);

    // Masterclass registration countdowns
    let masterclasses = client.masterclasses().await.unwrap_or_else(|e| {
        warn!("Failed to fetch masterclasses: {e}");
        Vec::new()
    });
    let mut titles: HashMap<i64, String> = HashMap::new();
    for mc in &masterclasses {
        let mut engine = new_engine(mc.countdown_id());
        engine.set_window(mc.registration_window());
        log_masterclass(mc, &engine, offset);
        titles.insert(mc.id, mc.title.clone());
        engines.insert(mc.countdown_id(), engine);
    }

    let mut live: HashSet<CountdownId> = engines
        .iter()
        .filter(|(_, engine)| engine.state().is_running())
        .map(|(id, _)| *id)
        .collect();
    if live.is_empty() {
        info!("Nothing to count down");
        return Ok(());
    }

    // Ctrl+C
    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(Event::Shutdown).await;
        }
    });

    // Main event loop
    info!("Starting event loop... (Ctrl+C to quit)");
    while let Some(event) = rx.recv().await {
        match event {
            Event::Tick {
                id: CountdownId::Banner,
                remaining,
            } => {
                if let Some(msg) = banner.message(&remaining.to_string()) {
                    info!("{msg}");
                }
            }
            Event::Tick {
                id: CountdownId::Masterclass(id),
                remaining,
            } => {
                let title = titles.get(&id).map(String::as_str).unwrap_or("?");
                info!("[{title}] Début de la masterclass dans : {remaining}");
            }
            Event::Expired { id } => {
                live.remove(&id);
                match id {
                    CountdownId::Banner => info!("Global discount expired, hiding banner"),
                    CountdownId::Masterclass(id) => {
                        let title = titles.get(&id).map(String::as_str).unwrap_or("?");
                        info!("[{title}] Masterclass started, registration switches to join now");
                    }
                }
            }
            Event::Shutdown => {
                info!("Shutting down...");
                break;
            }
        }

        if live.is_empty() {
            info!("All countdowns finished");
            break;
        }
    }

    Ok(())
}

fn log_masterclass(mc: &Masterclass, engine: &CountdownEngine, offset: chrono::FixedOffset) {
    let start_hour = mc.start_hour(offset).unwrap_or_default();
    let total = mc
        .total_duration()
        .map(|d| d.to_string())
        .unwrap_or_default();
    info!(
        slug = %mc.slug,
        start_hour = %start_hour,
        total_duration = %total,
        "[{}] Début de la masterclass dans : {}",
        mc.title,
        engine.display()
    );
}
