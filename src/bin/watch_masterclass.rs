use anyhow::{Context, Result};
use std::sync::Arc;

use promo_countdown::api::ApiClient;
use promo_countdown::config::Config;
use promo_countdown::countdown::{Clock, CountdownEngine, CountdownState, SystemClock};
use promo_countdown::logging;
use tracing::info;

/// Follow one masterclass registration countdown until the masterclass starts.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let slug = std::env::var("MASTERCLASS_SLUG").context("MASTERCLASS_SLUG not set")?;
    let cfg = Config::load("config.toml")?;
    logging::init(&cfg.general.log_level);

    let client = ApiClient::new(&cfg.api.base_url);
    let masterclass = client.masterclass_by_slug(&slug).await?;
    info!("Masterclass: {} ({})", masterclass.title, masterclass.slug);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    if let Some(phase) = masterclass.phase(clock.now()) {
        info!("Phase: {:?}", phase);
    }

    let mut engine = CountdownEngine::new(masterclass.countdown_id(), Arc::clone(&clock))
        .with_interval(cfg.countdown.tick_interval());
    let mut updates = engine.subscribe();
    engine.set_window(masterclass.registration_window());

    loop {
        let state = *updates.borrow_and_update();
        match state {
            CountdownState::Blank => {
                info!("No start date, nothing to count down");
                break;
            }
            CountdownState::Running(remaining) => {
                info!("Début de la masterclass dans : {}", remaining);
            }
            CountdownState::Expired => {
                info!("Masterclass started, join now");
                break;
            }
        }
        if updates.changed().await.is_err() {
            break;
        }
    }

    Ok(())
}
