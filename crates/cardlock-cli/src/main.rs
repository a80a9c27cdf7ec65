//! Host simulator for the card-lock controller.
//!
//! Runs the real control loop over mock hardware with real-time sleeps. The
//! reader is fed a scripted session: every allow-listed card, then one
//! unknown card, each held for a few polls and then taken away. The
//! simulator exits when the session is over or on Ctrl-C.
//!
//! Configuration comes from the JSON file named by `CARDLOCK_CONFIG`, or the
//! built-in defaults. Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use cardlock_controller::{ControlLoop, ControllerConfig};
use cardlock_core::{CardId, PollResult};
use cardlock_hardware::ThreadDelay;
use cardlock_hardware::mock::{MockBench, MockCardReader};
use tracing::{error, info};

/// Card used for the denied part of the session (unless it is allow-listed).
const UNKNOWN_CARD: CardId = CardId::new([0xDE, 0xAD, 0xBE, 0xEF]);

/// Polls a card stays in the field.
const HOLD_POLLS: usize = 3;

/// Empty polls between two cards.
const GAP_POLLS: usize = 2;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Poll results of one session over `cards`.
fn session(cards: impl IntoIterator<Item = CardId>) -> Vec<PollResult> {
    let mut polls = vec![PollResult::NoCard; GAP_POLLS];
    for card in cards {
        polls.extend(std::iter::repeat_n(PollResult::Card(card), HOLD_POLLS));
        polls.extend(std::iter::repeat_n(PollResult::NoCard, GAP_POLLS));
    }
    polls
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ControllerConfig::from_env().context("failed to load configuration")?;

    let (reader, reader_handle) = MockCardReader::new();
    let (bank, bench) = MockBench::with_delay(config.led_count, Box::new(ThreadDelay));

    let mut controller = ControlLoop::builder()
        .config(&config)?
        .reader(Box::new(reader))
        .actuators(bank)
        .build()
        .context("failed to build control loop")?;

    let mut cards: Vec<CardId> = config.allow_list.iter().map(|e| e.card).collect();
    if !cards.contains(&UNKNOWN_CARD) {
        cards.push(UNKNOWN_CARD);
    }
    reader_handle.script(session(cards));

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping after the current iteration");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    info!(
        reader = %controller.reader_info().name,
        cards = controller.policy().len(),
        "simulator running, Ctrl-C to stop"
    );

    let controller = tokio::task::spawn_blocking(move || {
        let feed = reader_handle.clone();
        controller.run_until(|| stop.load(Ordering::SeqCst) || feed.pending() == 0);
        controller
    })
    .await
    .context("control loop panicked")?;

    for event in controller.history() {
        info!(card = %event.card, decision = %event.decision, at = %event.at, "access");
    }
    info!(
        relay_on = bench.relay_on(),
        light_on = bench.light_on(),
        display = %bench.display_text(),
        "final outputs"
    );

    Ok(())
}
