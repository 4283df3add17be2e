//! Headless runner: bootstraps an ecosystem and ticks it until done or interrupted.

mod settings;
mod telemetry;

use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use vivarium_world::bootstrap;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = settings::load()?;
    info!(
        num_ticks = config.num_ticks,
        seed = config.seed,
        width = config.world.width,
        height = config.world.height,
        "Starting vivarium runner"
    );

    let mut ecosystem = bootstrap(&config)?;
    info!(next_id = %ecosystem.next_id, "Ecosystem ready");

    let token = CancellationToken::new();
    let sim_token = token.clone();
    let num_ticks = config.num_ticks;

    // Ticks are CPU-bound and evaluate on rayon, so keep them off the async workers.
    let mut simulation = tokio::task::spawn_blocking(move || {
        let summary = ecosystem
            .environment
            .run_until(num_ticks, || sim_token.is_cancelled())?;
        Ok::<_, vivarium_core::Error>((summary, ecosystem.environment.snapshot()))
    });

    let (summary, last) = tokio::select! {
        result = &mut simulation => result??,
        _ = shutdown_signal() => {
            info!("Cancelling simulation after the current tick");
            token.cancel();
            simulation.await??
        }
    };

    info!(
        ticks_run = summary.ticks_run,
        final_tick = last.tick,
        day = last.day,
        hour = last.hour,
        survivors = last.len(),
        cancelled = summary.cancelled,
        "Simulation stopped"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
