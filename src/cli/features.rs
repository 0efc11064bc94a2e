//! Features command - synchronizes announcements

use tracing::info;

use crate::AppServices;

/// Synchronize and print the outcome; Ctrl+C abandons the fetch
pub async fn run(services: &AppServices) -> anyhow::Result<()> {
    match services.synchronizer.synchronize_until(interrupted()).await {
        Some(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        None => {
            info!("Synchronization interrupted, nothing was cached");
        }
    }

    Ok(())
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler could be installed; never cancel
        std::future::pending::<()>().await;
    }
}
