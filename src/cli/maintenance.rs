//! Maintenance commands - clearing persisted state

use crate::AppServices;

pub async fn reset_assignments(services: &AppServices) -> anyhow::Result<()> {
    let removed = services.variations.reset().await?;
    println!("Removed {} variation assignment(s)", removed);
    Ok(())
}

pub async fn clear_cache(services: &AppServices) -> anyhow::Result<()> {
    if services.synchronizer.clear().await? {
        println!("Cleared cached announcements");
    } else {
        println!("No cached announcements");
    }
    Ok(())
}
