//! `imgest assets` – list registered assets.

use anyhow::Result;
use chrono::DateTime;
use imgest_core::registry::AssetDb;

pub async fn run_assets(db: &AssetDb) -> Result<()> {
    let assets = db.list().await?;
    if assets.is_empty() {
        println!("No assets registered.");
        return Ok(());
    }
    println!("{:<6} {:<8} {:<20} {:<12} {}", "ID", "POST", "ADDED", "MIME", "URL");
    for a in assets {
        let added = DateTime::from_timestamp(a.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<8} {:<20} {:<12} {}",
            a.id, a.parent_id, added, a.mime, a.url
        );
    }
    Ok(())
}
