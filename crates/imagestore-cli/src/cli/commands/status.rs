//! `imagestore status` – show every version and whether its image is on disk.

use anyhow::Result;
use imagestore_core::store::Store;

pub fn run_status(store: &Store) -> Result<()> {
    if store.catalog().is_empty() {
        println!("No versions in catalog.");
        return Ok(());
    }
    println!("Data directory: {}", store.data_dir().display());
    println!("{:<10} {:<8} {:<12} {}", "VERSION", "PRESENT", "SIZE", "PATH");
    for version in store.catalog().versions() {
        let path = match store.base_path(version) {
            Ok(p) => p,
            Err(e) => {
                println!("{:<10} {:<8} {:<12} {}", version, "-", "-", e);
                continue;
            }
        };
        let size = std::fs::metadata(&path).ok().map(|m| m.len());
        println!(
            "{:<10} {:<8} {:<12} {}",
            version,
            if size.is_some() { "yes" } else { "no" },
            size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            path.display()
        );
    }
    Ok(())
}
