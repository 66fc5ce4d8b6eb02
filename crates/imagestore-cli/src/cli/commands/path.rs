//! `imagestore path <version>` – print the local ISO path for a version.

use anyhow::{Context, Result};
use imagestore_core::store::Store;

pub fn run_path(store: &Store, version: &str) -> Result<()> {
    let path = store
        .base_path(version)
        .with_context(|| format!("resolve version {}", version))?;
    println!("{}", path.display());
    Ok(())
}
