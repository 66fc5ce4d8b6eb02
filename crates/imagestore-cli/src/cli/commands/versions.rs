//! `imagestore versions` – list catalog versions and their asset URLs.

use imagestore_core::store::Store;

pub fn run_versions(store: &Store) {
    let catalog = store.catalog();
    for version in catalog.versions() {
        println!("{}", version);
        if let Some(assets) = catalog.get(version) {
            for (key, url) in assets {
                println!("  {:<12} {}", key, url);
            }
        }
    }
}
