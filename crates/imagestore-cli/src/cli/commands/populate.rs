//! `imagestore populate` – download missing images; Ctrl-C cancels in-flight transfers.

use anyhow::Result;
use imagestore_core::control::CancelToken;
use imagestore_core::populate::Outcome;
use imagestore_core::store::Store;

pub async fn run_populate(store: &Store, show_report: bool) -> Result<()> {
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling downloads");
            on_signal.cancel();
        }
    });

    let report = store.populate_report(&cancel).await;
    signal_task.abort();
    let report = report?;

    if show_report {
        for (version, outcome) in report.iter() {
            match outcome {
                Ok(Outcome::AlreadyPresent) => println!("{:<10} present", version),
                Ok(Outcome::Downloaded { bytes }) => {
                    println!("{:<10} downloaded ({} bytes)", version, bytes)
                }
                Err(e) => println!("{:<10} failed: {}", version, e),
            }
        }
    }

    report.into_result()?;
    Ok(())
}
