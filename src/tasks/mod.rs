//! Background loops for the application.
//!
//! Two recurring jobs: draining the durable outbox to its consumers, and
//! refreshing the runtime flag snapshot from the config file. Call
//! `spawn_all` once during startup to launch them.

use crate::config::FlagStore;
use crate::services::OutboxDispatcher;

const OUTBOX_POLL_SECS: u64 = 5;

/// Spawn all background tasks.
///
/// Notes
/// - Outbox consumers are idempotent, so the dispatcher loop is safe to run
///   at any cadence and to restart mid-batch.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(dispatcher: OutboxDispatcher, flags: FlagStore, flag_refresh_secs: u64) {
    {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            loop {
                match dispatcher.run_once().await {
                    Ok(n) if n > 0 => log::debug!("Outbox events dispatched: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Outbox dispatch pass failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(OUTBOX_POLL_SECS)).await;
            }
        });
    }

    {
        let flags = flags.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(flag_refresh_secs.max(1))).await;
                if let Err(e) = flags.refresh_from_file() {
                    log::error!("Failed to refresh runtime flags: {e}");
                }
            }
        });
    }
}
