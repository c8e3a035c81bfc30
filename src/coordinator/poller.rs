use std::{pin::pin, sync::Arc};

use tokio::select;

use crate::{
    coordinator::{Coordinator, Fetch, ticker::Ticker},
    prelude::*,
};

/// Refresh the coordinator on every tick until the shutdown resolves or the ticker stops.
///
/// Failed refreshes are already recorded by the coordinator, the next tick is the retry.
#[instrument(skip_all)]
pub async fn poll<F: Fetch>(
    coordinator: Arc<Coordinator<F>>,
    mut ticker: impl Ticker,
    shutdown: impl Future<Output = ()>,
) {
    let mut shutdown = pin!(shutdown);
    loop {
        select! {
            () = &mut shutdown => {
                info!("shutting down…");
                break;
            }
            ticked = ticker.tick() => {
                if !ticked {
                    info!("ticker stopped");
                    break;
                }
            }
        }
        let _ = coordinator.refresh().await;
    }
}
