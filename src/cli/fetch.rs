use std::sync::Arc;

use clap::Parser;

use crate::{
    cli::device::DeviceArgs,
    coordinator::Source,
    entity::Entity,
    prelude::*,
    tables::build_entities_table,
};

#[derive(Parser)]
pub struct FetchArgs {
    #[clap(flatten)]
    device: DeviceArgs,
}

impl FetchArgs {
    /// A failed refresh still prints the table: the status entity explains what went wrong.
    pub async fn run(self) -> Result {
        let coordinator = self.device.coordinator()?;
        let refreshed = coordinator.refresh().await;
        info!(
            n_fields = coordinator.current_snapshot().len(),
            status = %coordinator.current_status(),
            "refreshed"
        );
        let source: Arc<dyn Source> = coordinator;
        println!("{}", build_entities_table(&Entity::all(&source)));
        refreshed.context("failed to refresh")?;
        Ok(())
    }
}
