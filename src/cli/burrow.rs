use clap::{Parser, Subcommand};

use crate::{cli::device::DeviceArgs, prelude::*, tables::build_snapshot_table};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Dump all the raw realtime fields, bypassing the coordinator.
    Raw(BurrowRawArgs),
}

#[derive(Parser)]
struct BurrowRawArgs {
    #[clap(flatten)]
    device: DeviceArgs,
}

impl BurrowArgs {
    pub async fn run(self) -> Result {
        match self.command {
            BurrowCommand::Raw(args) => {
                let credentials = args.device.credentials()?;
                let snapshot = args
                    .device
                    .api(&credentials)?
                    .get_realtime_info(credentials.serial_number())
                    .await
                    .context("failed to fetch the realtime info")?;
                info!(n_fields = snapshot.len(), "gotcha");
                println!("{}", build_snapshot_table(&snapshot));
            }
        }
        Ok(())
    }
}
