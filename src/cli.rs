mod burrow;
mod device;
mod fetch;
mod serve;

use clap::{Parser, Subcommand};

pub use self::{burrow::BurrowArgs, fetch::FetchArgs, serve::ServeArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: poll the cloud and serve the entity states over HTTP.
    #[clap(name = "serve")]
    Serve(Box<ServeArgs>),

    /// Refresh once and print the entity states.
    #[clap(name = "fetch")]
    Fetch(Box<FetchArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}
