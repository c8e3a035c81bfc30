#![allow(clippy::doc_markdown)]

mod api;
mod cli;
mod coordinator;
mod credentials;
mod entity;
mod error;
mod prelude;
mod server;
mod tables;
mod telemetry;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Serve(args) => (*args).run().await,
        Command::Fetch(args) => (*args).run().await,
        Command::Burrow(args) => (*args).run().await,
    }
}
