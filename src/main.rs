#![doc = include_str!("../README.md")]

mod cli;
mod core;
mod input;
mod prelude;
mod quantity;
mod tables;

use chrono::Utc;
use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, peek::peek, plan::plan},
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let now = Utc::now();
    match args.command {
        Command::Plan(args) => plan(&args, now)?,
        Command::Peek(args) => peek(&args, now)?,
    }

    info!("done!");
    Ok(())
}
