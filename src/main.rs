mod app;
mod compositor;
mod config;
mod input;
mod particle;
mod projector;
mod sim;
mod status;
mod terminal;
mod trail;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    config::init_logging(args.log_file.as_deref())?;
    app::run(args.settings())
}
