use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = wavebake::config::Config::parse();
    wavebake::app::run(cfg)
}
