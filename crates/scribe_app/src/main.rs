//! Headless terminal client driving a server-side transcription job.
mod driver;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = driver::Args::parse();
    driver::run(args)
}
