use autos_cli::Cli;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    autos_cli::init_tracing();
    Cli::parse().run()
}
