use anyhow::Result;
use burn_ndarray::{NdArray, NdArrayDevice};
use clap::Parser;
use winsor_cli::{run, Cli, ConsoleObserver};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Cli::parse().into_config()?;
    let device = NdArrayDevice::default();

    run::<NdArray<f32>>(&config, &device, &ConsoleObserver)?;
    Ok(())
}
