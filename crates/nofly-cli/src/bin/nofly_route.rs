use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nofly_cli::{plan, read_input, Args};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("nofly_cli=info".parse()?))
        .init();

    let args = Args::parse();
    let document = read_input(&args.input)?;
    let rendered = plan(&args, &document)?;
    println!("{rendered}");
    Ok(())
}
