use clap::Parser;
use mcsim::cli::{self, Args};
use mcsim::init_logging;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&args, &mut out)?;

    tracing::debug!("mcsim finished");
    Ok(())
}
