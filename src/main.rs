use anyhow::Result;
use clap::Parser;

use subcue::{
    cli, config,
    formats::time,
    pipeline,
    report::{ErrorReporter, FileReporter, TracingReporter},
};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg = config::Config::load(args.config.as_deref())?;
    config::init_tracing(&cfg.logging, args.log_level.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "subcue starting");

    match args.command {
        cli::Command::Segment(cmd) => {
            let reporter: Box<dyn ErrorReporter> = match &cmd.error_log {
                Some(path) => Box::new(FileReporter::new(path.clone())),
                None => Box::new(TracingReporter),
            };
            pipeline::run_segment(cmd, &cfg, reporter.as_ref())
        }
        cli::Command::Encode { seconds } => {
            println!("{}", time::encode(seconds)?);
            Ok(())
        }
        cli::Command::Decode { timestamp } => {
            println!("{:.3}", time::decode(&timestamp)?);
            Ok(())
        }
        cli::Command::PrintDefaultConfig => {
            let s = cfg.to_toml_pretty()?;
            print!("{s}");
            Ok(())
        }
    }
}
