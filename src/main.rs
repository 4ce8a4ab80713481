use anyhow::Result;
use ctx2md::{Task, cli::parse_args, run_export};
use log::LevelFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = parse_args()?;
    init_logging(config.verbosity);

    match config.task {
        Task::Export(export) => run_export(&export).await,
        #[cfg(feature = "scaffold")]
        Task::Scaffold(scaffold) => {
            ctx2md::scaffold::run_scaffold(&scaffold, &ctx2md::scaffold::ProcessRunner)
                .await
                .map(|_| ())
        }
    }
}

/// `RUST_LOG` wins over `-v` when both are set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
