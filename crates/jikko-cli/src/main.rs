mod cmd;

use anyhow::Context as _;
use jikko_core::config::Config;
use jikko_core::{Context, Outcome, Router, RouterConfig};

pub const PROGRAM: &str = "jikko";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match run() {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<Outcome> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = Config::load().context("failed to load config")?;
    let ctx = Context::new(config);
    let registry = cmd::registry().context("failed to build command registry")?;

    let router = Router::new(RouterConfig::new(PROGRAM, VERSION), registry);
    router.run(&ctx, &args)
}
