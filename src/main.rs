// Entrypoint: set up logging, open the session and run the interactive menu.

use anyhow::Context;
use article_studio::{config::AppConfig, session::Session, shell::Shell, ui::main_menu};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the prompts; RUST_LOG overrides.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    let session = Session::open(config.clone()).with_context(|| {
        format!(
            "Failed to open session in {}",
            config.paths.base().display()
        )
    })?;

    main_menu(Shell::new(session))?;
    Ok(())
}
