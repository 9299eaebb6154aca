use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // the terminal UI owns stdout; logs go to stderr, quiet unless RUST_LOG says otherwise
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .context("failed to build logger instance")?;

    let channels = opsbell_bridge::BridgeChannels::default();
    let backend = opsbell_backend::run(channels.backend_rx, channels.backend_tx);
    opsbell_frontend::run(channels.frontend_rx, channels.frontend_tx)?;

    if backend.join().is_err() {
        log::error!("Backend thread panicked");
    }
    Ok(())
}
