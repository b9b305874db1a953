use clap::Parser;
use pdfunlock::{Application, Config, telemetry};

/// Resolves on the first of Ctrl+C or SIGTERM. A signal that can't be installed never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Could not listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "Ctrl+C",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down, letting in-flight uploads finish");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = pdfunlock::config::Args::parse();

    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry(&config.log_filter)?;

    tracing::debug!("{:?}", args);

    Application::new(config).serve(shutdown_signal()).await
}
