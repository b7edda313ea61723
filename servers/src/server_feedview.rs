use anyhow::{Context, Result};
use lib_feedview::{BoundedView, FileSurface, IngestionLoop, MemorySurface, PageRenderer, RedisFeed};
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod feedview_logic;
use feedview_logic::{config, downstream, logger};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = config::load_config().context("Failed to load configuration")?;
    let log_path = logger::setup_logging(&settings.log_dir, &settings.log_level)
        .with_context(|| format!("Failed to set up logging in {}", settings.log_dir.display()))?;
    log::info!("Logging to {}", log_path.display());
    match &settings.config_file {
        Some(path) => log::info!("Applied config file {}", path.display()),
        None => log::info!("No config file found, using defaults and command line."),
    }

    let feed = RedisFeed::new(&settings.broker_url, &settings.topic, &settings.group_id);
    let view = BoundedView::new(settings.max_rows).context("Invalid table capacity")?;
    let renderer = PageRenderer::new(&settings.topic);
    let memory = MemorySurface::new();
    let surface = (memory.clone(), settings.output_path.clone().map(FileSurface::new));

    // Bind first so a taken port fails startup instead of leaving a headless ingester
    let listener = downstream::bind(settings.port).await?;
    let shutdown = CancellationToken::new();

    let mut ingestion = IngestionLoop::new(view, renderer, surface).with_render_interval(settings.render_interval);
    let ingestion_token = shutdown.clone();
    let mut ingestion_handle = tokio::spawn(async move { ingestion.run(&feed, ingestion_token).await });

    let mut downstream_handle = tokio::spawn(downstream::run(listener, memory, shutdown.clone()));

    // Wait for a shutdown signal, or for either task to end on its own
    let early_exit = tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
            Exit::Signal
        }
        _ = terminate_signal() => {
            log::info!("SIGTERM received, initiating shutdown.");
            Exit::Signal
        }
        res = &mut ingestion_handle => Exit::Ingestion(res),
        res = &mut downstream_handle => Exit::Viewer(res),
    };

    // Stop all components
    shutdown.cancel();

    let (ingestion_result, viewer_result) = match early_exit {
        Exit::Signal => (ingestion_handle.await, downstream_handle.await),
        Exit::Ingestion(res) => (res, downstream_handle.await),
        Exit::Viewer(res) => {
            log::error!("Viewer stopped while the feed was still running.");
            (ingestion_handle.await, res)
        }
    };
    let viewer_failed = match viewer_result {
        Ok(Ok(())) => false,
        Ok(Err(e)) => {
            log::error!("Viewer stopped with error: {:#}", e);
            true
        }
        Err(e) => {
            log::error!("Viewer task failed: {}", e);
            true
        }
    };
    match ingestion_result? {
        Ok(summary) => {
            log::info!(
                "Shutdown complete. {} messages, {} degraded, {} evicted.",
                summary.messages,
                summary.degraded,
                summary.evicted
            );
            if viewer_failed {
                anyhow::bail!("HTTP viewer failed");
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Feed session ended: {}", e);
            Err(e.into())
        }
    }
}

enum Exit<I, V> {
    Signal,
    Ingestion(I),
    Viewer(V),
}

async fn terminate_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term_signal) => {
                term_signal.recv().await;
            }
            Err(e) => {
                log::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        // On non-unix platforms, just wait forever.
        std::future::pending::<()>().await;
    }
}
