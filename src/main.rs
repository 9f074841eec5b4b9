use mimalloc::MiMalloc;
use sqlpilot::config::Config;
use sqlpilot::console::Console;
use sqlpilot::db::Gateway;
use sqlpilot::optimizer::OpenaiChatClient;
use sqlpilot::session::Orchestrator;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let optimizer_cfg = cfg.optimizer();
    info!(
        database_path = %cfg.basic.database_path.display(),
        report_path = %cfg.basic.report_path.display(),
        loglevel = %cfg.basic.loglevel,
        api_url = %optimizer_cfg.api_url,
        api_key = if optimizer_cfg.api_key.is_some() { "<set>" } else { "<none>" },
        model = %optimizer_cfg.model,
        temperature = optimizer_cfg.temperature,
        proxy = %optimizer_cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        timeout_secs = optimizer_cfg.timeout_secs,
        retry_max_times = optimizer_cfg.retry_max_times,
        "Configuration loaded"
    );
    if optimizer_cfg.api_key.is_none() {
        warn!("No API key configured; optimization requests will fail until one is set");
    }

    let gateway = Gateway::new(&cfg.basic.database_path);
    gateway.bootstrap().await?;

    let optimizer = OpenaiChatClient::new(&optimizer_cfg)?;
    let orchestrator = Orchestrator::new(gateway, optimizer, &cfg.basic.report_path);
    Console::new(orchestrator).run().await?;

    info!("Session ended");
    Ok(())
}
