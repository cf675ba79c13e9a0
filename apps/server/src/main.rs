use anyhow::Context;
use ocrhub::kernel::config::ConfigLoader;
use ocrhub::kernel::prelude::ApiConfig;
use ocrhub_server::{Server, init_logger};

#[cfg(feature = "profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[ocrhub_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "profiling")]
    let _profiler = dhat::Profiler::new_heap();

    let loader = ConfigLoader::new();
    let config_path = loader.resolved_path();
    let cfg: ApiConfig = loader.load().context("Critical: Configuration is malformed")?;

    let _log = init_logger(env!("CARGO_PKG_NAME"), &cfg.log)?;
    tracing::info!(path = %config_path.display(), version = env!("CARGO_PKG_VERSION"), "Configuration loaded");

    Server::builder().config(cfg).build().await?.run().await
}
