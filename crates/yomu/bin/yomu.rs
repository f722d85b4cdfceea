#[macro_use]
extern crate log;

use std::{sync::Arc, time::Duration};

use clap::Parser;
use yomu::{
    application::worker,
    domain::services::{
        catalogue::CatalogueService,
        library::LibraryService,
        page::{PageService, PageStrategy},
    },
    infrastructure::{
        config::{Config, GLOBAL_CONFIG},
        domain::repositories::{
            image::ImageRepositoryImpl, library::LibraryRepositoryImpl,
            progress::ProgressRepositoryImpl, source::SourceRepositoryImpl,
        },
        store::FileStore,
    },
    presentation::{Server, rest::proxy::Relay},
};

#[derive(Parser)]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let mut log_builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        if let Ok(yomu_log) = std::env::var("YOMU_LOG") {
            log_builder.parse_filters(&format!("yomu={yomu_log}"));
        }
    }
    log_builder.init();

    let opts: Opts = Opts::parse();
    let config =
        GLOBAL_CONFIG.get_or_init(|| Config::open(opts.config).expect("failed to init config"));

    debug!("config: {config:?}");

    let store = FileStore::open(&config.data_path, config.store_capacity)?;
    let library_repo = LibraryRepositoryImpl::new(store.clone());
    let progress_repo = ProgressRepositoryImpl::new(store);
    let source_repo = SourceRepositoryImpl::new(&config.api_url, &config.cover_url);
    let image_repo = ImageRepositoryImpl::new(Duration::from_secs(config.page_timeout))?;

    let strategies = vec![
        PageStrategy::relay(&config.relay_url),
        PageStrategy::cors_proxy(&config.cors_proxy_url),
        PageStrategy::direct(),
    ];

    let catalogue_svc = CatalogueService::new(source_repo.clone());
    let page_svc = PageService::new(source_repo, image_repo, strategies);
    let library_svc = Arc::new(LibraryService::new(
        library_repo,
        progress_repo,
        catalogue_svc,
        page_svc,
    ));

    let (download_tx, download_rx) = worker::downloads::channel();
    let download_worker_handle = worker::downloads::start(library_svc, download_tx, download_rx);

    let relay = Relay::new()?;
    let server_fut = Server::new(relay).serve(([0, 0, 0, 0], config.port));

    tokio::select! {
        res = server_fut => {
            if let Err(e) = res {
                error!("server error: {e}");
            }
            info!("server shutdown");
        }
        _ = download_worker_handle => {
            info!("download worker quit");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl+c signal");
        }
    }

    Ok(())
}
