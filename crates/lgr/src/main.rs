use std::sync::Arc;

use lgr_catalog::GardenCatalog;

use lgr_core::{catalog::port::CatalogPort, config::Config};

#[tokio::main]
async fn main() -> Result<(), lgr_core::Error> {
    lgr_core::logging::init("lgr")?;

    let cfg = Arc::new(Config::load()?);

    let catalog: Arc<dyn CatalogPort> = Arc::new(GardenCatalog::from_config(&cfg)?);

    lgr_telegram::router::run_polling(cfg, catalog)
        .await
        .map_err(|e| lgr_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
