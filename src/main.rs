use log::{error, info};
use news_api::config::Settings;
use news_api::db::{ErrorKind, Result};

async fn run() -> Result<()> {
    let settings = Settings::from_env()?;
    let repository = settings.repository()?;
    let rocket = news_api::rocket(repository)
        .ignite()
        .await
        .map_err(|e| ErrorKind::Launch(e.to_string()))?;
    info!(
        "serving the {:?} backend (pool size {})",
        settings.backend, settings.pool_size
    );
    rocket
        .launch()
        .await
        .map_err(|e| ErrorKind::Launch(e.to_string()))?;
    Ok(())
}

#[rocket::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        eprintln!("news-api: {}", e);
        std::process::exit(1);
    }
}
