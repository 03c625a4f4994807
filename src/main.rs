use env_logger::Env;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match adsb_alerter::state::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = adsb_alerter::run(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
