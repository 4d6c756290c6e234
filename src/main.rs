use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use adhesio_sense::config::{ensure_upload_dir, Config};
use adhesio_sense::handlers::{self, AppState};
use adhesio_sense::models::SERVICE_NAME;
use adhesio_sense::predictor::MockPredictor;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    ensure_upload_dir(&config.upload_folder).map_err(|e| {
        log::error!(
            "Failed to create upload folder {}: {}",
            config.upload_folder.display(),
            e
        );
        e
    })?;

    let predictor = match config.predictor_seed {
        Some(seed) => {
            log::info!("Mock predictor seeded with {}", seed);
            MockPredictor::seeded(seed)
        }
        None => MockPredictor::from_entropy(),
    };
    log::warn!(
        "No model is loaded from {}, predictions are mocked",
        config.model_path.display()
    );
    let state = web::Data::new(AppState::new(predictor));

    let address = config.get_address();
    log::info!("Starting {}...", SERVICE_NAME);
    log::info!("Server running on http://{}", address);
    log::info!("Available endpoints:");
    log::info!("  GET  /health - Health check");
    log::info!("  POST /predict - Adhesion prediction");
    log::info!("  GET  / - API information");

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure_routes)
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind(address)?.run().await
}
