use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{middleware, web, App, HttpServer};
use log::info;

use crate::core::auth::TokenService;
use crate::core::error::AppError;
use crate::core::settings::Settings;
use crate::storage::Repository;
use crate::web::handlers;

/// Bind the HTTP API to the configured address
///
/// Fails without serving anything if the address cannot be bound. The
/// returned server runs until it is stopped.
pub fn bind_web_server(
    settings: &Settings,
    repository: Arc<dyn Repository>,
) -> std::io::Result<Server> {
    let (address, port) = settings.bind_target();

    // Create shared application state
    let app_state = web::Data::new(AppState::new(
        repository,
        TokenService::from_settings(settings),
    ));
    let cors_max_age = settings.cors_max_age_seconds;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(cors_max_age))
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind((address.as_str(), port))?
    .run();

    info!("Web server listening on http://{}:{}", address, port);
    Ok(server)
}

/// Register the API routes and body parsing rules
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // System APIs
        .route("/", web::get().to(handlers::system::health_check))
        .route("/check/token", web::get().to(handlers::system::check_token))
        // User APIs
        .route("/users", web::post().to(handlers::users::create_user))
        .route("/users/login", web::post().to(handlers::users::login))
        // Goal APIs
        .route("/goals", web::get().to(handlers::goals::get_goals))
        .route("/goals", web::post().to(handlers::goals::create_goal))
        // Daily value APIs
        .route("/values", web::get().to(handlers::values::get_daily_values))
        .route("/values", web::post().to(handlers::values::create_daily_value));
}

/// Malformed bodies are reported with the same shape as other errors
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::validation(err.to_string()).into())
}

fn cors(max_age: usize) -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(max_age)
}

/// Shared application state for web handlers
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, tokens: TokenService) -> Self {
        Self { repository, tokens }
    }
}


#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test;

    use super::test_support::memory_state;
    use super::*;
    use crate::storage::SqliteRepository;

    #[actix_web::test]
    async fn test_cors_preflight_allows_any_origin() {
        let app = test::init_service(
            App::new()
                .wrap(cors(3600))
                .app_data(memory_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/goals")
            .insert_header((header::ORIGIN, "http://example.com"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://example.com"
        );
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let app = test::init_service(
            App::new().app_data(memory_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_bind_fails_on_occupied_port() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let settings = Settings {
            jwt_secret_key: "secret".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: occupied.local_addr().unwrap().port(),
            ..Settings::default()
        };
        let repository = Arc::new(SqliteRepository::open_in_memory().unwrap());

        assert!(bind_web_server(&settings, repository).is_err());
    }
}
