use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use bookshelf_api::application::auth_service::AuthService;
use bookshelf_api::application::library_service::LibraryService;
use bookshelf_api::data::user_repository::InMemoryUserRepository;
use bookshelf_api::infrastructure::logging::init_logging;
use bookshelf_api::presentation::handlers::{
    AppState, add_user, health_check, login, me, remove_book, save_book,
};
use bookshelf_api::presentation::middleware::{RequestIdMiddleware, TokenAuthMiddleware};
use bookshelf_api::presentation::resolvers::Resolvers;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logging();
    info!("Logging initialized successfully");

    let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "JWT_SECRET must be set")
    })?;
    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("Creating in-memory user repository");
    let repository = Arc::new(InMemoryUserRepository::new());

    info!("Creating resolver dispatcher");
    let resolvers = Resolvers::new(
        AuthService::new(repository.clone(), jwt_secret.clone()),
        LibraryService::new(repository),
    );
    let state = web::Data::new(AppState { resolvers });

    info!("Configuring HTTP server");
    let server = HttpServer::new(move || {
        tracing::trace!("Creating new application instance");
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(TokenAuthMiddleware::new(jwt_secret.clone()))
            .wrap(RequestIdMiddleware)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .route("/me", web::get().to(me))
                    .route("/users", web::post().to(add_user))
                    .route("/login", web::post().to(login))
                    .route("/me/books", web::put().to(save_book))
                    .route("/me/books/{bookId}", web::delete().to(remove_book)),
            )
    });

    info!(address = %bind_addr, "Binding server to address");
    let server = server.bind(bind_addr.as_str())?;

    info!(
        address = %bind_addr,
        routes = %"GET /api/health, GET /api/me, POST /api/users, POST /api/login, PUT /api/me/books, DELETE /api/me/books/{bookId}",
        "Starting HTTP server"
    );
    server.run().await
}
