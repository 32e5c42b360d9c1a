use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use chapa_client::ChapaConfig;
use log::info;
use storefront_engine::{
    events::EventHandlers,
    sqlite,
    AbuseApi,
    CartApi,
    CatalogApi,
    CheckoutApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::chapa::ChapaGateway,
    mailer::{build_event_hooks, MailApiClient},
    middleware::RequestLogMiddlewareFactory,
    routes::{
        add_cart_item,
        checkout,
        create_product,
        get_cart,
        health,
        list_products,
        order_history,
        register_customer,
        remove_cart_item,
        verify_payment,
    },
    workers::{start_abuse_worker, start_rollover_worker},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    sqlite::db::run_migrations(db.pool())
        .await
        .map_err(|e| ServerError::InitializeError(format!("Migration failure: {e}")))?;
    let gateway = ChapaGateway::new(ChapaConfig::new_from_env_or_default())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mailer = MailApiClient::new(config.mail.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    // Notification hooks run on their own tasks, decoupled from the settlement transaction.
    let handlers = EventHandlers::new(16, build_event_hooks(mailer, config.mail.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let rollover = start_rollover_worker(db.clone(), config.rollover_interval);
    let abuse_scan = start_abuse_worker(db.clone(), config.abuse.clone());
    info!("🚀️ Background workers started");
    let srv = create_server_instance(config, db, gateway, producers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    rollover.abort();
    abuse_scan.abort();
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: ChapaGateway,
    producers: storefront_engine::events::EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let catalog_api = CatalogApi::new(db.clone());
        let cart_api = CartApi::new(db.clone());
        let checkout_api =
            CheckoutApi::new(db.clone(), gateway.clone(), config.checkout.clone(), producers.clone());
        let abuse_api = AbuseApi::new(db.clone())
            .with_limits(config.abuse.sensitive_paths.clone(), config.abuse.max_requests);
        let api_scope = web::scope("/api")
            .wrap(RequestLogMiddlewareFactory::new(abuse_api, config.use_x_forwarded_for))
            .route("/products", web::post().to(create_product::<SqliteDatabase>))
            .route("/products", web::get().to(list_products::<SqliteDatabase>))
            .route("/customers", web::post().to(register_customer::<SqliteDatabase>))
            .route("/cart", web::post().to(add_cart_item::<SqliteDatabase>))
            .route("/cart/{customer_id}", web::get().to(get_cart::<SqliteDatabase>))
            .route(
                "/cart/{customer_id}/{product_id}",
                web::delete().to(remove_cart_item::<SqliteDatabase>),
            )
            .route("/checkout", web::post().to(checkout::<SqliteDatabase, ChapaGateway>))
            .route("/verify-payment", web::post().to(verify_payment::<SqliteDatabase, ChapaGateway>))
            .route("/orders/{customer_id}", web::get().to(order_history::<SqliteDatabase, ChapaGateway>));
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("nss::access_log"))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(checkout_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
