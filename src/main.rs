//!
//! SubShare admin service: REST backend for the credential-sharing bot
//! console. Reads configuration from TOML file
//! (~/.config/subshare-admin/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use subshare_admin::api::handlers::PanelState;
use subshare_admin::application::services::{
    AccessControlService, AdminDirectory, CopyService, CredentialService, ExpiryMonitor,
    ExpiryMonitorConfig, ReferralService, SlotService, TransactionService,
};
use subshare_admin::auth::JwtConfig;
use subshare_admin::infrastructure::database::migrator::Migrator;
use subshare_admin::notifications::{LogPushGateway, PushDispatcher};
use subshare_admin::shared::shutdown::ShutdownCoordinator;
use subshare_admin::{
    create_api_router, create_event_bus, create_service_registry, default_config_path,
    init_database, AppConfig, DatabaseConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("SUBSHARE_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            // Initialize logging with configured level
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting SubShare Admin Service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("📊 Prometheus metrics recorder installed");

    // ── Sub-configs ────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    info!("Database: {}", db_config.url);

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        expiration_hours: app_cfg.security.jwt_expiration_hours,
        issuer: "subshare-admin".to_string(),
    };
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // Create default admin user if not exists
    create_default_admin(&db, &app_cfg).await;

    // ── Document store partitions ──────────────────────────────
    let registry = create_service_registry(&app_cfg.docstore);

    // ── Event bus for real-time notifications ──────────────────
    let event_bus = create_event_bus();
    info!("🔔 Event bus initialized for real-time notifications");

    // ── Panel services ─────────────────────────────────────────
    let slots = Arc::new(SlotService::new(registry.clone(), event_bus.clone()));
    let credentials = Arc::new(CredentialService::new(registry.clone(), event_bus.clone()));
    let transactions = Arc::new(TransactionService::new(registry.clone(), event_bus.clone()));
    let copy = Arc::new(CopyService::new(registry.clone(), event_bus.clone()));
    let referrals = Arc::new(ReferralService::new(registry.clone(), event_bus.clone()));

    // ── Access-control context ─────────────────────────────────
    let admins = Arc::new(AdminDirectory::new(registry.global(), event_bus.clone()));
    if let Err(e) = admins.load().await {
        warn!("Failed to load admin config: {}", e);
    }

    let access = Arc::new(AccessControlService::new(db.clone(), event_bus.clone()));
    if let Err(e) = access.reload().await {
        warn!("Failed to load access index: {}", e);
    }

    // ── Shutdown coordinator ───────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // Keep the access index and admin directory fresh
    access.start(shutdown_signal.clone());
    admins.start(shutdown_signal.clone());

    // ── Expiry monitor ─────────────────────────────────────────
    let monitor = Arc::new(
        ExpiryMonitor::new(registry.clone(), event_bus.clone()).with_config(ExpiryMonitorConfig {
            check_interval_secs: app_cfg.monitor.check_interval_secs,
            display_window_hours: app_cfg.monitor.display_window_hours,
        }),
    );
    monitor.start(shutdown_signal.clone());

    // ── Push dispatcher ────────────────────────────────────────
    let push_gateway = Arc::new(LogPushGateway::new());
    let dispatcher = Arc::new(PushDispatcher::new(
        db.clone(),
        push_gateway,
        event_bus.clone(),
    ));
    dispatcher.start(shutdown_signal.clone());

    // ── REST API ───────────────────────────────────────────────
    let panel = PanelState {
        slots,
        credentials,
        transactions,
        monitor,
        copy,
        referrals,
    };

    let api_router = create_api_router(
        db.clone(),
        jwt_config,
        panel,
        access,
        admins,
        event_bus,
        &app_cfg,
        prometheus_handle,
    );

    // Start REST API server with graceful shutdown
    let api_addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    let api_server = axum::serve(
        listener,
        api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        api_shutdown.wait().await;
        info!("🛑 REST API server received shutdown signal");
    });

    info!("🚀 Server started. Press Ctrl+C to shutdown gracefully.");

    if let Err(e) = api_server.await {
        error!("REST API server error: {}", e);
    }

    // Perform final cleanup, bounded by the configured shutdown timeout
    info!("🧹 Performing final cleanup...");

    let cleanup = tokio::time::timeout(
        std::time::Duration::from_secs(shutdown.timeout_secs()),
        db.close(),
    )
    .await;
    match cleanup {
        Ok(Ok(())) => info!("✅ Database connection closed"),
        Ok(Err(e)) => warn!("Error closing database connection: {}", e),
        Err(_) => warn!("⚠️ Cleanup timed out after {}s", shutdown.timeout_secs()),
    }

    info!("👋 SubShare Admin Service shutdown complete");
    Ok(())
}

/// Create default admin user if no users exist
async fn create_default_admin(db: &sea_orm::DatabaseConnection, app_cfg: &AppConfig) {
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use subshare_admin::auth::hash_password;
    use subshare_admin::infrastructure::database::entities::user::{self, UserRole};

    let users_count = user::Entity::find().count(db).await.unwrap_or(0);

    if users_count == 0 {
        info!("Creating default admin user...");

        let admin_email = app_cfg.admin.email.clone();
        let admin_username = app_cfg.admin.username.clone();
        let admin_password = app_cfg.admin.password.clone();

        let password_hash = match hash_password(&admin_password) {
            Ok(hash) => hash,
            Err(e) => {
                error!("Failed to hash admin password: {}", e);
                return;
            }
        };

        let admin = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(admin_username),
            email: Set(admin_email.clone()),
            password_hash: Set(password_hash),
            role: Set(UserRole::Admin),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(chrono::Utc::now()),
            last_login_at: Set(None),
        };

        match admin.insert(db).await {
            Ok(_) => {
                info!("Default admin created: {}", admin_email);
                info!("⚠️  Please change the admin password immediately!");
            }
            Err(e) => {
                error!("Failed to create admin user: {}", e);
            }
        }
    }
}
