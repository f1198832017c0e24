use std::sync::Arc;

use coterie_core::ModerationStore;
use coterie_core::config::CoterieConfig;
use coterie_server::{AppState, EmailSender, Notifier, build_router};
use coterie_storage_sqlite::{
    SqliteAccountStore, SqliteBrandStore, SqliteModerationStore, SqliteProfileStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/coterie.toml".to_string());
    let config = CoterieConfig::load(&config_path)?;

    // Ensure the data directory exists
    std::fs::create_dir_all("data")?;

    // The account store runs the migrations; the others attach to the
    // same database afterwards.
    let account_store = SqliteAccountStore::connect(&config.database.url).await?;
    let profile_store = SqliteProfileStore::from_pool(account_store.pool().clone());
    let brand_store = SqliteBrandStore::from_pool(account_store.pool().clone());
    let moderation_store = SqliteModerationStore::from_pool(account_store.pool().clone());

    let addr = format!("0.0.0.0:{}", config.port);

    // Extract TLS config before moving config into Arc
    let tls_config = config.tls.clone();
    let public_url = config.public_url.clone();

    let notifier: Option<Arc<dyn Notifier>> = match config.smtp.as_ref() {
        Some(smtp_config) => Some(Arc::new(EmailSender::new(
            smtp_config,
            &config.site_name,
            &config.public_url,
        )?)),
        None => {
            tracing::warn!("no [smtp] section in config; outbound email is disabled");
            None
        }
    };

    let state = AppState {
        account_store: Arc::new(account_store),
        profile_store: Arc::new(profile_store),
        brand_store: Arc::new(brand_store),
        moderation_store: Arc::new(moderation_store) as Arc<dyn ModerationStore>,
        config: Arc::new(config),
        notifier,
    };

    let router = build_router(state);

    if let Some(tls_config) = tls_config {
        use futures::StreamExt;
        use rustls_acme::{AcmeConfig, caches::DirCache};

        std::fs::create_dir_all(&tls_config.cert_cache)?;

        let mut acme_state = AcmeConfig::new(tls_config.domains)
            .contact([format!("mailto:{}", tls_config.contact_email)])
            .cache(DirCache::new(tls_config.cert_cache))
            .directory_lets_encrypt(tls_config.production)
            .state();
        let acceptor = acme_state.axum_acceptor(acme_state.default_rustls_config());
        tokio::spawn(async move {
            loop {
                acme_state.next().await;
            }
        });

        // HTTP -> HTTPS redirect on port 80
        tokio::spawn(http_redirect_server(public_url));

        tracing::info!("coterie starting HTTPS on {}", addr);
        let sock_addr: std::net::SocketAddr = addr.parse()?;
        axum_server::bind(sock_addr)
            .acceptor(acceptor)
            .serve(router.into_make_service())
            .await?;
    } else {
        tracing::info!("coterie starting on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;
    }

    Ok(())
}

async fn http_redirect_server(public_url: String) {
    let app = axum::Router::new().fallback(move |req: axum::extract::Request| {
        let base = public_url.clone();
        async move {
            let target = format!("{}{}", base, req.uri());
            axum::response::Redirect::permanent(&target)
        }
    });
    let Ok(listener) = tokio::net::TcpListener::bind("0.0.0.0:80").await else {
        tracing::warn!("Could not bind port 80 for HTTP redirect");
        return;
    };
    tracing::info!("HTTP redirect listening on 0.0.0.0:80");
    let _ = axum::serve(listener, app).await;
}
