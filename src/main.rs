//! Checkout service entrypoint.
//!
//! Loads configuration, wires the adapters behind their ports, and serves
//! the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use http::{header, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use arthaflow::adapters::auth::{IdentityClient, IdentityClientConfig};
use arthaflow::adapters::cache::{
    InMemoryEntitlementCache, RedisEntitlementCache, TieredEntitlementCache,
};
use arthaflow::adapters::cashfree::{CashfreeConfig, CashfreeGateway};
use arthaflow::adapters::catalog::StaticBundleCatalog;
use arthaflow::adapters::coupon::{
    RestCouponRegistry, RestCouponRegistryConfig, StaticCouponRegistry,
};
use arthaflow::adapters::esign::{EsignClient, EsignClientConfig};
use arthaflow::adapters::http::{checkout_router, CheckoutAppState};
use arthaflow::adapters::storage::{InMemoryFlowStore, RedisFlowStore};
use arthaflow::config::AppConfig;
use arthaflow::domain::plan::Bundle;
use arthaflow::ports::{CouponRegistry, EntitlementCache, FlowStateStore};

/// Seconds the process-local entitlement tier keeps a snapshot before
/// re-reading the shared cache.
const LOCAL_ENTITLEMENT_TTL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.server.log_level)
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = build_state(&config).await?;

    let cors = cors_layer(&config);
    let app = checkout_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(cors),
    );

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, sandbox = config.gateway.is_sandbox(), "Checkout service listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the concrete adapters behind their ports.
async fn build_state(config: &AppConfig) -> Result<CheckoutAppState, Box<dyn std::error::Error>> {
    let flow_ttl = config.checkout.flow_ttl_secs;
    let entitlement_ttl = config.checkout.entitlement_ttl_secs;

    let (flow_store, entitlements): (Arc<dyn FlowStateStore>, Arc<dyn EntitlementCache>) =
        if config.redis.is_configured() {
            let client = redis::Client::open(config.redis.url.as_str())?;
            let conn = client.get_multiplexed_tokio_connection().await?;
            let shared: Arc<dyn EntitlementCache> =
                Arc::new(RedisEntitlementCache::new(conn.clone(), entitlement_ttl));
            (
                Arc::new(RedisFlowStore::new(conn, flow_ttl)),
                Arc::new(TieredEntitlementCache::new(
                    LOCAL_ENTITLEMENT_TTL_SECS,
                    shared,
                )),
            )
        } else {
            tracing::warn!("No Redis configured; flow state and entitlements are process-local");
            (
                Arc::new(InMemoryFlowStore::new(flow_ttl)),
                Arc::new(InMemoryEntitlementCache::new(entitlement_ttl)),
            )
        };

    let gateway = CashfreeGateway::new(
        CashfreeConfig::new(
            config.gateway.client_id.clone(),
            config.gateway.client_secret.clone(),
            config.gateway.webhook_secret.clone(),
        )
        .with_base_url(config.gateway.api_base_url.clone()),
    );

    let esign = EsignClient::new(EsignClientConfig::new(
        config.esign.api_key.clone(),
        config.esign.api_base_url.clone(),
    ));

    let identity = IdentityClient::new(IdentityClientConfig::new(
        config.identity.api_base_url.clone(),
    ));

    let coupons: Arc<dyn CouponRegistry> = match &config.coupon.api_base_url {
        Some(url) => Arc::new(RestCouponRegistry::new(RestCouponRegistryConfig::new(
            url.clone(),
        ))),
        None => {
            tracing::info!("No coupon service configured; coupon codes will not resolve");
            Arc::new(StaticCouponRegistry::new())
        }
    };

    let catalog = load_catalog(config)?;

    Ok(CheckoutAppState {
        flow_store,
        gateway: Arc::new(gateway),
        esign: Arc::new(esign),
        identity: Arc::new(identity),
        coupons,
        catalog: Arc::new(catalog),
        entitlements,
    })
}

/// Load the plan catalog from the configured JSON file.
fn load_catalog(config: &AppConfig) -> Result<StaticBundleCatalog, Box<dyn std::error::Error>> {
    let Some(path) = &config.catalog.bundles_file else {
        tracing::warn!("No bundles file configured; the catalog is empty");
        return Ok(StaticBundleCatalog::new());
    };

    let raw = std::fs::read_to_string(path)?;
    let bundles: Vec<Bundle> = serde_json::from_str(&raw)?;
    tracing::info!(count = bundles.len(), %path, "Loaded plan catalog");

    Ok(bundles
        .into_iter()
        .fold(StaticBundleCatalog::new(), |catalog, bundle| {
            catalog.with_bundle(bundle)
        }))
}

/// Build the CORS layer from configured origins. With no configured
/// origins only same-origin requests are served.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| tracing::warn!(%origin, "Ignoring malformed CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
