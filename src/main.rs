use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use custom_order_processing::config::ProcessingConfig;
use custom_order_processing::cooldown::{
    CooldownGuard, CooldownStore, InMemoryCooldownStore, RedisCooldownStore,
};
use custom_order_processing::domain::order::{
    OrderSnapshot, StatusStateMap, StatusUpdateHandler, TransitionRequest,
};
use custom_order_processing::metrics;
use custom_order_processing::observer::{InMemoryChangelog, InMemoryNotifier, StatusChangeObserver};
use custom_order_processing::store::InMemoryOrderStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,custom_order_processing=debug")),
        )
        .init();

    tracing::info!("Starting order status update service demo");

    let config = Arc::new(ProcessingConfig::from_env());
    tracing::info!(
        enabled = config.enabled,
        cooldown_secs = config.cooldown_lifetime_secs,
        "Loaded configuration"
    );

    // === 1. Cooldown storage: Redis when configured, in-memory otherwise ===
    let cooldown_store: Arc<dyn CooldownStore> = match std::env::var("REDIS_URL") {
        Ok(url) => Arc::new(RedisCooldownStore::connect(&url).await?),
        Err(_) => {
            tracing::info!("REDIS_URL not set, using in-memory cooldown store");
            Arc::new(InMemoryCooldownStore::new())
        }
    };
    let guard = CooldownGuard::new(cooldown_store);

    // === 2. Order store seeded with one demo order ===
    let mut states = StatusStateMap::new();
    states.insert("new", vec!["pending".into()]);
    states.insert(
        "processing",
        vec!["processing".into(), "pending_fulfillment".into()],
    );
    states.insert("complete", vec!["complete".into(), "shipped".into()]);
    states.insert("holded", vec!["holded".into()]);
    states.insert("canceled", vec!["canceled".into()]);

    let store = InMemoryOrderStore::new(states);
    store
        .insert(OrderSnapshot {
            increment_id: 5,
            store_id: 1,
            status: "pending".into(),
            state: "new".into(),
            total_due: 0.0,
            has_shipments: false,
            is_holdable: true,
        })
        .await;

    // === 3. Post-commit observer with in-memory sinks ===
    let changelog = Arc::new(InMemoryChangelog::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let observer = Arc::new(StatusChangeObserver::new(
        changelog.clone(),
        notifier.clone(),
    ));

    // === 4. Metrics + scrape endpoint in a background thread ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    let metrics_registry = Arc::new(metrics.registry().clone());
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, 9090).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    let handler = StatusUpdateHandler::new(
        config,
        Arc::new(store.clone()),
        guard,
        observer,
        metrics,
    );

    // === 5. Walk the order through its lifecycle ===
    let response = handler
        .update_order_status(TransitionRequest::new("000000005", "processing"), "10.0.0.1")
        .await;
    tracing::info!(status = response[0].status, message = %response[0].message, "pending -> processing");

    let response = handler
        .update_order_status(TransitionRequest::new("000000005", "holded"), "10.0.0.1")
        .await;
    tracing::info!(status = response[0].status, message = %response[0].message, "second attempt inside cooldown window");

    let response = handler
        .update_order_status(TransitionRequest::new("000000005", "processing"), "10.0.0.2")
        .await;
    tracing::info!(status = response[0].status, message = %response[0].message, "no-op transition from another client");

    store.set_has_shipments(5, true).await;
    let response = handler
        .update_order_status(TransitionRequest::new("000000005", "shipped"), "10.0.0.3")
        .await;
    tracing::info!(status = response[0].status, message = %response[0].message, "processing -> shipped");

    // Give the fire-and-forget observer tasks a moment to drain
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    tracing::info!(
        changelog_entries = changelog.records().await.len(),
        notifications = notifier.notifications().await.len(),
        "Demo complete"
    );

    Ok(())
}
