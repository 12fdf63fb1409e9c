use actix::prelude::*;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod domain;
mod identity;
mod notify;
mod store;
mod sync;

use actors::{
    AddItem, CancelOrder, ClientActor, DecrementItem, GetCart, IncrementItem, SetItemQuantity,
    SubmitOrder, VisibleOrders,
};
use domain::order::{OrderDraft, OrderStatus};
use notify::{AutoConfirm, LogNotifier};
use store::{decode_snapshot, encode_snapshot, SharedStore, SubscriberId, ORDERS_KEY};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orderdesk=debug")),
        )
        .init();

    tracing::info!("🍜 Starting orderdesk ordering client demo");

    let store = SharedStore::new();

    // Two open views of the same installation: the first to boot claims
    // the client identity, the second loads it.
    let tab1 =
        ClientActor::boot(store.clone(), Arc::new(LogNotifier), Arc::new(AutoConfirm)).start();
    let tab2 =
        ClientActor::boot(store.clone(), Arc::new(LogNotifier), Arc::new(AutoConfirm)).start();

    // === 1. Build a cart in tab 1 ===
    tab1.send(AddItem {
        name: "Pho".to_string(),
        price: 5.0,
    })
    .await?;
    tab1.send(IncrementItem {
        name: "Pho".to_string(),
    })
    .await?;
    tab1.send(AddItem {
        name: "Spring Rolls".to_string(),
        price: 4.0,
    })
    .await?;
    tab1.send(SetItemQuantity {
        name: "Spring Rolls".to_string(),
        raw: "3".to_string(),
    })
    .await?;
    tab1.send(DecrementItem {
        name: "Spring Rolls".to_string(),
    })
    .await?;

    let cart = tab1.send(GetCart).await?;
    tracing::info!(lines = cart.lines.len(), total = cart.total, "🛒 cart ready");

    // === 2. Submit a dine-in order ===
    let mut draft = OrderDraft::dine_in("An");
    draft.party_size = Some(2);
    draft.date = NaiveDate::from_ymd_opt(2026, 8, 7);
    draft.time = NaiveTime::from_hms_opt(19, 30, 0);
    draft.table = Some("T1".to_string());

    let dine_in = tab1.send(SubmitOrder { draft }).await??;
    tracing::info!(order_id = %dine_in.id, total = dine_in.total, "✅ dine-in order placed");

    // Order ids are derived from the clock; keep submissions apart.
    sleep(Duration::from_millis(50)).await;

    // === 3. Submit a delivery order ===
    tab1.send(AddItem {
        name: "Banh Mi".to_string(),
        price: 3.5,
    })
    .await?;

    let mut draft = OrderDraft::delivery("An");
    draft.address = Some("12 Hang Bac".to_string());
    draft.phone = Some("0901234567".to_string());

    let delivery = tab1.send(SubmitOrder { draft }).await??;
    tracing::info!(order_id = %delivery.id, total = delivery.total, "✅ delivery order placed");

    sleep(Duration::from_millis(50)).await;

    // === 4. Admin-side transitions (simulated counter tab) ===
    // Processing is suppressed by the sync engines; completion is surfaced
    // in both customer tabs.
    let admin = store.register();
    admin_set_status(&store, admin, &dine_in.id, OrderStatus::Processing)?;
    sleep(Duration::from_millis(50)).await;
    admin_set_status(&store, admin, &dine_in.id, OrderStatus::Completed)?;
    sleep(Duration::from_millis(50)).await;

    // === 5. Customer cancels the delivery order from tab 1 ===
    // Tab 2 shares the identity, so the targeted signal lands there too.
    tab1.send(CancelOrder {
        order_id: delivery.id.clone(),
    })
    .await??;
    sleep(Duration::from_millis(50)).await;

    let visible = tab2.send(VisibleOrders).await?;
    tracing::info!(visible = visible.len(), "remaining visible orders in tab 2");

    tracing::info!("🎉 Demo complete");
    Ok(())
}

/// The counter's view is not part of this client; the demo stands in for
/// it with direct snapshot rewrites under a separate writer identity.
fn admin_set_status(
    store: &SharedStore,
    admin: SubscriberId,
    order_id: &str,
    status: OrderStatus,
) -> anyhow::Result<()> {
    let raw = store.get(ORDERS_KEY).unwrap_or_else(|| "[]".to_string());
    let mut snapshot = decode_snapshot(&raw)?;
    for order in &mut snapshot {
        if order.id == order_id {
            order.status = status;
        }
    }
    store.set(ORDERS_KEY, &encode_snapshot(&snapshot)?, admin);
    tracing::info!(order_id = %order_id, status = %status, "🛠️  admin updated order status");
    Ok(())
}
