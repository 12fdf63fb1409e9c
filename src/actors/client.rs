use actix::prelude::*;
use std::sync::Arc;

use crate::domain::cart::{CartStore, CartView};
use crate::domain::order::{Order, OrderDraft, OrderError, OrderRepository};
use crate::identity::{self, ClientId};
use crate::notify::{CancelPrompt, Notification, Notifier};
use crate::store::{
    decode_snapshot, SharedStore, StoreChanged, SubscriberId, LAST_UPDATE_KEY, ORDERS_KEY,
};
use crate::sync::SyncEngine;

// ============================================================================
// Actor Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct AddItem {
    pub name: String,
    pub price: f64,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct IncrementItem {
    pub name: String,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct DecrementItem {
    pub name: String,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct SetItemQuantity {
    pub name: String,
    pub raw: String,
}

#[derive(Message)]
#[rtype(result = "CartView")]
pub struct GetCart;

#[derive(Message)]
#[rtype(result = "Result<Order, OrderError>")]
pub struct SubmitOrder {
    pub draft: OrderDraft,
}

#[derive(Message)]
#[rtype(result = "Result<CancelOutcome, OrderError>")]
pub struct CancelOrder {
    pub order_id: String,
}

#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(Order),
    Declined,
}

#[derive(Message)]
#[rtype(result = "Vec<Order>")]
pub struct VisibleOrders;

// ============================================================================
// Client Context Actor
// ============================================================================
//
// Owns one context's identity, cart, repository and sync engine. Booting
// registers with the store and claims (or loads) the client identity;
// starting attaches the mailbox to the store's change feed.
//
// ============================================================================

pub struct ClientActor {
    store: SharedStore,
    writer: SubscriberId,
    client_id: ClientId,
    cart: CartStore,
    repo: OrderRepository,
    sync: SyncEngine,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn CancelPrompt>,
}

impl ClientActor {
    pub fn boot(
        store: SharedStore,
        notifier: Arc<dyn Notifier>,
        prompt: Arc<dyn CancelPrompt>,
    ) -> Self {
        let writer = store.register();
        let client_id = identity::get_or_create_client_id(&store, writer);
        let repo = OrderRepository::load(store.clone(), writer, client_id.clone());
        let sync = SyncEngine::new(client_id.clone());

        Self {
            store,
            writer,
            client_id,
            cart: CartStore::new(),
            repo,
            sync,
            notifier,
            prompt,
        }
    }
}

impl Actor for ClientActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.store.attach(self.writer, ctx.address().recipient());
        tracing::info!(client_id = %self.client_id, "client context started");
    }
}

// ============================================================================
// Cart Message Handlers
// ============================================================================

impl Handler<AddItem> for ClientActor {
    type Result = ();

    fn handle(&mut self, msg: AddItem, _: &mut Context<Self>) {
        self.cart.add_item(&msg.name, msg.price);
    }
}

impl Handler<IncrementItem> for ClientActor {
    type Result = ();

    fn handle(&mut self, msg: IncrementItem, _: &mut Context<Self>) {
        self.cart.increment(&msg.name);
    }
}

impl Handler<DecrementItem> for ClientActor {
    type Result = ();

    fn handle(&mut self, msg: DecrementItem, _: &mut Context<Self>) {
        self.cart.decrement(&msg.name);
    }
}

impl Handler<SetItemQuantity> for ClientActor {
    type Result = ();

    fn handle(&mut self, msg: SetItemQuantity, _: &mut Context<Self>) {
        self.cart.set_quantity(&msg.name, &msg.raw);
    }
}

impl Handler<GetCart> for ClientActor {
    type Result = MessageResult<GetCart>;

    fn handle(&mut self, _: GetCart, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.cart.view())
    }
}

// ============================================================================
// Order Message Handlers
// ============================================================================

impl Handler<SubmitOrder> for ClientActor {
    type Result = Result<Order, OrderError>;

    fn handle(&mut self, msg: SubmitOrder, _: &mut Context<Self>) -> Self::Result {
        let order = self.repo.submit(self.cart.snapshot(), msg.draft)?;

        // The cart is cleared only once the order is persisted.
        self.cart.clear();
        self.notifier.notify(&Notification::Placed {
            order_id: order.id.clone(),
        });
        Ok(order)
    }
}

impl Handler<CancelOrder> for ClientActor {
    type Result = Result<CancelOutcome, OrderError>;

    fn handle(&mut self, msg: CancelOrder, _: &mut Context<Self>) -> Self::Result {
        if !self.prompt.confirm_cancel(&msg.order_id) {
            tracing::info!(order_id = %msg.order_id, "cancellation declined by user");
            return Ok(CancelOutcome::Declined);
        }

        let order = self.repo.cancel(&msg.order_id)?;
        self.notifier.notify(&Notification::CancelAcknowledged {
            order_id: order.id.clone(),
        });
        Ok(CancelOutcome::Cancelled(order))
    }
}

impl Handler<VisibleOrders> for ClientActor {
    type Result = MessageResult<VisibleOrders>;

    fn handle(&mut self, _: VisibleOrders, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.repo.visible_orders())
    }
}

// ============================================================================
// Store Change Handler
// ============================================================================

impl Handler<StoreChanged> for ClientActor {
    type Result = ();

    fn handle(&mut self, msg: StoreChanged, _: &mut Context<Self>) {
        tracing::trace!(
            key = %msg.key,
            replacing = msg.old_value.is_some(),
            "observed store change"
        );

        match msg.key.as_str() {
            ORDERS_KEY => {
                let raw = msg.new_value.as_deref().unwrap_or("[]");
                match decode_snapshot(raw) {
                    Ok(observed) => {
                        let notifications = self.sync.diff(self.repo.orders(), &observed);
                        // The observed snapshot is authoritative whether
                        // or not anything was worth surfacing.
                        self.repo.replace(observed);
                        for notification in &notifications {
                            self.notifier.notify(notification);
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "ignoring malformed observed snapshot");
                    }
                }
            }
            LAST_UPDATE_KEY => {
                if let Some(raw) = msg.new_value.as_deref() {
                    if let Some(notification) = self.sync.decode_change_event(raw) {
                        self.notifier.notify(&notification);
                    }
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
