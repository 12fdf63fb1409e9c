// ============================================================================
// Actors Module
// ============================================================================
//
// One actor per open client context. The mailbox is the context's event
// loop: user commands and store-change notifications are messages,
// processed strictly in arrival order, so nothing inside a context ever
// runs concurrently.
//
// Domain logic (cart, validation, diffing, routing) lives in the domain
// and sync modules; the actor only wires it to the message flow.
//
// ============================================================================

mod client;

pub use client::{
    AddItem, CancelOrder, CancelOutcome, ClientActor, DecrementItem, GetCart, IncrementItem,
    SetItemQuantity, SubmitOrder, VisibleOrders,
};
