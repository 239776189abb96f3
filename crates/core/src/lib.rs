//! Functional core for the itemgate request gateway.
//!
//! Everything in this crate is free of I/O: decoding request bodies, compiling
//! partial-update expressions, the wire shapes of inbound events and outbound
//! envelopes, and the storage trait the gateway dispatches against.

pub mod body;
pub mod event;
pub mod expression;
pub mod storage;
