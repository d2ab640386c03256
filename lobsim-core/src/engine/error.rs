//! Error taxonomy for the matching engine.
//!
//! Most malformed input is absorbed silently (out-of-range prices are
//! clamped, unknown cancel targets are a legal no-op) per the simulator's
//! tolerance for strategy bugs; only arena exhaustion is fatal.

use crate::arena::ArenaError;

/// Fatal engine error. Anything recoverable is instead reported to the
/// submitting agent as an execution report, never via this type.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("order arena exhausted while processing an incoming order")]
    ArenaExhausted(#[from] ArenaError),
    #[error("ingress ring is full; order for client {client_ref} dropped")]
    IngressFull { client_ref: u64 },
}
