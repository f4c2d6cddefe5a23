//! Built-in node handlers
//!
//! Implementations of the generic node-execution contract for the
//! non-adapter node types: utility, condition/decision, wait and
//! webhook notification. Protocol adapters are supplied by the
//! embedding application through the adapter registry instead.

mod condition;
mod notify;
mod router;
mod utility;
mod wait;

pub use condition::ConditionHandler;
pub use notify::WebhookNotificationHandler;
pub use router::NodeHandlerRouter;
pub use utility::UtilityHandler;
pub use wait::WaitHandler;
