//! Application layer: orchestration over the domain through the ports.

pub mod dispatcher;
pub mod handlers;
pub mod locks;
pub mod outbound;

pub use dispatcher::DeliveryDispatcher;
pub use locks::BorrowerLocks;
pub use outbound::Outbound;
