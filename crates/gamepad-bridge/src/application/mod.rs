//! Application layer: the actors and shared state that make up the bridge.
//!
//! ```text
//! device thread                    scheduler (tokio interval)
//!   poller ──writes──▶ ControlCell ◀──reads── emitter ──▶ publisher
//!                        │
//!              shutdown coordinator (stop flag, join, device release)
//! ```
//!
//! Everything here depends only on the `EventSource` and `CommandPublisher`
//! traits from the infrastructure layer, so the whole pipeline runs in tests
//! against scripted doubles.

pub mod emitter;
pub mod poller;
pub mod shutdown;
pub mod state;
