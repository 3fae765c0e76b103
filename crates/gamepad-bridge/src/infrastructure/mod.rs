//! Infrastructure layer: everything that touches the OS or the network.
//!
//! - `joystick` — the joydev character device behind the `EventSource`
//!   trait, plus a scriptable mock.
//! - `publisher` — the outbound UDP session behind the `CommandPublisher`
//!   trait, plus a recording mock.
//!
//! The application layer only sees the traits; production implementations
//! are wired in by `main.rs`.

pub mod joystick;
pub mod publisher;
