//! Actor-based monitoring core
//!
//! Each actor runs as an independent async task, owns its state, and is
//! driven by commands over an mpsc channel; results flow back over oneshot
//! channels and state changes are published to the shared push broadcast.
//!
//! ## Architecture Overview
//!
//! ```text
//!                 ┌─────────────────┐
//!                 │   Hub (main)    │
//!                 └────────┬────────┘
//!                          │ spawns
//!            ┌─────────────┼─────────────┐
//!            │             │             │
//!    ┌───────▼───────┐     │     ┌───────▼───────┐
//!    │ MonitorActor  │     │     │ WeatherActor  │
//!    │ (status loop) │     │     │ (slow cadence)│
//!    └───────┬───────┘     │     └───────┬───────┘
//!            │             │             │
//!            └──────┬──────┴──────┬──────┘
//!                   │             │
//!         ┌─────────▼─────────────▼──────┐
//!         │  Push Broadcast Channel      │
//!         └─────────────┬────────────────┘
//!                       │ subscribe (one receiver per connection)
//!              ┌────────▼─────────┐
//!              │ WebSocket stream │
//!              └──────────────────┘
//! ```
//!
//! ## Invariants
//!
//! 1. The monitor's ticks and operator commands are serialized through one
//!    `select!` loop - two passes never overlap, and a manual override never
//!    interleaves with a tick's read-modify-write for the same device.
//! 2. Per-device store failures are tolerated within a pass; enumeration
//!    failure skips the pass. Neither kills the actor.

pub mod messages;
pub mod monitor;
pub mod weather;
