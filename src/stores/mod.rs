//! Store seams for the two external collaborators
//!
//! The device and alert stores are owned by a relational backend outside
//! this process; the core only needs the narrow operations defined by the
//! [`device::DeviceStore`] and [`alert::AlertStore`] traits. The in-memory
//! implementations in [`memory`] back the hub's default deployment and the
//! test suite.
//!
//! Access is atomic per row: no cross-row transaction is required anywhere
//! in this subsystem.

pub mod alert;
pub mod device;
pub mod error;
pub mod memory;

pub use alert::{AlertStore, AlertSummary};
pub use device::DeviceStore;
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryAlertStore, MemoryDeviceStore};
