//! Device store trait definition

use async_trait::async_trait;

use crate::{Device, DeviceStatus, DeviceSubStatus};

use super::error::StoreResult;

/// Read/write access to device records.
///
/// The monitoring loop only ever enumerates the fleet and conditionally
/// rewrites `(status, sub_status)`; everything else on a device row
/// (registration, `last_transaction` ingest) belongs to other services.
///
/// Implementations must be `Send + Sync` - the trait object is shared
/// between the monitor actor and the API layer.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Enumerate the whole fleet.
    async fn list_devices(&self) -> StoreResult<Vec<Device>>;

    /// Fetch a single device; `Ok(None)` if the id is unknown.
    async fn get_device(&self, id: &str) -> StoreResult<Option<Device>>;

    /// Atomically rewrite a device's status pair, returning the updated row.
    ///
    /// Unknown ids fail with [`super::StoreError::NotFound`].
    async fn update_device_status(
        &self,
        id: &str,
        status: DeviceStatus,
        sub_status: Option<DeviceSubStatus>,
    ) -> StoreResult<Device>;
}
