//! Capability interface over a GATT client.
//!
//! The session logic only talks to these traits, the BlueZ backend in
//! [`crate::bluetooth`] implements them for real hardware.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::profile::AddressType;

#[cfg(test)]
pub mod mock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("service {0} not found on device")]
    ServiceNotFound(Uuid),
    #[error("characteristic {0} not found in service")]
    CharacteristicNotFound(Uuid),
}

/// The local side which opens connections.
#[async_trait]
pub trait Central: Sync {
    type Peripheral: Peripheral;

    async fn connect(&self, address: &str, address_type: AddressType)
        -> Result<Self::Peripheral>;
}

/// A connected remote device.
///
/// Dropping a peripheral does not release the link, [`Peripheral::disconnect`]
/// has to be called and consumes the handle.
#[async_trait]
pub trait Peripheral: Send + Sync {
    type Service: Service;

    fn address(&self) -> String;

    /// Waits until the GATT table of the device is known.
    async fn discover(&self) -> Result<()>;

    async fn services(&self) -> Result<Vec<Self::Service>>;

    async fn disconnect(self) -> Result<()>;
}

#[async_trait]
pub trait Service: Send + Sync {
    type Characteristic: Characteristic;

    async fn uuid(&self) -> Result<Uuid>;

    async fn characteristics(&self) -> Result<Vec<Self::Characteristic>>;
}

#[async_trait]
pub trait Characteristic: Send + Sync {
    async fn uuid(&self) -> Result<Uuid>;

    async fn supports_read(&self) -> Result<bool>;

    async fn supports_write(&self) -> Result<bool>;

    async fn read(&self) -> Result<Vec<u8>>;

    async fn write(&self, value: &[u8]) -> Result<()>;
}

pub type CharacteristicOf<P> = <<P as Peripheral>::Service as Service>::Characteristic;

/// Returns the first service of the peripheral with the given uuid.
pub async fn resolve_service<P: Peripheral>(peripheral: &P, uuid: Uuid) -> Result<P::Service> {
    for service in peripheral.services().await? {
        if service.uuid().await? == uuid {
            return Ok(service);
        }
    }
    Err(ResolveError::ServiceNotFound(uuid).into())
}

/// Returns the first characteristic of the service with the given uuid.
pub async fn resolve_characteristic<S: Service>(
    service: &S,
    uuid: Uuid,
) -> Result<S::Characteristic> {
    for chari in service.characteristics().await? {
        if chari.uuid().await? == uuid {
            return Ok(chari);
        }
    }
    Err(ResolveError::CharacteristicNotFound(uuid).into())
}
