mod client;
pub use client::{BluezCentral, BluezCharacteristic, BluezPeripheral, BluezService};

use crate::profile::AddressType;

const SERVICES_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

fn le_address_type(address_type: AddressType) -> bluer::AddressType {
    match address_type {
        AddressType::Public => bluer::AddressType::LePublic,
        AddressType::Random => bluer::AddressType::LeRandom,
    }
}
