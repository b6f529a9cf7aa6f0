use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bluer::{
    gatt::remote::{Characteristic, Service},
    Adapter, Address, Device, Session,
};
use log::{debug, info, warn};
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use crate::{
    bluetooth::{le_address_type, SERVICES_POLL_INTERVAL},
    gatt,
    profile::AddressType,
};

/// A BlueZ adapter acting as GATT client.
pub struct BluezCentral {
    session: Session,
    adapter: Adapter,
    resolve_timeout: Duration,
}

impl BluezCentral {
    pub async fn new(adapter_name: Option<&str>, resolve_timeout: Duration) -> Result<Self> {
        let session = Session::new()
            .await
            .context("failed to open bluetooth session")?;
        let adapter = match adapter_name {
            Some(name) => session.adapter(name)?,
            None => session.default_adapter().await?,
        };

        adapter.set_powered(true).await?;

        info!(
            "using bluetooth adapter {} with address {}",
            adapter.name(),
            adapter.address().await?
        );

        Ok(BluezCentral {
            session,
            adapter,
            resolve_timeout,
        })
    }
}

#[async_trait]
impl gatt::Central for BluezCentral {
    type Peripheral = BluezPeripheral;

    async fn connect(&self, address: &str, address_type: AddressType) -> Result<BluezPeripheral> {
        let addr: Address = address
            .parse()
            .with_context(|| format!("invalid bluetooth address `{address}`"))?;

        let device = if self.adapter.device_addresses().await?.contains(&addr) {
            debug!("{addr} is known to bluez, address type {address_type} is not used");
            let device = self.adapter.device(addr)?;
            if device.is_connected().await? {
                info!("already connected to bluetooth device, it is disconnected when the session ends");
            } else {
                info!("trying to connect to known device {addr}");
                device.connect().await?;
            }
            device
        } else {
            info!("trying to connect to device {addr}");
            self.adapter
                .connect_device(addr, le_address_type(address_type))
                .await?
        };
        info!("connected to bluetooth device!");

        // Waiting for services happens in `discover` so a failure there
        // still goes through the session's disconnect.
        Ok(BluezPeripheral {
            _session: self.session.clone(),
            device,
            resolve_timeout: self.resolve_timeout,
        })
    }
}

pub struct BluezPeripheral {
    _session: Session,
    device: Device,
    resolve_timeout: Duration,
}

#[async_trait]
impl gatt::Peripheral for BluezPeripheral {
    type Service = BluezService;

    fn address(&self) -> String {
        self.device.address().to_string()
    }

    async fn discover(&self) -> Result<()> {
        let resolved = async {
            while !self.device.is_services_resolved().await? {
                sleep(SERVICES_POLL_INTERVAL).await;
            }
            Ok::<_, bluer::Error>(())
        };
        match timeout(self.resolve_timeout, resolved).await {
            Ok(res) => Ok(res.context("failed to query service resolution")?),
            Err(_) => {
                warn!(
                    "services of {} not resolved after {:?}",
                    self.device.address(),
                    self.resolve_timeout
                );
                Ok(())
            }
        }
    }

    async fn services(&self) -> Result<Vec<BluezService>> {
        let services = self.device.services().await?;
        debug!("device exposes {} services", services.len());
        Ok(services.into_iter().map(BluezService).collect())
    }

    async fn disconnect(self) -> Result<()> {
        info!("disconnecting from {}", self.device.address());
        self.device.disconnect().await?;
        Ok(())
    }
}

pub struct BluezService(Service);

#[async_trait]
impl gatt::Service for BluezService {
    type Characteristic = BluezCharacteristic;

    async fn uuid(&self) -> Result<Uuid> {
        let uuid = self.0.uuid().await?;
        debug!("\tservice uuid: {}", &uuid);
        Ok(uuid)
    }

    async fn characteristics(&self) -> Result<Vec<BluezCharacteristic>> {
        Ok(self
            .0
            .characteristics()
            .await?
            .into_iter()
            .map(BluezCharacteristic)
            .collect())
    }
}

pub struct BluezCharacteristic(Characteristic);

#[async_trait]
impl gatt::Characteristic for BluezCharacteristic {
    async fn uuid(&self) -> Result<Uuid> {
        let uuid = self.0.uuid().await?;
        debug!("\tcharacteristics uuid: {}", &uuid);
        Ok(uuid)
    }

    async fn supports_read(&self) -> Result<bool> {
        Ok(self.0.flags().await?.read)
    }

    async fn supports_write(&self) -> Result<bool> {
        let flags = self.0.flags().await?;
        Ok(flags.write || flags.write_without_response)
    }

    async fn read(&self) -> Result<Vec<u8>> {
        Ok(self.0.read().await?)
    }

    async fn write(&self, value: &[u8]) -> Result<()> {
        self.0.write(value).await?;
        Ok(())
    }
}
