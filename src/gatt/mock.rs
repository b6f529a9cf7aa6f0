//! In-memory GATT device used by the unit tests.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use super::{Central, Characteristic, Peripheral, Service};
use crate::profile::AddressType;

/// Everything the fake device observed.
#[derive(Debug, Default)]
pub struct Events {
    pub connects: Vec<(String, AddressType)>,
    pub reads: Vec<Uuid>,
    pub writes: Vec<(Uuid, Vec<u8>)>,
    pub disconnects: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Events>>);

impl Recorder {
    pub fn events(&self) -> MutexGuard<'_, Events> {
        self.0.lock().unwrap()
    }
}

#[derive(Debug, Clone)]
pub struct MockCharacteristic {
    uuid: Uuid,
    readable: bool,
    writable: bool,
    value: Vec<u8>,
    fail_write: bool,
    recorder: Recorder,
}

impl MockCharacteristic {
    pub fn readable(uuid: Uuid, value: impl Into<Vec<u8>>) -> Self {
        MockCharacteristic {
            uuid,
            readable: true,
            writable: false,
            value: value.into(),
            fail_write: false,
            recorder: Recorder::default(),
        }
    }

    pub fn unreadable(uuid: Uuid) -> Self {
        MockCharacteristic {
            readable: false,
            ..Self::readable(uuid, Vec::new())
        }
    }

    pub fn writable(uuid: Uuid) -> Self {
        MockCharacteristic {
            writable: true,
            ..Self::unreadable(uuid)
        }
    }

    pub fn failing_write(uuid: Uuid) -> Self {
        MockCharacteristic {
            fail_write: true,
            ..Self::writable(uuid)
        }
    }
}

#[async_trait]
impl Characteristic for MockCharacteristic {
    async fn uuid(&self) -> Result<Uuid> {
        Ok(self.uuid)
    }

    async fn supports_read(&self) -> Result<bool> {
        Ok(self.readable)
    }

    async fn supports_write(&self) -> Result<bool> {
        Ok(self.writable)
    }

    async fn read(&self) -> Result<Vec<u8>> {
        if !self.readable {
            bail!("characteristic {} is not readable", self.uuid);
        }
        self.recorder.events().reads.push(self.uuid);
        Ok(self.value.clone())
    }

    async fn write(&self, value: &[u8]) -> Result<()> {
        if self.fail_write {
            bail!("write to {} rejected", self.uuid);
        }
        self.recorder
            .events()
            .writes
            .push((self.uuid, value.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MockService {
    uuid: Uuid,
    characteristics: Vec<MockCharacteristic>,
}

impl MockService {
    pub fn new(uuid: Uuid, characteristics: Vec<MockCharacteristic>) -> Self {
        MockService {
            uuid,
            characteristics,
        }
    }
}

#[async_trait]
impl Service for MockService {
    type Characteristic = MockCharacteristic;

    async fn uuid(&self) -> Result<Uuid> {
        Ok(self.uuid)
    }

    async fn characteristics(&self) -> Result<Vec<MockCharacteristic>> {
        Ok(self.characteristics.clone())
    }
}

#[derive(Debug)]
pub struct MockPeripheral {
    address: String,
    services: Vec<MockService>,
    fail_discover: bool,
    fail_disconnect: bool,
    recorder: Recorder,
}

#[async_trait]
impl Peripheral for MockPeripheral {
    type Service = MockService;

    fn address(&self) -> String {
        self.address.clone()
    }

    async fn discover(&self) -> Result<()> {
        if self.fail_discover {
            bail!("service discovery on {} failed", self.address);
        }
        Ok(())
    }

    async fn services(&self) -> Result<Vec<MockService>> {
        Ok(self.services.clone())
    }

    /// Counts the attempt even when it fails.
    async fn disconnect(self) -> Result<()> {
        self.recorder.events().disconnects += 1;
        if self.fail_disconnect {
            bail!("link to {} already lost", self.address);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockCentral {
    services: Vec<MockService>,
    reachable: bool,
    fail_discover: bool,
    fail_disconnect: bool,
    recorder: Recorder,
}

impl MockCentral {
    /// A reachable device exposing `services`.
    ///
    /// Every characteristic is rewired to report into the central's recorder.
    pub fn new(mut services: Vec<MockService>) -> Self {
        let recorder = Recorder::default();
        for chari in services
            .iter_mut()
            .flat_map(|s| s.characteristics.iter_mut())
        {
            chari.recorder = recorder.clone();
        }
        MockCentral {
            services,
            reachable: true,
            fail_discover: false,
            fail_disconnect: false,
            recorder,
        }
    }

    pub fn failing_discover(self) -> Self {
        MockCentral {
            fail_discover: true,
            ..self
        }
    }

    pub fn failing_disconnect(self) -> Self {
        MockCentral {
            fail_disconnect: true,
            ..self
        }
    }

    pub fn unreachable() -> Self {
        MockCentral {
            reachable: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}

#[async_trait]
impl Central for MockCentral {
    type Peripheral = MockPeripheral;

    async fn connect(&self, address: &str, address_type: AddressType) -> Result<MockPeripheral> {
        if !self.reachable {
            bail!("device {address} unreachable");
        }
        self.recorder
            .events()
            .connects
            .push((address.to_string(), address_type));
        Ok(MockPeripheral {
            address: address.to_string(),
            services: self.services.clone(),
            fail_discover: self.fail_discover,
            fail_disconnect: self.fail_disconnect,
            recorder: self.recorder.clone(),
        })
    }
}
