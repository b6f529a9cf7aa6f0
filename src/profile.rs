use std::{fmt, str::FromStr, time::Duration};

use thiserror::Error;
use uuid::Uuid;

pub const DEVICE_ADDRESS: &str = "f4:12:fa:9f:f5:72";

pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x0000a000_0000_1000_8000_00805f9b34fb);
pub const TEMPERATURE_UUID: Uuid = Uuid::from_u128(0x0000a005_0000_1000_8000_00805f9b34fb);
pub const HUMIDITY_UUID: Uuid = Uuid::from_u128(0x0000a003_0000_1000_8000_00805f9b34fb);
pub const LUMINOSITY_UUID: Uuid = Uuid::from_u128(0x0000a004_0000_1000_8000_00805f9b34fb);
pub const WRITE_UUID: Uuid = Uuid::from_u128(0x0000a006_0000_1000_8000_00805f9b34fb);

pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressType {
    #[default]
    Public,
    Random,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid address type `{0}`, expected `public` or `random`")]
pub struct InvalidAddressType(String);

impl FromStr for AddressType {
    type Err = InvalidAddressType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(AddressType::Public),
            "random" => Ok(AddressType::Random),
            _ => Err(InvalidAddressType(s.to_string())),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::Public => write!(f, "public"),
            AddressType::Random => write!(f, "random"),
        }
    }
}

/// The sensors exposed by the board, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Temperature,
    Humidity,
    Luminosity,
}

impl Sensor {
    pub const ALL: [Sensor; 3] = [Sensor::Temperature, Sensor::Humidity, Sensor::Luminosity];

    pub fn name(self) -> &'static str {
        match self {
            Sensor::Temperature => "temperature",
            Sensor::Humidity => "humidity",
            Sensor::Luminosity => "luminosity",
        }
    }

    /// Formats a decoded reading as the line shown to the user.
    pub fn format(self, value: &str) -> String {
        match self {
            Sensor::Temperature => format!("Temperature: {value}°C"),
            Sensor::Humidity => format!("Humidity: {value}%"),
            Sensor::Luminosity => format!("Luminosity: {value} lux"),
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to find and talk to the sensor board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub address: String,
    pub address_type: AddressType,
    pub service: Uuid,
    pub temperature: Uuid,
    pub humidity: Uuid,
    pub luminosity: Uuid,
    pub write: Uuid,
}

impl DeviceProfile {
    pub fn sensor_uuid(&self, sensor: Sensor) -> Uuid {
        match sensor {
            Sensor::Temperature => self.temperature,
            Sensor::Humidity => self.humidity,
            Sensor::Luminosity => self.luminosity,
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile {
            address: DEVICE_ADDRESS.to_string(),
            address_type: AddressType::Public,
            service: SERVICE_UUID,
            temperature: TEMPERATURE_UUID,
            humidity: HUMIDITY_UUID,
            luminosity: LUMINOSITY_UUID,
            write: WRITE_UUID,
        }
    }
}
