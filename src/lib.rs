pub mod bluetooth;
pub mod console;
pub mod gatt;
pub mod profile;
pub mod session;

pub use profile::{AddressType, DeviceProfile, Sensor};
