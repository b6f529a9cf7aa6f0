//! The session with the sensor board: connect, read the sensors, forward
//! console input to the device and always disconnect afterwards.

use anyhow::{bail, Context, Result};
use log::{debug, error, info};

use crate::{
    console::Console,
    gatt::{
        resolve_characteristic, resolve_service, Central, Characteristic, CharacteristicOf,
        Peripheral, Service,
    },
    profile::{DeviceProfile, Sensor},
};

pub const PROMPT: &str = "Enter message to send to ESP32 (type 'exit' to quit): ";
pub const EXIT_SENTINEL: &str = "exit";
pub const WRITTEN: &str = "Data written to the device.";
pub const FAREWELL: &str = "Exiting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Exit,
    Message(&'a str),
}

impl<'a> Input<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.trim().eq_ignore_ascii_case(EXIT_SENTINEL) {
            Input::Exit
        } else {
            Input::Message(line)
        }
    }
}

/// The characteristics a session works with.
pub struct Links<C> {
    pub sensors: Vec<(Sensor, C)>,
    pub write: C,
}

pub async fn resolve_links<P: Peripheral>(
    peripheral: &P,
    profile: &DeviceProfile,
) -> Result<Links<CharacteristicOf<P>>> {
    let service = resolve_service(peripheral, profile.service)
        .await
        .context("failed to resolve sensor service")?;

    let mut sensors = Vec::with_capacity(Sensor::ALL.len());
    for sensor in Sensor::ALL {
        let chari = resolve_characteristic(&service, profile.sensor_uuid(sensor))
            .await
            .with_context(|| format!("failed to resolve {sensor} characteristic"))?;
        sensors.push((sensor, chari));
    }

    let write = resolve_characteristic(&service, profile.write)
        .await
        .context("failed to resolve write characteristic")?;

    Ok(Links { sensors, write })
}

/// Reads one sensor, `None` if the characteristic does not allow reading.
pub async fn read_sensor<C: Characteristic>(chari: &C, sensor: Sensor) -> Result<Option<String>> {
    if !chari.supports_read().await? {
        debug!("{sensor} characteristic does not support read, skipping");
        return Ok(None);
    }
    let value = chari
        .read()
        .await
        .with_context(|| format!("failed to read {sensor}"))?;
    let value =
        String::from_utf8(value).with_context(|| format!("{sensor} value is not valid utf-8"))?;
    Ok(Some(value))
}

pub async fn read_sensors<C, K>(links: &Links<C>, console: &mut K) -> Result<()>
where
    C: Characteristic,
    K: Console,
{
    for (sensor, chari) in links.sensors.iter() {
        if let Some(value) = read_sensor(chari, *sensor).await? {
            console.emit(&sensor.format(&value)).await?;
        }
    }
    Ok(())
}

/// Forwards console lines to `write` until the exit sentinel.
///
/// Closed console input is an error.
pub async fn interact<C, K>(write: &C, console: &mut K) -> Result<()>
where
    C: Characteristic,
    K: Console,
{
    loop {
        let line = match console.prompt(PROMPT).await? {
            Some(x) => x,
            None => bail!("console input closed"),
        };
        match Input::classify(&line) {
            Input::Exit => {
                console.emit(FAREWELL).await?;
                return Ok(());
            }
            Input::Message(msg) => {
                write
                    .write(msg.as_bytes())
                    .await
                    .context("failed to write to the device")?;
                debug!("wrote {} bytes", msg.len());
                console.emit(WRITTEN).await?;
            }
        }
    }
}

async fn connect<C: Central>(central: &C, profile: &DeviceProfile) -> Result<C::Peripheral> {
    info!(
        "connecting to {} ({} address)",
        profile.address, profile.address_type
    );
    central
        .connect(&profile.address, profile.address_type)
        .await
        .with_context(|| format!("failed to connect to device {}", profile.address))
}

/// Disconnects `peripheral` and merges the outcome with the session result.
///
/// A disconnect failure after a failed session is only logged, the session
/// error is the one reported.
async fn release<P: Peripheral, T>(peripheral: P, result: Result<T>) -> Result<T> {
    let address = peripheral.address();
    let disconnected = peripheral.disconnect().await;
    match (result, disconnected) {
        (Ok(x), Ok(())) => {
            info!("disconnected from {address}");
            Ok(x)
        }
        (Ok(_), Err(e)) => Err(e.context(format!("failed to disconnect from {address}"))),
        (Err(e), Ok(())) => {
            info!("disconnected from {address}");
            Err(e)
        }
        (Err(e), Err(d)) => {
            error!("failed to disconnect from {address}: {d:#}");
            Err(e)
        }
    }
}

/// Runs the full interactive session.
pub async fn run<C, K>(central: &C, profile: &DeviceProfile, console: &mut K) -> Result<()>
where
    C: Central,
    K: Console,
{
    let peripheral = connect(central, profile).await?;
    let result = async {
        peripheral.discover().await?;
        let links = resolve_links(&peripheral, profile).await?;
        read_sensors(&links, console).await?;
        interact(&links.write, console).await
    }
    .await;
    release(peripheral, result).await
}

/// Reads the sensors once and disconnects.
pub async fn read_only<C, K>(central: &C, profile: &DeviceProfile, console: &mut K) -> Result<()>
where
    C: Central,
    K: Console,
{
    let peripheral = connect(central, profile).await?;
    let result = async {
        peripheral.discover().await?;
        let links = resolve_links(&peripheral, profile).await?;
        read_sensors(&links, console).await
    }
    .await;
    release(peripheral, result).await
}

async fn capabilities<C: Characteristic>(chari: &C) -> Result<&'static str> {
    Ok(
        match (chari.supports_read().await?, chari.supports_write().await?) {
            (true, true) => "read, write",
            (true, false) => "read",
            (false, true) => "write",
            (false, false) => "none",
        },
    )
}

/// Lists every service and characteristic of the device.
pub async fn inspect<C, K>(central: &C, profile: &DeviceProfile, console: &mut K) -> Result<()>
where
    C: Central,
    K: Console,
{
    let peripheral = connect(central, profile).await?;
    let result = async {
        peripheral.discover().await?;
        info!("enumerating services");
        for service in peripheral.services().await? {
            console
                .emit(&format!("Service {}", service.uuid().await?))
                .await?;
            for chari in service.characteristics().await? {
                let line = format!(
                    "  Characteristic {} ({})",
                    chari.uuid().await?,
                    capabilities(&chari).await?
                );
                console.emit(&line).await?;
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    release(peripheral, result).await
}
