use std::time::Duration;

use anyhow::{Context, Result};
use clap::{arg, value_parser, Arg, ArgAction, Command};
use esp_link::{
    bluetooth::BluezCentral,
    console::Terminal,
    profile::{DEVICE_ADDRESS, RESOLVE_TIMEOUT},
    session, AddressType, DeviceProfile,
};

mod inspect;
mod read;

pub struct CmdData {
    central: BluezCentral,
    profile: DeviceProfile,
    console: Terminal,
}

fn command<'help>() -> Command<'help> {
    Command::new("esp-link")
        .version("0.1")
        .about("talk to the ESP32 sensor board over bluetooth low energy")
        .arg(
            arg!(
            -v --verbose "Enable verbose output"
            )
            .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(
                -a --address <ADDRESS> "Set the address of the device"
            )
            .required(false)
            .default_value(DEVICE_ADDRESS),
        )
        .arg(
            Arg::new("address-type")
                .short('t')
                .long("address-type")
                .value_name("TYPE")
                .help("Set the address type, public or random (unused if bluez already knows the device)")
                .takes_value(true)
                .required(false)
                .default_value("public")
                .value_parser(value_parser!(AddressType)),
        )
        .arg(
            arg!(
                -i --adapter <NAME> "Use this bluetooth adapter instead of the default one"
            )
            .required(false),
        )
        .arg(
            Arg::new("resolve-timeout")
                .long("resolve-timeout")
                .value_name("SECS")
                .help("Seconds to wait for the device services to be resolved")
                .takes_value(true)
                .required(false)
                .value_parser(value_parser!(u64)),
        )
        .subcommand(read::subcmd())
        .subcommand(inspect::subcmd())
}

pub async fn run() -> Result<()> {
    let matches = command().get_matches();

    let verbose = *matches.get_one::<bool>("verbose").unwrap();
    env_logger::init_from_env(env_logger::Env::default().filter_or(
        env_logger::DEFAULT_FILTER_ENV,
        if verbose { "debug" } else { "warn" },
    ));

    let profile = DeviceProfile {
        address: matches
            .get_one::<String>("address")
            .cloned()
            .unwrap_or_else(|| DEVICE_ADDRESS.to_string()),
        address_type: matches
            .get_one::<AddressType>("address-type")
            .copied()
            .unwrap_or_default(),
        ..DeviceProfile::default()
    };
    let resolve_timeout = matches
        .get_one::<u64>("resolve-timeout")
        .map(|x| Duration::from_secs(*x))
        .unwrap_or(RESOLVE_TIMEOUT);
    let adapter = matches.get_one::<String>("adapter").map(|x| x.as_str());

    let central = BluezCentral::new(adapter, resolve_timeout)
        .await
        .context("failed to set up bluetooth adapter")?;

    let mut data = CmdData {
        central,
        profile,
        console: Terminal::new(),
    };

    match matches.subcommand() {
        Some(("read", matches)) => read::cmd(&mut data, matches).await,
        Some(("inspect", matches)) => inspect::cmd(&mut data, matches).await,
        _ => session::run(&data.central, &data.profile, &mut data.console).await,
    }
}
