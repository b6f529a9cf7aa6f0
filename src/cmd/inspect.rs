use anyhow::Result;
use clap::{ArgMatches, Command};
use esp_link::session;

pub fn subcmd<'help>() -> Command<'help> {
    Command::new("inspect").about("list the services and characteristics of the device")
}

pub async fn cmd(data: &mut super::CmdData, _m: &ArgMatches) -> Result<()> {
    session::inspect(&data.central, &data.profile, &mut data.console).await
}
