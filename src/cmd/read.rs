use anyhow::Result;
use clap::{ArgMatches, Command};
use esp_link::session;

pub fn subcmd<'help>() -> Command<'help> {
    Command::new("read").about("read the sensors once and disconnect")
}

pub async fn cmd(data: &mut super::CmdData, _m: &ArgMatches) -> Result<()> {
    session::read_only(&data.central, &data.profile, &mut data.console).await
}
