mod commands;
mod data;
mod glob;
mod image;
mod options;
mod sheet;
mod sprite;

use std::process;

use structopt::StructOpt;

use crate::options::{Options, Subcommand};

fn main() {
    env_logger::init();

    let options = Options::from_args();

    match run(options) {
        Ok(_) => {}
        Err(err) => {
            eprintln!("Error: {:?}", err);
            process::exit(1);
        }
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    match options.command {
        Subcommand::Pack(pack_options) => commands::pack(pack_options)?,
        Subcommand::Add(add_options) => commands::add(add_options)?,
        Subcommand::Rearrange(rearrange_options) => commands::rearrange(rearrange_options)?,
        Subcommand::Remove(remove_options) => commands::remove(remove_options)?,
    }

    Ok(())
}
