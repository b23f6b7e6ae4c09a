use std::path::PathBuf;

use spritebin::BinShape;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Packs images into compact sprite sheets")]
pub struct Options {
    #[structopt(subcommand)]
    pub command: Subcommand,
}

#[derive(Debug, StructOpt)]
pub enum Subcommand {
    /// Build a sprite sheet from the images matched by a spritemap.toml file,
    /// writing the packed image and a layout describing it.
    Pack(PackOptions),

    /// Add images to an existing sprite sheet without moving the sprites that
    /// are already on it.
    Add(AddOptions),

    /// Pack the sprites of an existing sprite sheet again from scratch.
    Rearrange(RearrangeOptions),

    /// Remove sprites from an existing sprite sheet.
    Remove(RemoveOptions),
}

#[derive(Debug, StructOpt)]
pub struct PackOptions {
    /// The path to a spritemap.toml file, or a folder containing one. Defaults
    /// to the current working directory.
    #[structopt(long = "config")]
    pub config_path: Option<PathBuf>,

    /// Overrides the shape from the config file.
    ///
    /// Options: square, tall, wide
    #[structopt(long)]
    pub shape: Option<BinShape>,

    /// Spread sprites out once instead of tracking free space for later
    /// additions.
    #[structopt(long)]
    pub no_auto_arrange: bool,
}

#[derive(Debug, StructOpt)]
pub struct AddOptions {
    /// The layout file of the sheet to add to.
    pub layout: PathBuf,

    /// The PNG images to add.
    #[structopt(required = true)]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct RearrangeOptions {
    /// The layout file of the sheet to rearrange.
    pub layout: PathBuf,

    /// Changes the shape of the sheet.
    ///
    /// Options: square, tall, wide
    #[structopt(long)]
    pub shape: Option<BinShape>,

    /// Turns automatic arrangement on or off. Turning it on repacks every
    /// sprite.
    #[structopt(long)]
    pub auto_arrange: Option<bool>,

    /// Names of sprites to pack before all others. Can be given more than
    /// once.
    #[structopt(long = "select", number_of_values = 1)]
    pub selected: Vec<String>,
}

#[derive(Debug, StructOpt)]
pub struct RemoveOptions {
    /// The layout file of the sheet to remove sprites from.
    pub layout: PathBuf,

    /// Names of the sprites to remove.
    #[structopt(required = true)]
    pub names: Vec<String>,
}
