mod assemble;
mod filter;
mod fix_coords;
mod merge_hits;
mod overlaps;
mod polish;
mod prompt;
mod strings;
pub mod utils;

use assemble::AssembleArgs;
use clap::{
    Parser,
    Subcommand,
};
use console::style;
use filter::FilterArgs;
use fix_coords::FixCoordsArgs;
use hervasm::prelude::LocusError;
use merge_hits::MergeHitsArgs;
use overlaps::OverlapsArgs;
use polish::PolishArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

pub(crate) trait PipelineCommand {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()>;
}

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    #[command(name = "fix-coords", about = strings::fix_coords::ABOUT)]
    FixCoords {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  FixCoordsArgs,
    },

    #[command(name = "merge-hits", about = strings::merge_hits::ABOUT)]
    MergeHits {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  MergeHitsArgs,
    },

    #[command(about = strings::assemble::ABOUT)]
    Assemble {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  AssembleArgs,
    },

    #[command(about = strings::overlaps::ABOUT)]
    Overlaps {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  OverlapsArgs,
    },

    #[command(about = strings::polish::ABOUT)]
    Polish {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  PolishArgs,
    },

    #[command(about = strings::filter::ABOUT)]
    Filter {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  FilterArgs,
    },
}

impl MainMenu {
    fn run(&self) -> anyhow::Result<()> {
        let (utils, command): (&UtilsArgs, &dyn PipelineCommand) = match self {
            MainMenu::FixCoords { utils, args } => (utils, args),
            MainMenu::MergeHits { utils, args } => (utils, args),
            MainMenu::Assemble { utils, args } => (utils, args),
            MainMenu::Overlaps { utils, args } => (utils, args),
            MainMenu::Polish { utils, args } => (utils, args),
            MainMenu::Filter { utils, args } => (utils, args),
        };
        utils.setup()?;
        command.run(utils)
    }
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command.run() {
        Err(err)
            if err
                .downcast_ref::<LocusError>()
                .is_some_and(LocusError::is_usage) =>
        {
            eprintln!("{} {}", style("Invalid command:").red().bold(), err);
            std::process::exit(2)
        },
        other => other,
    }
}
