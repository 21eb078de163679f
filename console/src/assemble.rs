use std::path::PathBuf;

use clap::Args;
use hervasm::prelude::*;
use log::info;

use crate::strings::{
    assemble as strings,
    common,
};
use crate::utils::{
    open_input,
    open_output,
    UtilsArgs,
};
use crate::PipelineCommand;

#[derive(Args, Debug, Clone)]
pub(crate) struct AssembleArgs {
    #[arg(required = true, help = common::INPUT)]
    input:  PathBuf,
    #[arg(long, help = strings::LTR)]
    ltr:    Option<PathBuf>,
    #[arg(short, long, help = common::OUTPUT)]
    output: Option<PathBuf>,
}

impl PipelineCommand for AssembleArgs {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let mut records = read_records(open_input(&self.input, utils)?)?;
        if let Some(ltr) = &self.ltr {
            let hits = read_intersect_pairs(open_input(ltr, utils)?)?;
            info!("Read {} flanking hits from {}", hits.len(), ltr.display());
            records.extend(hits);
        }

        let table = assemble(records)?;
        info!("Assembled {} loci", table.len());

        let mut writer = GtfWriter::new(open_output(self.output.as_deref())?);
        writer.write_table(&table)?;
        writer.flush()
    }
}
