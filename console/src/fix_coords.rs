use std::path::PathBuf;

use clap::Args;
use hervasm::prelude::*;
use log::info;

use crate::strings::common as strings;
use crate::utils::{
    open_input,
    open_output,
    UtilsArgs,
};
use crate::PipelineCommand;

#[derive(Args, Debug, Clone)]
pub(crate) struct FixCoordsArgs {
    #[arg(required = true, help = strings::INPUT)]
    input:  PathBuf,
    #[arg(short, long, help = strings::OUTPUT)]
    output: Option<PathBuf>,
}

impl PipelineCommand for FixCoordsArgs {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let mut records = read_records(open_input(&self.input, utils)?)?;
        info!("Read {} hits from {}", records.len(), self.input.display());

        let lengths = fix_model_coordinates(&mut records)?;
        info!("Model lengths:\n{}", lengths.describe());

        let mut writer = GtfWriter::new(open_output(self.output.as_deref())?);
        writer.write_records(records.iter())?;
        writer.flush()
    }
}
