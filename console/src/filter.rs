use std::path::PathBuf;

use clap::Args;
use hervasm::prelude::*;

use crate::strings::{
    common,
    filter as strings,
};
use crate::utils::{
    open_input,
    open_output,
    UtilsArgs,
};
use crate::PipelineCommand;

#[derive(Args, Debug, Clone)]
pub(crate) struct FilterArgs {
    #[arg(required = true, help = common::INPUT)]
    input:              PathBuf,
    #[arg(short, long, help = common::OUTPUT)]
    output:             Option<PathBuf>,
    #[arg(long, help = strings::REJECT)]
    reject:             Option<PathBuf>,
    #[arg(long, default_value_t = 0, help = strings::MIN_INTERNAL_BASES)]
    min_internal_bases: i64,
    #[arg(long, default_value_t = 0.0, help = strings::MIN_INTERNAL_PCT)]
    min_internal_pct:   f64,
}

impl PipelineCommand for FilterArgs {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.min_internal_pct),
            "--min-internal-pct is a fraction between 0 and 1, got {}",
            self.min_internal_pct
        );
        let records = read_records(open_input(&self.input, utils)?)?;
        let table = LocusTable::from_records(records)?;

        let outcome = FilterConfig::default()
            .with_min_internal_bases(self.min_internal_bases)
            .with_min_internal_pct(self.min_internal_pct)
            .apply(&table)?;

        let mut writer = GtfWriter::new(open_output(self.output.as_deref())?);
        for locus in outcome.passed.iter() {
            writer.write_locus(locus)?;
        }
        writer.flush()?;

        if let Some(path) = &self.reject {
            let mut writer = GtfWriter::new(open_output(Some(path))?);
            for locus in outcome.rejected.iter() {
                writer.write_locus(locus)?;
            }
            writer.flush()?;
        }

        eprint!("{}", outcome.summary);
        Ok(())
    }
}
