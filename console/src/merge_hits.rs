use std::path::PathBuf;

use clap::Args;
use hervasm::prelude::*;

use crate::strings::{
    common,
    merge_hits as strings,
};
use crate::utils::{
    open_input,
    open_output,
    UtilsArgs,
};
use crate::PipelineCommand;

#[derive(Args, Debug, Clone)]
pub(crate) struct MergeHitsArgs {
    #[arg(required = true, help = common::INPUT)]
    input:      PathBuf,
    #[arg(short, long, help = common::OUTPUT)]
    output:     Option<PathBuf>,
    #[arg(long, default_value_t = 10, help = strings::SHORT_DIST)]
    short_dist: i64,
    #[arg(long, default_value_t = 10_000, help = strings::LONG_DIST)]
    long_dist:  i64,
    #[arg(long, required = true, help = strings::PREFIX)]
    prefix:     String,
}

impl MergeHitsArgs {
    fn config(&self) -> HitMergerConfig {
        HitMergerConfig::default()
            .with_short_distance(self.short_dist)
            .with_long_distance(self.long_dist)
            .with_prefix(self.prefix.clone())
    }
}

impl PipelineCommand for MergeHitsArgs {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.short_dist <= self.long_dist,
            "--short-dist ({}) must not exceed --long-dist ({})",
            self.short_dist,
            self.long_dist
        );
        let hits = read_records(open_input(&self.input, utils)?)?;
        let loci = self.config().merge(hits)?;

        let mut writer = GtfWriter::new(open_output(self.output.as_deref())?);
        for locus in loci.iter() {
            writer.write_locus(locus)?;
        }
        writer.flush()
    }
}
