use std::collections::BTreeMap;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use clap::Args;
use hervasm::prelude::*;
use log::info;

use crate::prompt::command_source;
use crate::strings::{
    common,
    overlaps as strings,
};
use crate::utils::{
    is_stdin,
    open_input,
    open_output,
    UtilsArgs,
};
use crate::PipelineCommand;

pub(crate) fn clusterer(bedtools: bool) -> Box<dyn IntervalClusterer> {
    if bedtools {
        Box::new(BedtoolsClusterer::default())
    }
    else {
        Box::new(LapperClusterer)
    }
}

/// Reads a locus table and finds its overlap groups.
pub(crate) fn load_groups(
    input: &Path,
    bedtools: bool,
    utils: &UtilsArgs,
) -> anyhow::Result<(LocusTable, BTreeMap<GroupId, OverlapGroup>)> {
    let table = LocusTable::from_records(read_records(open_input(input, utils)?)?)?;
    info!("Loaded {} loci from {}", table.len(), input.display());
    let groups = find_overlap_groups(table.spans(), clusterer(bedtools).as_ref())?;
    Ok((table, groups))
}

#[derive(Args, Debug, Clone)]
pub(crate) struct OverlapsArgs {
    #[arg(required = true, help = common::INPUT)]
    input:        PathBuf,
    #[arg(short, long, default_value_t = false, help = strings::INTERACTIVE)]
    interactive:  bool,
    #[arg(long, requires = "interactive", help = strings::RESOLVE_FILE)]
    resolve_file: Option<PathBuf>,
    #[arg(long, default_value_t = false, help = common::BEDTOOLS)]
    bedtools:     bool,
}

impl PipelineCommand for OverlapsArgs {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            !(self.interactive && is_stdin(&self.input)),
            "Interactive mode reads commands from stdin; pass the input as a file"
        );
        let (table, groups) = load_groups(&self.input, self.bedtools, utils)?;

        if !self.interactive {
            let mut out = open_output(None)?;
            for group in groups.values() {
                writeln!(out, "{}", group.describe())?;
            }
            out.flush()?;
            return Ok(());
        }

        let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
        let mut source = command_source();
        let commands =
            resolver.gather_commands(&groups, &CommandScript::new(), Some(&mut *source))?;
        info!("Recorded {} commands", commands.len());

        let mut out = open_output(self.resolve_file.as_deref())?;
        commands.write_json(&mut out)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
