use std::fs::File;
use std::io::{
    IsTerminal,
    Write,
};
use std::path::PathBuf;

use clap::Args;
use console::style;
use hervasm::prelude::*;
use log::{
    info,
    warn,
};

use crate::overlaps::load_groups;
use crate::prompt::TerminalPrompt;
use crate::strings::{
    common,
    polish as strings,
};
use crate::utils::{
    open_output,
    validate_input,
    UtilsArgs,
};
use crate::PipelineCommand;

#[derive(Args, Debug, Clone)]
pub(crate) struct PolishArgs {
    #[arg(required = true, help = common::INPUT)]
    input:           PathBuf,
    #[arg(short, long, help = common::OUTPUT)]
    output:          Option<PathBuf>,
    #[arg(long, conflicts_with = "resolve_file", help = strings::RESOLVE)]
    resolve:         Option<String>,
    #[arg(long, help = strings::RESOLVE_FILE)]
    resolve_file:    Option<PathBuf>,
    #[arg(long, default_value_t = false, help = strings::KEEP_EMPTY_FAIL)]
    keep_empty_fail: bool,
    #[arg(long, help = strings::SAVE_COMMANDS)]
    save_commands:   Option<PathBuf>,
    #[arg(long, default_value_t = false, help = common::BEDTOOLS)]
    bedtools:        bool,
}

impl PolishArgs {
    fn script(&self) -> anyhow::Result<CommandScript> {
        match (&self.resolve, &self.resolve_file) {
            (Some(text), _) => CommandScript::from_json(text),
            (None, Some(path)) => CommandScript::read_json(File::open(validate_input(path)?)?),
            (None, None) => Ok(CommandScript::new()),
        }
    }

    fn config(&self) -> ResolverConfig {
        let policy = if self.keep_empty_fail {
            EmptyLocusPolicy::Fail
        }
        else {
            EmptyLocusPolicy::Drop
        };
        ResolverConfig::default().with_empty_policy(policy)
    }
}

fn describe_outcome(outcome: &GroupOutcome) -> String {
    match outcome {
        GroupOutcome::Ignored => "ignored".to_string(),
        GroupOutcome::Rejected { kept, dropped } => {
            format!("kept {}, rejected {}", kept.join(","), dropped.join(","))
        },
        GroupOutcome::Merged { locus, from, dropped } if dropped.is_empty() => {
            format!("merged {} into {}", from.join("+"), locus)
        },
        GroupOutcome::Merged { locus, from, dropped } => {
            format!(
                "merged {} into {}, dropped {}",
                from.join("+"),
                locus,
                dropped.join(",")
            )
        },
        GroupOutcome::Diffed {
            trimmed,
            against,
            side,
        } => format!("trimmed {} against {} ({:?})", trimmed, against, side),
        GroupOutcome::ResolvedEmpty { locus } => format!("{} lost every record", locus),
    }
}

impl PipelineCommand for PolishArgs {
    fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let script = self.script()?;
        let (mut table, groups) = load_groups(&self.input, self.bedtools, utils)?;

        let missing = groups.keys().filter(|id| !script.contains(**id)).count();
        let mut source = if missing > 0 && std::io::stdin().is_terminal() {
            eprintln!(
                "{} overlap groups have no command",
                style(missing).yellow()
            );
            Some(TerminalPrompt)
        }
        else {
            None
        };

        let resolver = ConflictResolver::new(self.config(), &table)?;
        let report = resolver.resolve_all(
            &mut table,
            &groups,
            &script,
            source.as_mut().map(|s| s as &mut dyn CommandSource),
        )?;

        for (group, outcome) in report.outcomes.iter() {
            info!("Group {}: {}", group, describe_outcome(outcome));
        }
        if !report.dropped_fragments.is_empty() {
            warn!(
                "Dropped {} short fragments: {}",
                report.dropped_fragments.len(),
                report.dropped_fragments.join(", ")
            );
        }
        eprintln!("{}", report.commands.to_json()?);
        if let Some(path) = &self.save_commands {
            let mut out = open_output(Some(path))?;
            report.commands.write_json(&mut out)?;
            writeln!(out)?;
            out.flush()?;
        }

        let mut writer = GtfWriter::new(open_output(self.output.as_deref())?);
        writer.write_table(&table)?;
        writer.flush()
    }
}
