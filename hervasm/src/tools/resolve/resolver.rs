use std::collections::BTreeMap;

use arcstr::ArcStr;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{
    debug,
    info,
    warn,
};

use crate::data_structs::locus::{
    dedup_by_id,
    sort_by_strand,
};
use crate::data_structs::typedef::{
    GroupId,
    LocusId,
    PosType,
};
use crate::data_structs::{
    AnnotationRecord,
    Category,
    Locus,
    LocusTable,
    Strand,
};
use crate::error::{
    DataInconsistency,
    LocusError,
    LocusResult,
    UsageError,
};
use crate::tools::adjust::adjust_overlaps;
use crate::tools::assemble::{
    annotate_members,
    majority_strand,
};
use crate::tools::classify::classify;
use crate::tools::model_length::ModelLengths;
use crate::tools::overlap::OverlapGroup;
use crate::tools::resolve::command::{
    CommandScript,
    ResolutionCommand,
};
use crate::tools::resolve::prompt::CommandSource;
use crate::tools::span::{
    internal_model,
    summary_span,
    SpanSummary,
};
use crate::with_field_fn;

/// Fragments shorter than this after a diff trim are dropped.
pub const MIN_FRAGMENT_LEN: i64 = 5;

/// What happens to a diffed locus that lost every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyLocusPolicy {
    /// Remove the locus and carry on.
    #[default]
    Drop,
    /// Abort the run.
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverConfig {
    pub empty_policy: EmptyLocusPolicy,
}

impl ResolverConfig {
    with_field_fn!(empty_policy, EmptyLocusPolicy);
}

/// Side of locus A cut back by a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimSide {
    Left,
    Right,
    /// A lies within B and is removed as a whole.
    Contained,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    Ignored,
    Rejected {
        kept:    Vec<LocusId>,
        dropped: Vec<LocusId>,
    },
    Merged {
        locus:   LocusId,
        from:    Vec<LocusId>,
        dropped: Vec<LocusId>,
    },
    Diffed {
        trimmed: LocusId,
        against: LocusId,
        side:    TrimSide,
    },
    /// The trimmed locus of a diff has no records left.
    ResolvedEmpty { locus: LocusId },
}

#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    /// Every command applied, including the ones entered interactively.
    pub commands:          CommandScript,
    pub outcomes:          BTreeMap<GroupId, GroupOutcome>,
    /// Labels of records removed for being too short after a diff.
    pub dropped_fragments: Vec<String>,
}

struct GroupResolution {
    loci:    Vec<Locus>,
    outcome: GroupOutcome,
    dropped: Vec<String>,
}

/// Picks the loci a command acts on: the explicit ids when given, the
/// command's default otherwise.
fn select_loci<F>(
    explicit: Option<&[LocusId]>,
    loci: &IndexMap<LocusId, Locus>,
    default: F,
) -> LocusResult<Vec<LocusId>>
where
    F: FnOnce(&IndexMap<LocusId, Locus>) -> LocusResult<Vec<LocusId>>, {
    match explicit {
        Some(ids) => Ok(ids.to_vec()),
        None => default(loci),
    }
}

/// Locus ids ordered by decreasing `model_cov`, ties in group order.
fn by_coverage(loci: &IndexMap<LocusId, Locus>) -> LocusResult<Vec<LocusId>> {
    let mut scored = loci
        .values()
        .map(|l| Ok((l.model_cov()?, l.id().clone())))
        .collect::<LocusResult<Vec<_>>>()?;
    scored.sort_by_key(|(cov, _)| std::cmp::Reverse(*cov));
    Ok(scored.into_iter().map(|(_, id)| id).collect_vec())
}

fn take_locus(
    loci: &mut IndexMap<LocusId, Locus>,
    id: &str,
    command: &ResolutionCommand,
) -> LocusResult<Locus> {
    loci.shift_remove(id).ok_or_else(|| {
        UsageError::UnknownLocus {
            command: command.to_string(),
            locus:   id.to_string(),
        }
        .into()
    })
}

/// Where A has to be cut so it no longer overlaps B. Spans are 1-based and
/// inclusive; touching spans count as conflicting.
pub fn trim_side(
    a: &AnnotationRecord,
    b: &AnnotationRecord,
) -> Option<TrimSide> {
    if a.end + 1 < b.start || b.end + 1 < a.start {
        return None;
    }
    let side = if b.start <= a.start && a.end <= b.end {
        TrimSide::Contained
    }
    else if a.start <= b.start && b.end <= a.end {
        if b.end - a.start < a.end - b.start {
            TrimSide::Left
        }
        else {
            TrimSide::Right
        }
    }
    else if a.start > b.start {
        TrimSide::Left
    }
    else {
        TrimSide::Right
    };
    Some(side)
}

/// Clips `records` two bases clear of `other` on `side`, moving the model
/// coordinate of the clipped end by the same amount. Returns the labels of
/// records left shorter than [`MIN_FRAGMENT_LEN`], which are removed.
pub fn clip_records(
    records: &mut Vec<AnnotationRecord>,
    other: &AnnotationRecord,
    side: TrimSide,
) -> LocusResult<Vec<String>> {
    let mut dropped = Vec::new();
    let mut kept = Vec::with_capacity(records.len());
    for mut record in records.drain(..) {
        let (mut start, mut end) = (record.start as i64, record.end as i64);
        match side {
            TrimSide::Left => {
                let bound = other.end as i64 + 2;
                if start < bound {
                    let delta = bound - start;
                    start = bound;
                    if record.strand.is_forward() {
                        record.shift_model_coord("repStart", delta)?;
                    }
                    else {
                        record.shift_model_coord("repEnd", -delta)?;
                    }
                }
            },
            TrimSide::Right => {
                let bound = other.start as i64 - 2;
                if end > bound {
                    let delta = end - bound;
                    end = bound;
                    if record.strand.is_forward() {
                        record.shift_model_coord("repEnd", -delta)?;
                    }
                    else {
                        record.shift_model_coord("repLeft", delta)?;
                    }
                }
            },
            TrimSide::Contained => {},
        }
        if end - start + 1 < MIN_FRAGMENT_LEN {
            dropped.push(record.label());
            continue;
        }
        record.start = start as PosType;
        record.end = end as PosType;
        kept.push(record);
    }
    *records = kept;
    Ok(dropped)
}

/// Applies resolution commands to overlap groups.
pub struct ConflictResolver {
    config:  ResolverConfig,
    lengths: ModelLengths,
}

impl ConflictResolver {
    /// Model lengths used for coverage are inferred from every member record
    /// of `table`.
    pub fn new(
        config: ResolverConfig,
        table: &LocusTable,
    ) -> LocusResult<Self> {
        let lengths = ModelLengths::infer(table.iter().flat_map(|l| l.members().iter()))?;
        Ok(Self { config, lengths })
    }

    pub fn with_lengths(
        config: ResolverConfig,
        lengths: ModelLengths,
    ) -> Self {
        Self { config, lengths }
    }

    /// One validated command per group, in ascending group order. Scripted
    /// commands come first; the rest are asked from `source`.
    pub fn gather_commands(
        &self,
        groups: &BTreeMap<GroupId, OverlapGroup>,
        script: &CommandScript,
        mut source: Option<&mut dyn CommandSource>,
    ) -> anyhow::Result<CommandScript> {
        let mut commands = CommandScript::new();
        for (&group_id, group) in groups.iter() {
            let command = match (script.get(group_id), source.as_deref_mut()) {
                (Some(command), _) => command.clone(),
                (None, Some(source)) => source.next_command(group)?,
                (None, None) => {
                    return Err(LocusError::from(UsageError::MissingCommand {
                        group: group_id,
                    })
                    .into())
                },
            };
            command
                .validate(group_id, &group.locus_ids())
                .map_err(LocusError::from)?;
            commands.insert(group_id, command);
        }
        Ok(commands)
    }

    /// Resolves every group and writes the result back into `table`.
    ///
    /// Groups are worked off on a copy of the table (check out the group's
    /// loci, compute replacements, commit them). `table` is only replaced
    /// once every group succeeded, so an error leaves it untouched.
    pub fn resolve_all(
        &self,
        table: &mut LocusTable,
        groups: &BTreeMap<GroupId, OverlapGroup>,
        script: &CommandScript,
        source: Option<&mut dyn CommandSource>,
    ) -> anyhow::Result<ResolutionReport> {
        let commands = self.gather_commands(groups, script, source)?;

        let mut staged = table.clone();
        let mut report = ResolutionReport::default();
        for (&group_id, group) in groups.iter() {
            let command = commands
                .get(group_id)
                .ok_or(UsageError::MissingCommand { group: group_id })
                .map_err(LocusError::from)?;
            let ids = group.locus_ids();
            let loci = staged.checkout(&ids);
            debug!("Group {}: checked out {}", group_id, ids.join(", "));

            let resolution = self.resolve_group(group_id, loci, command)?;
            debug!(
                "Group {}: committing {}",
                group_id,
                resolution.loci.iter().map(|l| l.id()).join(", ")
            );
            staged.commit(resolution.loci);
            report.outcomes.insert(group_id, resolution.outcome);
            report.dropped_fragments.extend(resolution.dropped);
        }

        *table = staged;
        report.commands = commands;
        info!("Resolved {} overlap groups", report.outcomes.len());
        Ok(report)
    }

    fn resolve_group(
        &self,
        group_id: GroupId,
        loci: IndexMap<LocusId, Locus>,
        command: &ResolutionCommand,
    ) -> LocusResult<GroupResolution> {
        command.validate(group_id, &loci.keys().cloned().collect_vec())?;
        match command {
            ResolutionCommand::Ignore => {
                Ok(GroupResolution {
                    loci:    loci.into_values().collect(),
                    outcome: GroupOutcome::Ignored,
                    dropped: Vec::new(),
                })
            },
            ResolutionCommand::Reject(explicit) => self.reject(loci, explicit.as_deref(), command),
            ResolutionCommand::Merge(explicit) => self.merge(loci, explicit.as_deref(), command),
            ResolutionCommand::Diff(explicit) => {
                let explicit = explicit.as_ref().map(|(a, b)| vec![a.clone(), b.clone()]);
                self.diff(loci, explicit.as_deref(), command)
            },
        }
    }

    fn reject(
        &self,
        mut loci: IndexMap<LocusId, Locus>,
        explicit: Option<&[LocusId]>,
        command: &ResolutionCommand,
    ) -> LocusResult<GroupResolution> {
        let rejected = select_loci(explicit, &loci, |loci| {
            Ok(by_coverage(loci)?.into_iter().skip(1).collect_vec())
        })?;
        for id in rejected.iter() {
            take_locus(&mut loci, id, command)?;
            debug!("Rejected {}", id);
        }
        Ok(GroupResolution {
            outcome: GroupOutcome::Rejected {
                kept:    loci.keys().cloned().collect_vec(),
                dropped: rejected,
            },
            loci:    loci.into_values().collect(),
            dropped: Vec::new(),
        })
    }

    fn merge(
        &self,
        mut loci: IndexMap<LocusId, Locus>,
        explicit: Option<&[LocusId]>,
        command: &ResolutionCommand,
    ) -> LocusResult<GroupResolution> {
        let chosen = select_loci(explicit, &loci, |loci| Ok(loci.keys().cloned().collect_vec()))?;
        let new_id = chosen
            .first()
            .cloned()
            .ok_or(LocusError::EmptyLocus)?;

        let mut records = Vec::new();
        for id in chosen.iter() {
            let (_, _, members) = take_locus(&mut loci, id, command)?.into_parts();
            records.extend(members);
        }
        let unlisted = loci.keys().cloned().collect_vec();

        let strand = majority_strand(&records);
        let mut records = dedup_by_id(records);
        let removed = adjust_overlaps(&mut records, strand)?;
        if !removed.is_empty() {
            debug!("{}: removed covered records {:?}", new_id, removed);
        }
        sort_by_strand(&mut records, strand);
        for record in records.iter_mut().filter(|r| r.strand != strand) {
            record.strand = Strand::None;
        }
        let category = Category::merged();
        annotate_members(&mut records, &new_id, &category.to_string());

        let summary = SpanSummary::compute(&new_id, &records, strand, category, &self.lengths)?;
        let span = summary_span(&new_id, &records, strand, &summary, Some("merged"))
            .ok_or(LocusError::EmptyLocus)?;
        info!("Merged {} into {}", chosen.join("+"), new_id);

        Ok(GroupResolution {
            loci:    vec![Locus::new(new_id.clone(), span, records)],
            outcome: GroupOutcome::Merged {
                locus:   new_id,
                from:    chosen,
                dropped: unlisted,
            },
            dropped: Vec::new(),
        })
    }

    fn diff(
        &self,
        mut loci: IndexMap<LocusId, Locus>,
        explicit: Option<&[LocusId]>,
        command: &ResolutionCommand,
    ) -> LocusResult<GroupResolution> {
        let pair = select_loci(explicit, &loci, by_coverage)?;
        let (id_a, id_b) = match pair.as_slice() {
            [a, b] if a != b => (a.clone(), b.clone()),
            _ => {
                return Err(UsageError::MalformedCommand {
                    command: command.to_tokens(),
                    reason:  "diff needs two different loci".to_string(),
                }
                .into())
            },
        };
        let locus_a = take_locus(&mut loci, &id_a, command)?;
        let locus_b = take_locus(&mut loci, &id_b, command)?;

        let side = trim_side(locus_a.span(), locus_b.span()).ok_or_else(|| {
            DataInconsistency::DisjointDiff {
                a: id_a.clone(),
                b: id_b.clone(),
            }
        })?;
        if side == TrimSide::Contained {
            info!("{} contained within {}. Removing {}.", id_a, id_b, id_a);
            return Ok(GroupResolution {
                loci:    vec![locus_b],
                outcome: GroupOutcome::Diffed {
                    trimmed: id_a,
                    against: id_b,
                    side,
                },
                dropped: Vec::new(),
            });
        }

        debug!("Trimming {:?} side of {}", side, id_a);
        let strand = locus_a.strand();
        // Taken before clipping, which may remove every internal record.
        let model = internal_model(&id_a, locus_a.members())?;
        let (_, _, mut records) = locus_a.into_parts();
        let dropped = clip_records(&mut records, locus_b.span(), side)?;
        for label in dropped.iter() {
            warn!("{}: dropped fragment {} shorter than {} bases", id_a, label, MIN_FRAGMENT_LEN);
        }

        if records.is_empty() {
            return match self.config.empty_policy {
                EmptyLocusPolicy::Drop => {
                    warn!("{} has no records left after diff and is removed", id_a);
                    Ok(GroupResolution {
                        loci: vec![locus_b],
                        outcome: GroupOutcome::ResolvedEmpty { locus: id_a },
                        dropped,
                    })
                },
                EmptyLocusPolicy::Fail => Err(DataInconsistency::EmptiedLocus { locus: id_a }.into()),
            };
        }

        let category = classify(&records, strand)?.resolved();
        let source = ArcStr::from(category.to_string());
        for record in records.iter_mut() {
            record.source = source.clone();
        }
        let summary =
            SpanSummary::compute_with_model(&model, &records, strand, category, &self.lengths)?;
        let span = summary_span(&id_a, &records, strand, &summary, Some("diff"))
            .ok_or(LocusError::EmptyLocus)?;

        Ok(GroupResolution {
            loci: vec![Locus::new(id_a.clone(), span, records), locus_b],
            outcome: GroupOutcome::Diffed {
                trimmed: id_a,
                against: id_b,
                side,
            },
            dropped,
        })
    }
}
