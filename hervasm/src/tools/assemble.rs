//! Builds finished loci from records that already carry a `locus`
//! attribute, typically merged internal hits plus the LTR hits flanking
//! them.

use arcstr::ArcStr;
use indexmap::IndexMap;
use log::{
    debug,
    info,
};

use crate::data_structs::locus::{
    dedup_by_id,
    sort_by_strand,
};
use crate::data_structs::typedef::LocusId;
use crate::data_structs::{
    AnnotationRecord,
    Locus,
    LocusTable,
    Strand,
};
use crate::error::{
    LocusResult,
    UsageError,
};
use crate::tools::adjust::adjust_overlaps;
use crate::tools::classify::classify;
use crate::tools::model_length::ModelLengths;
use crate::tools::span::{
    summary_span,
    SpanSummary,
};
use crate::utils::mode_first;

/// Majority strand of `records`, ties going to the strand seen first.
pub fn majority_strand(records: &[AnnotationRecord]) -> Strand {
    mode_first(records.iter().map(|r| r.strand)).unwrap_or(Strand::None)
}

/// Sets source to the category, `locus` to `id` and `exon_number` to the
/// 1-based rank of each record. Records must already be in strand order.
pub fn annotate_members(
    records: &mut [AnnotationRecord],
    id: &str,
    source: &str,
) {
    for (i, record) in records.iter_mut().enumerate() {
        record.source = ArcStr::from(source);
        record.set_locus(id);
        record.attributes.insert("exon_number", i + 1);
    }
}

/// De-duplicates, removes overlaps, classifies and summarises one locus.
pub fn assemble_locus(
    id: LocusId,
    records: Vec<AnnotationRecord>,
    lengths: &ModelLengths,
) -> LocusResult<Option<Locus>> {
    let strand = majority_strand(&records);
    let mut members = dedup_by_id(records);
    let removed = adjust_overlaps(&mut members, strand)?;
    if !removed.is_empty() {
        debug!("{}: removed covered records {:?}", id, removed);
    }
    if members.is_empty() {
        return Ok(None);
    }

    let category = classify(&members, strand)?;
    sort_by_strand(&mut members, strand);
    annotate_members(&mut members, &id, &category.to_string());

    let summary = SpanSummary::compute(&id, &members, strand, category, lengths)?;
    Ok(summary_span(&id, &members, strand, &summary, None)
        .map(|span| Locus::new(id, span, members)))
}

/// Assembles every locus found in `records`. Existing spanning records are
/// ignored and rebuilt. Model lengths are inferred over all input records.
pub fn assemble<I>(records: I) -> LocusResult<LocusTable>
where
    I: IntoIterator<Item = AnnotationRecord>, {
    let mut by_locus: IndexMap<LocusId, Vec<AnnotationRecord>> = IndexMap::new();
    for record in records.into_iter().filter(|r| !r.is_span()) {
        let locus = record.locus().ok_or_else(|| {
            UsageError::MissingLocus {
                id: record.label(),
            }
        })?;
        by_locus.entry(locus).or_default().push(record);
    }

    let lengths = ModelLengths::infer(by_locus.values().flatten())?;
    let mut table = LocusTable::new();
    for (id, records) in by_locus {
        if let Some(locus) = assemble_locus(id, records, &lengths)? {
            table.insert(locus);
        }
    }
    info!("Assembled {} loci", table.len());
    Ok(table)
}
