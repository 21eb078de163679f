use crate::data_structs::locus::sort_by_strand;
use crate::data_structs::typedef::{
    gap,
    PosType,
};
use crate::data_structs::{
    AnnotationRecord,
    Strand,
};
use crate::error::LocusResult;

/// Removes overlaps between neighbouring members of one locus.
///
/// Records are put in strand order first. On the plus strand an overlapping
/// record's start is moved to one base past the previous record's end and
/// `repStart` moves by the same amount. On the minus strand the end is
/// moved to one base before the previous record's start and `repLeft`
/// follows. A record entirely covered by its predecessor has nothing left
/// and is removed; the labels of removed records are returned.
///
/// Running this again on its own output changes nothing.
pub fn adjust_overlaps(
    records: &mut Vec<AnnotationRecord>,
    strand: Strand,
) -> LocusResult<Vec<String>> {
    sort_by_strand(records, strand);

    let mut kept: Vec<AnnotationRecord> = Vec::with_capacity(records.len());
    let mut removed = Vec::new();
    for mut record in records.drain(..) {
        if let Some(prev) = kept.last() {
            if strand.is_forward() {
                if gap(prev.end, record.start) <= 0 {
                    let new_start = prev.end as i64 + 1;
                    if new_start > record.end as i64 {
                        removed.push(record.label());
                        continue;
                    }
                    let delta = new_start - record.start as i64;
                    record.start = new_start as PosType;
                    record.shift_model_coord("repStart", delta)?;
                }
            }
            else if gap(record.end, prev.start) <= 0 {
                let new_end = prev.start as i64 - 1;
                if new_end < record.start as i64 {
                    removed.push(record.label());
                    continue;
                }
                let delta = record.end as i64 - new_end;
                record.end = new_end as PosType;
                record.shift_model_coord("repLeft", delta)?;
            }
        }
        kept.push(record);
    }

    *records = kept;
    Ok(removed)
}
