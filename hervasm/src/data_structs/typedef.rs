/// 1-based inclusive genomic coordinate.
pub type PosType = u32;
/// Model-relative coordinate. RepeatMasker stores the unmatched remainder
/// of the model as a negative number, so these are signed.
pub type ModelPos = i64;
pub type LocusId = String;
pub type GroupId = u64;

/// Signed distance between two genomic coordinates.
#[inline]
pub fn gap(
    left_end: PosType,
    right_start: PosType,
) -> i64 {
    right_start as i64 - left_end as i64
}
