use itertools::Itertools;

use crate::data_structs::{
    AnnotationRecord,
    Category,
    CategoryKind,
    Strand,
};
use crate::error::{
    LocusError,
    LocusResult,
};
use crate::utils::simplify_list;

pub const LTR_REGION: &str = "ltr";
pub const INTERNAL_REGION: &str = "internal";

/// `geneRegion` values in strand order with consecutive repeats collapsed.
pub fn region_sequence(
    records: &[AnnotationRecord],
    strand: Strand,
) -> LocusResult<Vec<String>> {
    let ordered = if strand.is_forward() {
        records
            .iter()
            .sorted_by_key(|r| r.start)
            .collect_vec()
    }
    else {
        records
            .iter()
            .sorted_by_key(|r| std::cmp::Reverse(r.end))
            .collect_vec()
    };
    let regions = ordered
        .into_iter()
        .map(|r| r.gene_region())
        .collect::<LocusResult<Vec<_>>>()?;
    Ok(simplify_list(regions))
}

/// Category from whether the collapsed region sequence starts and/or ends
/// with an LTR.
pub fn classify(
    records: &[AnnotationRecord],
    strand: Strand,
) -> LocusResult<Category> {
    let regions = region_sequence(records, strand)?;
    let (first, last) = match (regions.first(), regions.last()) {
        (Some(first), Some(last)) => (first.as_str(), last.as_str()),
        _ => return Err(LocusError::EmptyLocus),
    };

    let kind = match (first == LTR_REGION, last == LTR_REGION) {
        (false, false) => CategoryKind::Internal,
        (true, true) => CategoryKind::Prototype,
        (true, false) | (false, true) => CategoryKind::Oneside,
    };
    Ok(Category::new(kind))
}
