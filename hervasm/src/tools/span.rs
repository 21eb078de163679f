use arcstr::ArcStr;
use itertools::Itertools;

use crate::data_structs::record::SPAN_FEATURE;
use crate::data_structs::{
    AnnotationRecord,
    Attributes,
    Category,
    Strand,
};
use crate::error::{
    DataInconsistency,
    LocusResult,
};
use crate::tools::classify::INTERNAL_REGION;
use crate::tools::model_length::ModelLengths;

fn is_internal(record: &AnnotationRecord) -> bool {
    record
        .attributes
        .get("geneRegion")
        .is_some_and(|v| v.to_string() == INTERNAL_REGION)
}

/// Record covering `min(start)..max(end)` of `records`, with the chromosome,
/// source and strand of the first record and no attributes. `None` for an
/// empty slice.
pub fn basic_span(records: &[AnnotationRecord]) -> Option<AnnotationRecord> {
    let first = records.first()?;
    let start = records.iter().map(|r| r.start).min()?;
    let end = records.iter().map(|r| r.end).max()?;
    Some(AnnotationRecord::new(
        first.chrom.clone(),
        first.source.clone(),
        ArcStr::from(SPAN_FEATURE),
        start,
        end,
        first.strand,
        Attributes::new(),
    ))
}

/// Name of the single internal model of a locus.
pub fn internal_model(
    locus: &str,
    records: &[AnnotationRecord],
) -> LocusResult<String> {
    let models = records
        .iter()
        .filter(|r| is_internal(r))
        .map(|r| r.rep_name())
        .collect::<LocusResult<Vec<_>>>()?
        .into_iter()
        .unique()
        .collect_vec();
    if models.len() != 1 {
        return Err(DataInconsistency::InternalModel {
            locus:  locus.to_string(),
            found:  models.len(),
            models: models.into_iter().sorted().collect(),
        }
        .into());
    }
    Ok(models.into_iter().next().unwrap_or_default())
}

/// Query bases of the internal model represented in the locus.
pub fn internal_coverage(
    records: &[AnnotationRecord],
    strand: Strand,
) -> LocusResult<i64> {
    records
        .iter()
        .filter(|r| is_internal(r))
        .map(|r| r.model_match_len(strand))
        .sum()
}

/// Summary of a locus as stored on its spanning record.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSummary {
    pub category:  Category,
    pub model_cov: i64,
    pub model_pct: f64,
    pub exons:     usize,
}

impl SpanSummary {
    pub fn compute(
        locus: &str,
        records: &[AnnotationRecord],
        strand: Strand,
        category: Category,
        lengths: &ModelLengths,
    ) -> LocusResult<Self> {
        let model = internal_model(locus, records)?;
        Self::compute_with_model(&model, records, strand, category, lengths)
    }

    /// Summary against a known internal model. Records without an internal
    /// region contribute nothing, so the coverage may be 0.
    pub fn compute_with_model(
        model: &str,
        records: &[AnnotationRecord],
        strand: Strand,
        category: Category,
        lengths: &ModelLengths,
    ) -> LocusResult<Self> {
        let model_cov = internal_coverage(records, strand)?;
        let model_len = lengths.get(model)?;
        let pct = (100.0 * model_cov as f64 / model_len as f64).min(100.0);
        Ok(Self {
            category,
            model_cov,
            model_pct: (pct * 10.0).round() / 10.0,
            exons: records.len(),
        })
    }
}

/// Spanning record of a finished locus: the interval of `records` with the
/// locus strand and the summary attributes. `conflict` names the resolution
/// that produced the locus, if any.
pub fn summary_span(
    locus: &str,
    records: &[AnnotationRecord],
    strand: Strand,
    summary: &SpanSummary,
    conflict: Option<&str>,
) -> Option<AnnotationRecord> {
    let mut span = basic_span(records)?;
    span.strand = strand;
    span.attributes.insert("locus", locus);
    span.attributes
        .insert("category", summary.category.to_string());
    span.attributes.insert("model_cov", summary.model_cov);
    span.attributes.insert("model_pct", summary.model_pct);
    span.attributes.insert("exons", summary.exons);
    if let Some(conflict) = conflict {
        span.attributes.insert("conflict", conflict);
    }
    Some(span)
}
