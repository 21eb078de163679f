use std::cmp::Reverse;

use hashbrown::HashSet;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::data_structs::enums::Strand;
use crate::data_structs::record::AnnotationRecord;
use crate::data_structs::typedef::LocusId;
use crate::error::{
    DataInconsistency,
    LocusResult,
    UsageError,
};
use crate::getter_fn;

/// Orders records the way a locus is read: ascending start on the plus
/// strand, descending end otherwise. The sort is stable.
pub fn sort_by_strand(
    records: &mut [AnnotationRecord],
    strand: Strand,
) {
    if strand.is_forward() {
        records.sort_by_key(|r| r.start);
    }
    else {
        records.sort_by_key(|r| Reverse(r.end));
    }
}

/// Keeps one record per `id`. Duplicates are assumed identical, the first
/// occurrence is kept.
pub fn dedup_by_id(records: Vec<AnnotationRecord>) -> Vec<AnnotationRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id()))
        .collect_vec()
}

/// A reconstructed insertion: member records plus one spanning record.
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    id:      LocusId,
    span:    AnnotationRecord,
    members: Vec<AnnotationRecord>,
}

impl Locus {
    pub fn new(
        id: LocusId,
        span: AnnotationRecord,
        members: Vec<AnnotationRecord>,
    ) -> Self {
        Self { id, span, members }
    }

    /// Splits a raw record list into its spanning record and members.
    pub fn from_records(
        id: LocusId,
        records: Vec<AnnotationRecord>,
    ) -> LocusResult<Self> {
        let (mut spans, members): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| r.is_span());
        if spans.len() != 1 {
            return Err(DataInconsistency::SpanCount {
                locus: id,
                found: spans.len(),
            }
            .into());
        }
        let span = spans.remove(0);
        Ok(Self { id, span, members })
    }

    getter_fn!(id, LocusId);

    getter_fn!(span, AnnotationRecord);

    getter_fn!(members, Vec<AnnotationRecord>);

    getter_fn!(members, mut Vec<AnnotationRecord>);

    pub fn strand(&self) -> Strand { self.span.strand }

    pub fn chrom(&self) -> &str { self.span.chrom.as_str() }

    pub fn model_cov(&self) -> LocusResult<i64> { self.span.int_attr("model_cov") }

    pub fn category(&self) -> Option<String> {
        self.span
            .attributes
            .get("category")
            .map(|v| v.to_string())
    }

    /// Spanning record first, then members by ascending start.
    pub fn output_order(&self) -> Vec<&AnnotationRecord> {
        std::iter::once(&self.span)
            .chain(self.members.iter().sorted_by_key(|r| r.start))
            .collect_vec()
    }

    pub fn into_parts(self) -> (LocusId, AnnotationRecord, Vec<AnnotationRecord>) {
        (self.id, self.span, self.members)
    }
}

/// Every locus of a run, keyed by locus id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocusTable {
    loci: IndexMap<LocusId, Locus>,
}

impl LocusTable {
    pub fn new() -> Self { Self::default() }

    /// Groups records by their `locus` attribute. Every group must contain
    /// exactly one spanning record.
    pub fn from_records<I>(records: I) -> LocusResult<Self>
    where
        I: IntoIterator<Item = AnnotationRecord>, {
        let mut grouped: IndexMap<LocusId, Vec<AnnotationRecord>> = IndexMap::new();
        for record in records {
            let locus = record.locus().ok_or_else(|| {
                UsageError::MissingLocus {
                    id: record.label(),
                }
            })?;
            grouped.entry(locus).or_default().push(record);
        }

        let mut table = Self::new();
        for (id, records) in grouped {
            table.insert(Locus::from_records(id, records)?);
        }
        Ok(table)
    }

    pub fn insert(
        &mut self,
        locus: Locus,
    ) -> Option<Locus> {
        self.loci.insert(locus.id.clone(), locus)
    }

    pub fn get(
        &self,
        id: &str,
    ) -> Option<&Locus> {
        self.loci.get(id)
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.loci.contains_key(id)
    }

    pub fn len(&self) -> usize { self.loci.len() }

    pub fn is_empty(&self) -> bool { self.loci.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Locus> { self.loci.values() }

    pub fn spans(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.loci.values().map(|l| &l.span)
    }

    pub fn records(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.loci
            .values()
            .flat_map(|l| std::iter::once(&l.span).chain(l.members.iter()))
    }

    /// Removes the named loci from the table and hands them out. Ids that
    /// are not present are skipped.
    pub fn checkout(
        &mut self,
        ids: &[LocusId],
    ) -> IndexMap<LocusId, Locus> {
        ids.iter()
            .filter_map(|id| self.loci.shift_remove_entry(id))
            .collect()
    }

    /// Inserts replacement loci, overwriting any entry with the same id.
    pub fn commit<I>(
        &mut self,
        loci: I,
    ) where
        I: IntoIterator<Item = Locus>, {
        for locus in loci {
            self.insert(locus);
        }
    }

    /// Deterministic emission order: chromosome, span start, locus id.
    pub fn sorted(&self) -> Vec<&Locus> {
        self.loci
            .values()
            .sorted_by(|a, b| {
                a.chrom()
                    .cmp(b.chrom())
                    .then(a.span.start.cmp(&b.span.start))
                    .then(a.id.cmp(&b.id))
            })
            .collect_vec()
    }
}

impl FromIterator<Locus> for LocusTable {
    fn from_iter<T: IntoIterator<Item = Locus>>(iter: T) -> Self {
        let mut table = Self::new();
        table.commit(iter);
        table
    }
}
