use std::cmp::Reverse;
use std::collections::BTreeMap;

use log::{
    debug,
    info,
};

use crate::data_structs::typedef::gap;
use crate::data_structs::{
    AnnotationRecord,
    Locus,
    Strand,
};
use crate::error::{
    DataInconsistency,
    LocusResult,
    UsageError,
};
use crate::tools::span::basic_span;
use crate::with_field_fn;

/// Characters splitting locus ids in `reject`, `diff` and `merge` arguments.
const ID_SEPARATORS: [char; 3] = ['-', '+', ','];

#[derive(Debug, Clone, PartialEq)]
pub struct HitMergerConfig {
    /// Hits this close or closer are merged without further checks.
    pub short_distance: i64,
    /// Hits further apart than this are never merged.
    pub long_distance:  i64,
    /// Locus ids are `{prefix}_{n:04}`.
    pub prefix:         String,
}

impl Default for HitMergerConfig {
    fn default() -> Self {
        Self {
            short_distance: 10,
            long_distance:  10_000,
            prefix:         "locus".to_string(),
        }
    }
}

impl HitMergerConfig {
    with_field_fn!(short_distance, i64);

    with_field_fn!(long_distance, i64);

    with_field_fn!(prefix, String);

    /// Whether `next` continues the insertion that `prev` belongs to.
    pub fn should_merge(
        &self,
        prev: &AnnotationRecord,
        next: &AnnotationRecord,
        strand: Strand,
    ) -> LocusResult<bool> {
        let distance = if strand.is_forward() {
            gap(prev.end, next.start)
        }
        else {
            gap(next.end, prev.start)
        };
        if distance <= self.short_distance {
            return Ok(true);
        }
        if distance >= self.long_distance {
            return Ok(false);
        }
        // Model progress has to follow genomic progress.
        if strand.is_forward() {
            Ok(prev.rep_left()? < next.rep_left()?)
        }
        else {
            Ok(prev.rep_start()? < next.rep_start()?)
        }
    }

    fn sweep(
        &self,
        mut hits: Vec<AnnotationRecord>,
        strand: Strand,
    ) -> LocusResult<Vec<Vec<AnnotationRecord>>> {
        if strand.is_forward() {
            hits.sort_by_key(|r| r.start);
        }
        else {
            hits.sort_by_key(|r| Reverse(r.end));
        }

        let mut clusters = Vec::new();
        let mut current: Vec<AnnotationRecord> = Vec::new();
        for hit in hits {
            let merge = match current.last() {
                Some(prev) => self.should_merge(prev, &hit, strand)?,
                None => true,
            };
            if !merge {
                clusters.push(std::mem::take(&mut current));
            }
            current.push(hit);
        }
        if !current.is_empty() {
            clusters.push(current);
        }
        Ok(clusters)
    }

    /// Merges raw hits into candidate loci.
    ///
    /// Hits are split by chromosome (processed in name order) and strand
    /// (plus first). Every cluster becomes a locus with a fresh sequential
    /// id written into each member's `locus` attribute and a spanning
    /// record over the cluster.
    pub fn merge(
        &self,
        hits: Vec<AnnotationRecord>,
    ) -> LocusResult<Vec<Locus>> {
        if self
            .prefix
            .chars()
            .any(|c| ID_SEPARATORS.contains(&c) || c.is_whitespace())
        {
            return Err(UsageError::InvalidPrefix {
                prefix: self.prefix.clone(),
            }
            .into());
        }
        let mut by_chrom: BTreeMap<String, (Vec<AnnotationRecord>, Vec<AnnotationRecord>)> =
            BTreeMap::new();
        for hit in hits {
            let entry = by_chrom.entry(hit.chrom.to_string()).or_default();
            match hit.strand {
                Strand::Forward => entry.0.push(hit),
                Strand::Reverse => entry.1.push(hit),
                Strand::None => {
                    return Err(DataInconsistency::UnstrandedHit {
                        id: hit.label(),
                    }
                    .into())
                },
            }
        }

        let mut loci = Vec::new();
        for (chrom, (plus, minus)) in by_chrom {
            debug!(
                "Merging {} plus and {} minus hits on {}",
                plus.len(),
                minus.len(),
                chrom
            );
            let clusters = self
                .sweep(plus, Strand::Forward)?
                .into_iter()
                .chain(self.sweep(minus, Strand::Reverse)?);
            for mut cluster in clusters {
                let id = format!("{}_{:04}", self.prefix, loci.len() + 1);
                let Some(mut span) = basic_span(&cluster)
                else {
                    continue;
                };
                span.set_locus(&id);
                for hit in cluster.iter_mut() {
                    hit.set_locus(&id);
                }
                loci.push(Locus::new(id, span, cluster));
            }
        }
        info!("Merged hits into {} loci", loci.len());
        Ok(loci)
    }
}
