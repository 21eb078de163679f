//! Reference length of each repeat model, guessed from the records.
//!
//! The `repStart`, `repEnd` and `repLeft` values of RepeatMasker tables do
//! not always imply the same model length. The most common implied length
//! is taken as the true one and every record is rewritten to agree with it.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;

use crate::data_structs::typedef::ModelPos;
use crate::data_structs::AnnotationRecord;
use crate::error::{
    DataInconsistency,
    LocusResult,
};
use crate::utils::mode_first;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelLengths {
    inner: BTreeMap<String, ModelPos>,
}

impl ModelLengths {
    /// Mode of the implied model length per `repName`. Records without
    /// `repName` do not contribute.
    pub fn infer<'a, I>(records: I) -> LocusResult<Self>
    where
        I: IntoIterator<Item = &'a AnnotationRecord>, {
        let mut implied: indexmap::IndexMap<String, Vec<ModelPos>> = Default::default();
        for record in records {
            if !record.attributes.contains_key("repName") {
                continue;
            }
            implied
                .entry(record.rep_name()?)
                .or_default()
                .push(record.implied_model_length()?);
        }

        let inner = implied
            .into_iter()
            .filter_map(|(name, lengths)| mode_first(lengths).map(|len| (name, len)))
            .collect();
        Ok(Self { inner })
    }

    pub fn get(
        &self,
        model: &str,
    ) -> LocusResult<ModelPos> {
        self.inner.get(model).copied().ok_or_else(|| {
            DataInconsistency::UnknownModel {
                model: model.to_string(),
            }
            .into()
        })
    }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    /// Models in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModelPos)> { self.inner.iter() }

    /// `repEnd` a record must have under the inferred model length.
    pub fn expected_rep_end(
        &self,
        record: &AnnotationRecord,
    ) -> LocusResult<ModelPos> {
        let len = self.get(&record.rep_name()?)?;
        if record.strand.is_forward() {
            Ok(len + record.rep_left()?)
        }
        else {
            Ok(len + record.rep_start()?)
        }
    }

    /// Rewrites `repEnd` from the inferred length and moves the companion
    /// coordinate so the match span is preserved. Returns how many records
    /// changed.
    pub fn correct(
        &self,
        records: &mut [AnnotationRecord],
    ) -> LocusResult<usize> {
        let mut corrected = 0;
        for record in records
            .iter_mut()
            .filter(|r| r.attributes.contains_key("repName"))
        {
            let true_end = self.expected_rep_end(record)?;
            let rep_end = record.rep_end()?;
            if true_end == rep_end {
                continue;
            }
            let companion = if record.strand.is_forward() {
                "repStart"
            }
            else {
                "repLeft"
            };
            let rep_len = rep_end - record.int_attr(companion)?;
            record.attributes.insert("repEnd", true_end);
            record.attributes.insert(companion, true_end - rep_len);
            corrected += 1;
        }
        debug!("Corrected model coordinates of {} records", corrected);
        Ok(corrected)
    }

    /// Fails on the first record that breaks the model coordinate invariant.
    pub fn verify<'a, I>(
        &self,
        records: I,
    ) -> LocusResult<()>
    where
        I: IntoIterator<Item = &'a AnnotationRecord>, {
        for record in records
            .into_iter()
            .filter(|r| r.attributes.contains_key("repName"))
        {
            let expected = self.expected_rep_end(record)?;
            let rep_end = record.rep_end()?;
            if expected != rep_end {
                return Err(DataInconsistency::ModelCoordinates {
                    id: record.label(),
                    rep_end,
                    expected,
                }
                .into());
            }
        }
        Ok(())
    }

    /// One `name<TAB>length` line per model, in name order.
    pub fn describe(&self) -> String {
        self.inner
            .iter()
            .map(|(name, len)| format!("{:<16}{}", name, len))
            .join("\n")
    }
}

/// Infers model lengths, corrects every record and checks the result.
pub fn fix_model_coordinates(
    records: &mut [AnnotationRecord]
) -> LocusResult<ModelLengths> {
    let lengths = ModelLengths::infer(records.iter())?;
    lengths.correct(records)?;
    lengths.verify(records.iter())?;
    Ok(lengths)
}
