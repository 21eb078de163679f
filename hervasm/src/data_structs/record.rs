use std::fmt;
use std::str::FromStr;

use arcstr::ArcStr;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::attributes::{
    AttrValue,
    Attributes,
};
use crate::data_structs::enums::Strand;
use crate::data_structs::typedef::{
    ModelPos,
    PosType,
};
use crate::error::{
    LocusError,
    LocusResult,
};

pub const SPAN_FEATURE: &str = "span";

/// One row of a GTF file as it is laid out on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGtfRecord {
    pub chrom:      String,
    pub source:     String,
    pub feature:    String,
    pub start:      PosType,
    pub end:        PosType,
    pub score:      String,
    pub strand:     Strand,
    pub frame:      String,
    pub attributes: String,
}

/// A RepeatMasker-derived annotation record.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub chrom:      ArcStr,
    pub source:     ArcStr,
    pub feature:    ArcStr,
    pub start:      PosType,
    pub end:        PosType,
    pub score:      Option<AttrValue>,
    pub strand:     Strand,
    pub attributes: Attributes,
}

impl AnnotationRecord {
    pub fn new(
        chrom: ArcStr,
        source: ArcStr,
        feature: ArcStr,
        start: PosType,
        end: PosType,
        strand: Strand,
        attributes: Attributes,
    ) -> Self {
        assert!(
            start <= end,
            "Start position must be less than or equal to end position"
        );
        Self {
            chrom,
            source,
            feature,
            start,
            end,
            score: None,
            strand,
            attributes,
        }
    }

    pub fn is_span(&self) -> bool { self.feature.starts_with(SPAN_FEATURE) }

    /// Number of genomic bases covered.
    pub fn length(&self) -> PosType { self.end - self.start + 1 }

    /// Value of the `id` attribute, or an empty string.
    pub fn id(&self) -> String {
        self.attributes
            .get("id")
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// A readable name for messages: `id`, falling back to the interval.
    pub fn label(&self) -> String {
        match self.attributes.get("id") {
            Some(id) => id.to_string(),
            None => format!("{}:{}-{}", self.chrom, self.start, self.end),
        }
    }

    pub fn locus(&self) -> Option<String> {
        self.attributes
            .get("locus")
            .map(|v| v.to_string())
    }

    pub fn set_locus(
        &mut self,
        locus: &str,
    ) {
        self.attributes.insert("locus", locus);
    }

    pub fn str_attr(
        &self,
        key: &str,
    ) -> LocusResult<String> {
        self.attributes
            .get(key)
            .map(|v| v.to_string())
            .ok_or_else(|| self.missing(key))
    }

    pub fn int_attr(
        &self,
        key: &str,
    ) -> LocusResult<i64> {
        let value = self
            .attributes
            .get(key)
            .ok_or_else(|| self.missing(key))?;
        value.as_int().ok_or_else(|| {
            LocusError::AttributeType {
                id:       self.label(),
                key:      key.to_string(),
                value:    value.to_string(),
                expected: "integer",
            }
        })
    }

    pub fn float_attr(
        &self,
        key: &str,
    ) -> LocusResult<f64> {
        let value = self
            .attributes
            .get(key)
            .ok_or_else(|| self.missing(key))?;
        value.as_float().ok_or_else(|| {
            LocusError::AttributeType {
                id:       self.label(),
                key:      key.to_string(),
                value:    value.to_string(),
                expected: "number",
            }
        })
    }

    fn missing(
        &self,
        key: &str,
    ) -> LocusError {
        LocusError::MissingAttribute {
            id:  self.label(),
            key: key.to_string(),
        }
    }

    pub fn rep_name(&self) -> LocusResult<String> { self.str_attr("repName") }

    pub fn rep_start(&self) -> LocusResult<ModelPos> { self.int_attr("repStart") }

    pub fn rep_end(&self) -> LocusResult<ModelPos> { self.int_attr("repEnd") }

    pub fn rep_left(&self) -> LocusResult<ModelPos> { self.int_attr("repLeft") }

    pub fn gene_region(&self) -> LocusResult<String> { self.str_attr("geneRegion") }

    /// Adds `delta` to an integer model coordinate.
    pub fn shift_model_coord(
        &mut self,
        key: &str,
        delta: ModelPos,
    ) -> LocusResult<()> {
        let value = self.int_attr(key)?;
        self.attributes.insert(key, value + delta);
        Ok(())
    }

    /// Model length implied by this record's own coordinates.
    pub fn implied_model_length(&self) -> LocusResult<ModelPos> {
        if self.strand.is_forward() {
            Ok(self.rep_end()? - self.rep_left()?)
        }
        else {
            Ok(self.rep_end()? - self.rep_start()?)
        }
    }

    /// Query bases of the model matched by this record under `strand`.
    pub fn model_match_len(
        &self,
        strand: Strand,
    ) -> LocusResult<ModelPos> {
        if strand.is_forward() {
            Ok(self.rep_end()? - self.rep_start()?)
        }
        else {
            Ok(self.rep_end()? - self.rep_left()?)
        }
    }
}

impl fmt::Display for AnnotationRecord {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let score = self
            .score
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| ".".to_string());
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t.\t{}",
            self.chrom,
            self.source,
            self.feature,
            self.start,
            self.end,
            score,
            self.strand,
            self.attributes
        )
    }
}

impl TryFrom<RawGtfRecord> for AnnotationRecord {
    type Error = anyhow::Error;

    fn try_from(value: RawGtfRecord) -> Result<Self, Self::Error> {
        anyhow::ensure!(
            value.start <= value.end,
            "Start {} is after end {} on {}",
            value.start,
            value.end,
            value.chrom
        );
        let score = match value.score.as_str() {
            "." | "" => None,
            s => Some(AttrValue::infer(s)),
        };
        let attributes = Attributes::from_str(&value.attributes)?;

        let mut record = AnnotationRecord::new(
            ArcStr::from(value.chrom),
            ArcStr::from(value.source),
            ArcStr::from(value.feature),
            value.start,
            value.end,
            value.strand,
            attributes,
        );
        record.score = score;
        Ok(record)
    }
}

impl From<&AnnotationRecord> for RawGtfRecord {
    fn from(value: &AnnotationRecord) -> Self {
        RawGtfRecord {
            chrom:      value.chrom.to_string(),
            source:     value.source.to_string(),
            feature:    value.feature.to_string(),
            start:      value.start,
            end:        value.end,
            score:      value
                .score
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| ".".to_string()),
            strand:     value.strand,
            frame:      ".".to_string(),
            attributes: value.attributes.to_string(),
        }
    }
}

impl FromStr for AnnotationRecord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end_matches(['\n', '\r']).split('\t').collect();
        anyhow::ensure!(
            fields.len() >= 9,
            "Expected 9 tab-separated fields, found {}",
            fields.len()
        );
        let raw = RawGtfRecord {
            chrom:      fields[0].to_string(),
            source:     fields[1].to_string(),
            feature:    fields[2].to_string(),
            start:      fields[3].parse()?,
            end:        fields[4].parse()?,
            score:      fields[5].to_string(),
            strand:     fields[6].parse()?,
            frame:      fields[7].to_string(),
            attributes: fields[8].to_string(),
        };
        AnnotationRecord::try_from(raw)
    }
}
