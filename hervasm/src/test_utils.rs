//! Record builders shared by the unit tests.

use arcstr::ArcStr;

use crate::data_structs::typedef::{
    ModelPos,
    PosType,
};
use crate::data_structs::{
    AnnotationRecord,
    AttrValue,
    Attributes,
    Locus,
    Strand,
};
use crate::tools::assemble::assemble_locus;
use crate::tools::model_length::ModelLengths;

pub const INTERNAL_MODEL: &str = "HERVK-int";
pub const LTR_MODEL: &str = "LTR5_Hs";
pub const INTERNAL_LEN: ModelPos = 1000;
pub const LTR_LEN: ModelPos = 100;

pub fn record(
    chrom: &str,
    start: PosType,
    end: PosType,
    strand: Strand,
    attributes: Vec<(&str, AttrValue)>,
) -> AnnotationRecord {
    AnnotationRecord::new(
        ArcStr::from(chrom),
        ArcStr::from("rmsk"),
        ArcStr::from("exon"),
        start,
        end,
        strand,
        attributes.into_iter().collect::<Attributes>(),
    )
}

/// `(repStart, repEnd, repLeft)` of a match over model bases
/// `model_from..model_to` that satisfies the model length invariant.
pub fn model_coords(
    strand: Strand,
    model_from: ModelPos,
    model_to: ModelPos,
    model_len: ModelPos,
) -> (ModelPos, ModelPos, ModelPos) {
    if strand.is_forward() {
        (model_from, model_to, model_to - model_len)
    }
    else {
        (model_to - model_len, model_to, model_from)
    }
}

/// RepeatMasker hit on chr1 with consistent model coordinates. Internal
/// hits use [`INTERNAL_MODEL`], LTR hits [`LTR_MODEL`].
pub fn hit(
    id: &str,
    start: PosType,
    end: PosType,
    strand: Strand,
    region: &str,
    model_span: (ModelPos, ModelPos),
) -> AnnotationRecord {
    let (model, len) = if region == "ltr" {
        (LTR_MODEL, LTR_LEN)
    }
    else {
        (INTERNAL_MODEL, INTERNAL_LEN)
    };
    let (rep_start, rep_end, rep_left) = model_coords(strand, model_span.0, model_span.1, len);
    record("chr1", start, end, strand, vec![
        ("id", id.into()),
        ("repName", model.into()),
        ("geneRegion", region.into()),
        ("repStart", rep_start.into()),
        ("repEnd", rep_end.into()),
        ("repLeft", rep_left.into()),
    ])
}

pub fn with_locus(
    mut record: AnnotationRecord,
    locus: &str,
) -> AnnotationRecord {
    record.set_locus(locus);
    record
}

pub fn lengths() -> ModelLengths {
    let records = vec![
        hit("len_int", 1, 10, Strand::Forward, "internal", (1, 10)),
        hit("len_ltr", 1, 10, Strand::Forward, "ltr", (1, 10)),
    ];
    ModelLengths::infer(records.iter()).unwrap()
}

/// Finished locus built from `members` with the assembler.
pub fn assembled(
    id: &str,
    members: Vec<AnnotationRecord>,
) -> Locus {
    let members = members
        .into_iter()
        .map(|r| with_locus(r, id))
        .collect();
    assemble_locus(id.to_string(), members, &lengths())
        .unwrap()
        .unwrap()
}
