use std::str::FromStr;

use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::data_structs::locus::{
    dedup_by_id,
    sort_by_strand,
};
use crate::error::{
    DataInconsistency,
    LocusError,
    UsageError,
};
use crate::test_utils::{
    hit,
    record,
    with_locus,
};

const SPAN_LINE: &str = "chr1\tinternal\tspan\t100\t900\t.\t+\t.\tlocus \"locus_0001\"; \
                         category \"internal\"; model_cov \"700\"; model_pct \"80.0\"; exons \"2\";";
const HIT_LINE: &str = "chr1\tinternal\texon\t100\t500\t12\t+\t.\tlocus \"locus_0001\"; \
                        repName \"HERVK-int\"; id \"h1\"; repStart \"1\"; repEnd \"401\"; \
                        repLeft \"-599\"; geneRegion \"internal\";";

#[rstest]
#[case::int("42", AttrValue::Int(42))]
#[case::negative("-599", AttrValue::Int(-599))]
#[case::float("80.5", AttrValue::Float(80.5))]
#[case::integral_float("80.0", AttrValue::Float(80.0))]
#[case::string("HERVK-int", AttrValue::Str("HERVK-int".to_string()))]
fn attr_value_inference(
    #[case] text: &str,
    #[case] expected: AttrValue,
) {
    let value = AttrValue::infer(text);
    assert_eq!(value, expected);
    assert_eq!(value.to_string(), text);
}

#[test]
fn attributes_preferred_order() {
    let attributes: Attributes = vec![
        ("id", AttrValue::from("h1")),
        ("repName", AttrValue::from("HERVK-int")),
        ("locus", AttrValue::from("locus_0001")),
        ("repStart", AttrValue::from(1i64)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        attributes.to_string(),
        "locus \"locus_0001\"; repName \"HERVK-int\"; id \"h1\"; repStart \"1\";"
    );
}

#[test]
fn attributes_parse() {
    let attributes =
        Attributes::from_str("gene_id \"g1\"; repStart \"-3\"; model_pct \"12.5\";").unwrap();
    assert_eq!(attributes.len(), 3);
    assert_eq!(attributes.get("gene_id"), Some(&AttrValue::from("g1")));
    assert_eq!(attributes.get("repStart"), Some(&AttrValue::Int(-3)));
    assert_eq!(attributes.get("model_pct"), Some(&AttrValue::Float(12.5)));
}

#[rstest]
#[case::span(SPAN_LINE)]
#[case::hit(HIT_LINE)]
fn record_text_round_trip(#[case] line: &str) -> anyhow::Result<()> {
    let record = AnnotationRecord::from_str(line)?;
    assert_eq!(record.to_string(), line);
    Ok(())
}

#[test]
fn record_fields() -> anyhow::Result<()> {
    let record = AnnotationRecord::from_str(HIT_LINE)?;
    assert_eq!(record.chrom.as_str(), "chr1");
    assert_eq!((record.start, record.end), (100, 500));
    assert_eq!(record.length(), 401);
    assert_eq!(record.score, Some(AttrValue::Int(12)));
    assert_eq!(record.strand, Strand::Forward);
    assert_eq!(record.id(), "h1");
    assert_eq!(record.locus().as_deref(), Some("locus_0001"));
    assert_eq!(record.rep_left()?, -599);
    assert_eq!(record.implied_model_length()?, 1000);
    assert_eq!(record.model_match_len(Strand::Forward)?, 400);
    assert!(!record.is_span());
    Ok(())
}

#[test]
fn record_rejects_inverted_interval() {
    let line = "chr1\trmsk\texon\t500\t100\t.\t+\t.\tid \"x\";";
    assert!(AnnotationRecord::from_str(line).is_err());
}

#[test]
fn typed_attribute_errors() {
    let record = record("chr1", 1, 10, Strand::Forward, vec![(
        "repName",
        AttrValue::from("HERVK-int"),
    )]);
    assert!(matches!(
        record.rep_start(),
        Err(LocusError::MissingAttribute { .. })
    ));
    assert!(matches!(
        record.int_attr("repName"),
        Err(LocusError::AttributeType {
            expected: "integer",
            ..
        })
    ));
}

#[rstest]
#[case::internal("internal", CategoryKind::Internal, false)]
#[case::resolved("oneside*", CategoryKind::Oneside, true)]
#[case::merged("merged*", CategoryKind::Merged, true)]
fn category_text(
    #[case] text: &str,
    #[case] kind: CategoryKind,
    #[case] resolved: bool,
) {
    let category = Category::from_str(text).unwrap();
    assert_eq!(category.kind, kind);
    assert_eq!(category.resolved, resolved);
    assert_eq!(category.to_string(), text);
}

#[test]
fn category_unknown_name() {
    assert_eq!(
        Category::from_str("solo"),
        Err(LocusError::UnknownCategory("solo".to_string()))
    );
}

#[fixture]
fn minus_hits() -> Vec<AnnotationRecord> {
    vec![
        hit("a", 100, 200, Strand::Reverse, "internal", (1, 100)),
        hit("b", 300, 400, Strand::Reverse, "internal", (101, 200)),
        hit("c", 250, 260, Strand::Reverse, "ltr", (1, 10)),
    ]
}

#[rstest]
fn sort_orders_by_strand(mut minus_hits: Vec<AnnotationRecord>) {
    sort_by_strand(&mut minus_hits, Strand::Reverse);
    let ids: Vec<String> = minus_hits.iter().map(|r| r.id()).collect();
    assert_eq!(ids, ["b", "c", "a"]);

    sort_by_strand(&mut minus_hits, Strand::Forward);
    let ids: Vec<String> = minus_hits.iter().map(|r| r.id()).collect();
    assert_eq!(ids, ["a", "c", "b"]);
}

#[rstest]
fn dedup_keeps_first(minus_hits: Vec<AnnotationRecord>) {
    let mut records = minus_hits.clone();
    records.extend(minus_hits);
    let deduped = dedup_by_id(records);
    assert_eq!(deduped.len(), 3);
    assert_eq!(deduped[0].id(), "a");
}

#[test]
fn table_groups_by_locus() -> anyhow::Result<()> {
    let records = vec![
        AnnotationRecord::from_str(SPAN_LINE)?,
        AnnotationRecord::from_str(HIT_LINE)?,
        with_locus(
            hit("h2", 600, 900, Strand::Forward, "internal", (402, 701)),
            "locus_0001",
        ),
    ];
    let table = LocusTable::from_records(records)?;
    assert_eq!(table.len(), 1);

    let locus = table.get("locus_0001").unwrap();
    assert_eq!(locus.members().len(), 2);
    assert_eq!(locus.span().start, 100);
    assert_eq!(locus.model_cov()?, 700);
    assert_eq!(locus.category().as_deref(), Some("internal"));
    assert_eq!(locus.output_order()[0].feature.as_str(), "span");
    Ok(())
}

#[test]
fn table_requires_single_span() {
    let records = vec![with_locus(
        hit("h1", 100, 200, Strand::Forward, "internal", (1, 100)),
        "locus_0001",
    )];
    assert_eq!(
        LocusTable::from_records(records),
        Err(LocusError::DataInconsistency(DataInconsistency::SpanCount {
            locus: "locus_0001".to_string(),
            found: 0,
        }))
    );
}

#[test]
fn table_requires_locus_attribute() {
    let records = vec![hit("h1", 100, 200, Strand::Forward, "internal", (1, 100))];
    assert_eq!(
        LocusTable::from_records(records),
        Err(LocusError::Usage(UsageError::MissingLocus {
            id: "h1".to_string(),
        }))
    );
}

#[test]
fn table_checkout_and_commit() -> anyhow::Result<()> {
    let span = AnnotationRecord::from_str(SPAN_LINE)?;
    let mut table = LocusTable::new();
    table.insert(Locus::new("locus_0001".to_string(), span, vec![]));

    let checked_out = table.checkout(&["locus_0001".to_string(), "missing".to_string()]);
    assert_eq!(checked_out.len(), 1);
    assert!(table.is_empty());

    table.commit(checked_out.into_values());
    assert!(table.contains("locus_0001"));
    Ok(())
}
