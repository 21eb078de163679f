use std::collections::BTreeMap;
use std::io::Cursor;

use assert_approx_eq::assert_approx_eq;
use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::data_structs::typedef::GroupId;
use crate::data_structs::{
    LocusTable,
    Strand,
};
use crate::error::{
    DataInconsistency,
    LocusError,
    UsageError,
};
use crate::test_utils::{
    assembled,
    hit,
};
use crate::tools::overlap::{
    find_overlap_groups,
    LapperClusterer,
    OverlapGroup,
};

fn groups_of(table: &LocusTable) -> BTreeMap<GroupId, OverlapGroup> {
    find_overlap_groups(table.spans(), &LapperClusterer).unwrap()
}

fn locus_error(err: anyhow::Error) -> LocusError {
    err.downcast::<LocusError>().unwrap()
}

fn script(json: &str) -> CommandScript { CommandScript::from_json(json).unwrap() }

/// A (cov 80, oneside) overlapping B (cov 40) on A's right side.
#[fixture]
fn diff_pair() -> LocusTable {
    vec![
        assembled("A", vec![
            hit("a1", 100, 170, Strand::Forward, "internal", (1, 81)),
            hit("a2", 171, 200, Strand::Forward, "ltr", (1, 30)),
        ]),
        assembled("B", vec![hit("b1", 150, 250, Strand::Forward, "internal", (1, 41))]),
    ]
    .into_iter()
    .collect()
}

/// Three chained loci with coverage 80, 40 and 20.
#[fixture]
fn triple() -> LocusTable {
    vec![
        assembled("A", vec![hit("a1", 100, 300, Strand::Forward, "internal", (1, 81))]),
        assembled("B", vec![hit("b1", 200, 400, Strand::Forward, "internal", (1, 41))]),
        assembled("C", vec![hit("c1", 350, 500, Strand::Forward, "internal", (1, 21))]),
    ]
    .into_iter()
    .collect()
}

#[rstest]
#[case::ignore(&["ignore"], ResolutionCommand::Ignore)]
#[case::reject_default(&["reject"], ResolutionCommand::Reject(None))]
#[case::reject_ids(&["reject", "A,B"], ResolutionCommand::Reject(Some(vec!["A".into(), "B".into()])))]
#[case::diff_upper(&["DIFF", "A-B"], ResolutionCommand::Diff(Some(("A".into(), "B".into()))))]
#[case::merge_ids(&["Merge", "A+B+C"], ResolutionCommand::Merge(Some(vec!["A".into(), "B".into(), "C".into()])))]
fn command_from_tokens(
    #[case] tokens: &[&str],
    #[case] expected: ResolutionCommand,
) {
    let command = ResolutionCommand::from_tokens(tokens).unwrap();
    assert_eq!(command, expected);
    assert_eq!(
        command.to_tokens(),
        tokens
            .iter()
            .map(|t| t.to_string())
            .enumerate()
            .map(|(i, t)| if i == 0 { t.to_lowercase() } else { t })
            .collect::<Vec<_>>()
    );
}

#[rstest]
#[case::empty(&[], "empty command")]
#[case::too_long(&["reject", "A", "B"], "expected an action and at most one argument")]
#[case::bad_pair(&["diff", "AB"], "diff expects loc1-loc2")]
#[case::ignore_arg(&["ignore", "A"], "ignore takes no argument")]
fn command_malformed(
    #[case] tokens: &[&str],
    #[case] reason: &str,
) {
    assert_eq!(
        ResolutionCommand::from_tokens(tokens),
        Err(UsageError::MalformedCommand {
            command: tokens.iter().map(|t| t.to_string()).collect(),
            reason:  reason.to_string(),
        })
    );
}

#[test]
fn command_unknown_action() {
    assert_eq!(
        ResolutionCommand::parse_line("split A"),
        Err(UsageError::UnknownAction("split".to_string()))
    );
}

#[test]
fn script_json_round_trip() -> anyhow::Result<()> {
    let json = r#"{"1":["ignore"],"2":["reject","A,B"],"3":["diff"],"12":["merge","C+D"]}"#;
    let script = CommandScript::from_json(json)?;
    assert_eq!(script.len(), 4);
    assert_eq!(script.get(3), Some(&ResolutionCommand::Diff(None)));
    assert_eq!(script.to_json()?, json);
    assert!(CommandScript::from_json(r#"{"1":["undo"]}"#).is_err());
    Ok(())
}

#[rstest]
fn command_validation(triple: LocusTable) {
    let groups = groups_of(&triple);
    let group = &groups[&1];
    let members = group.locus_ids();
    assert_eq!(
        ResolutionCommand::Diff(None).validate(1, &members),
        Err(UsageError::DiffGroupSize { group: 1, size: 3 })
    );
    assert_eq!(
        ResolutionCommand::parse_line("reject A,Z")
            .unwrap()
            .validate(1, &members),
        Err(UsageError::UnknownLocus {
            command: "reject A,Z".to_string(),
            locus:   "Z".to_string(),
        })
    );
    assert!(ResolutionCommand::parse_line("merge C+A")
        .unwrap()
        .validate(1, &members)
        .is_ok());
}

#[rstest]
fn prompt_state_machine(diff_pair: LocusTable) {
    let groups = groups_of(&diff_pair);
    let group = &groups[&1];

    let state = PromptState::start();
    assert!(state.prompt().ends_with(PROMPT_TEXT));
    assert!(!state.prompt().starts_with(INVALID_BANNER));

    let state = state.advance("frobnicate", group);
    assert!(matches!(
        state,
        PromptState::AwaitingCommand {
            error: Some(_),
            ..
        }
    ));
    assert!(state.prompt().starts_with(INVALID_BANNER));

    let state = state.advance("reject Z", group);
    assert!(!state.is_validated());

    let state = state.advance(" ? ", group);
    assert_eq!(state, PromptState::AwaitingCommand {
        error:     None,
        show_help: true,
    });

    let state = state.advance("diff B-A\n", group);
    assert_eq!(
        state,
        PromptState::Validated(ResolutionCommand::Diff(Some(("B".into(), "A".into()))))
    );
}

#[rstest]
fn line_prompt_reprompts(diff_pair: LocusTable) -> anyhow::Result<()> {
    let groups = groups_of(&diff_pair);
    let mut output = Vec::new();
    let mut prompt = LinePrompt::new(Cursor::new("nonsense\n?\nmerge\n"), &mut output);
    let command = prompt.next_command(&groups[&1])?;
    assert_eq!(command, ResolutionCommand::Merge(None));

    let output = String::from_utf8(output)?;
    assert!(output.starts_with("### Overlap group 1 ###"));
    assert!(output.contains(INVALID_BANNER));
    assert!(output.contains(PROMPT_HELP));
    Ok(())
}

#[rstest]
fn line_prompt_end_of_input(diff_pair: LocusTable) {
    let groups = groups_of(&diff_pair);
    let mut prompt = LinePrompt::new(Cursor::new("nonsense\n"), Vec::new());
    assert!(prompt.next_command(&groups[&1]).is_err());
}

#[rstest]
fn diff_trims_right_side(mut diff_pair: LocusTable) -> anyhow::Result<()> {
    let original_b = diff_pair.get("B").cloned().unwrap();
    let groups = groups_of(&diff_pair);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &diff_pair)?;
    let report = resolver.resolve_all(&mut diff_pair, &groups, &script(r#"{"1":["diff"]}"#), None)?;

    assert_eq!(report.outcomes[&1], GroupOutcome::Diffed {
        trimmed: "A".to_string(),
        against: "B".to_string(),
        side:    TrimSide::Right,
    });
    assert_eq!(report.dropped_fragments, ["a2"]);
    assert_eq!(diff_pair.get("B"), Some(&original_b));

    let a = diff_pair.get("A").unwrap();
    assert_eq!(a.members().len(), 1);
    let a1 = &a.members()[0];
    assert_eq!((a1.start, a1.end), (100, 148));
    assert_eq!(a1.rep_end()?, 59);
    assert_eq!(a1.source.as_str(), "internal*");

    let span = a.span();
    assert_eq!((span.start, span.end), (100, 148));
    assert_eq!(a.category().as_deref(), Some("internal*"));
    assert_eq!(a.model_cov()?, 58);
    assert_approx_eq!(span.float_attr("model_pct")?, 5.8);
    assert_eq!(span.str_attr("conflict")?, "diff");
    Ok(())
}

#[rstest]
fn diff_contained_locus_is_removed() -> anyhow::Result<()> {
    let mut table: LocusTable = vec![
        assembled("A", vec![hit("a1", 120, 180, Strand::Forward, "internal", (1, 81))]),
        assembled("B", vec![hit("b1", 100, 250, Strand::Forward, "internal", (1, 41))]),
    ]
    .into_iter()
    .collect();
    let groups = groups_of(&table);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
    let report = resolver.resolve_all(&mut table, &groups, &script(r#"{"1":["diff","A-B"]}"#), None)?;

    assert!(matches!(report.outcomes[&1], GroupOutcome::Diffed {
        side: TrimSide::Contained,
        ..
    }));
    assert!(!table.contains("A"));
    assert!(table.contains("B"));
    Ok(())
}

#[rstest]
#[case::right_overlap((100, 200), (150, 250), Some(TrimSide::Right))]
#[case::left_overlap((150, 250), (100, 200), Some(TrimSide::Left))]
#[case::touching_right((100, 149), (150, 250), Some(TrimSide::Right))]
#[case::touching_left((251, 300), (150, 250), Some(TrimSide::Left))]
#[case::contains_near_start((100, 400), (120, 150), Some(TrimSide::Left))]
#[case::contains_near_end((100, 400), (350, 380), Some(TrimSide::Right))]
#[case::contained((120, 150), (100, 400), Some(TrimSide::Contained))]
#[case::disjoint((100, 148), (150, 250), None)]
fn diff_geometry(
    #[case] a: (u32, u32),
    #[case] b: (u32, u32),
    #[case] expected: Option<TrimSide>,
) {
    let a = hit("a", a.0, a.1, Strand::Forward, "internal", (1, 10));
    let b = hit("b", b.0, b.1, Strand::Forward, "internal", (1, 10));
    assert_eq!(trim_side(&a, &b), expected);
}

#[rstest]
#[case::plus(Strand::Forward, "repStart", 11)]
#[case::minus(Strand::Reverse, "repEnd", 90)]
fn clip_left_moves_model(
    #[case] strand: Strand,
    #[case] key: &str,
    #[case] expected: i64,
) -> anyhow::Result<()> {
    let other = hit("b", 50, 108, strand, "internal", (1, 10));
    let mut records = vec![hit("a", 100, 200, strand, "internal", (1, 100))];
    let dropped = clip_records(&mut records, &other, TrimSide::Left)?;
    assert!(dropped.is_empty());
    assert_eq!(records[0].start, 110);
    assert_eq!(records[0].int_attr(key)?, expected);
    Ok(())
}

#[rstest]
#[case::plus(Strand::Forward, "repEnd", 90)]
#[case::minus(Strand::Reverse, "repLeft", 11)]
fn clip_right_moves_model(
    #[case] strand: Strand,
    #[case] key: &str,
    #[case] expected: i64,
) -> anyhow::Result<()> {
    let other = hit("b", 192, 300, strand, "internal", (1, 10));
    let mut records = vec![
        hit("a", 100, 200, strand, "internal", (1, 100)),
        hit("c", 187, 195, strand, "internal", (1, 9)),
    ];
    let dropped = clip_records(&mut records, &other, TrimSide::Right)?;
    assert_eq!(dropped, ["c"]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].end, 190);
    assert_eq!(records[0].int_attr(key)?, expected);
    Ok(())
}

#[rstest]
fn diff_keeps_locus_without_internal_records() -> anyhow::Result<()> {
    let mut table: LocusTable = vec![
        assembled("A", vec![
            hit("a1", 100, 190, Strand::Forward, "internal", (1, 91)),
            hit("a2", 191, 260, Strand::Forward, "ltr", (1, 70)),
        ]),
        assembled("B", vec![hit("b1", 50, 195, Strand::Forward, "internal", (1, 146))]),
    ]
    .into_iter()
    .collect();
    let groups = groups_of(&table);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
    let report = resolver.resolve_all(&mut table, &groups, &script(r#"{"1":["diff","A-B"]}"#), None)?;

    assert_eq!(report.outcomes[&1], GroupOutcome::Diffed {
        trimmed: "A".to_string(),
        against: "B".to_string(),
        side:    TrimSide::Left,
    });
    assert_eq!(report.dropped_fragments, ["a1"]);

    let a = table.get("A").unwrap();
    assert_eq!(a.members().len(), 1);
    let a2 = &a.members()[0];
    assert_eq!((a2.start, a2.end), (197, 260));
    assert_eq!(a2.rep_start()?, 7);
    assert_eq!(a.model_cov()?, 0);
    assert_approx_eq!(a.span().float_attr("model_pct")?, 0.0);
    assert_eq!(a.category().as_deref(), Some("prototype*"));
    Ok(())
}

#[rstest]
#[case::reject(r#"{"1":["reject","B,B"]}"#, "B")]
#[case::merge(r#"{"1":["merge","A+C+A"]}"#, "A")]
fn repeated_locus_is_malformed(
    mut triple: LocusTable,
    #[case] json: &str,
    #[case] repeated: &str,
) {
    let before = triple.clone();
    let groups = groups_of(&triple);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &triple).unwrap();
    let err = locus_error(
        resolver
            .resolve_all(&mut triple, &groups, &script(json), None)
            .unwrap_err(),
    );
    match err {
        LocusError::Usage(UsageError::MalformedCommand { reason, .. }) => {
            assert_eq!(reason, format!("locus {} is named more than once", repeated));
        },
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(triple, before);
}

#[rstest]
fn reject_keeps_best_covered(mut triple: LocusTable) -> anyhow::Result<()> {
    let groups = groups_of(&triple);
    assert_eq!(groups[&1].len(), 3);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &triple)?;
    let report = resolver.resolve_all(&mut triple, &groups, &script(r#"{"1":["reject"]}"#), None)?;

    assert_eq!(triple.len(), 1);
    assert!(triple.contains("A"));
    assert_eq!(report.outcomes[&1], GroupOutcome::Rejected {
        kept:    vec!["A".to_string()],
        dropped: vec!["B".to_string(), "C".to_string()],
    });
    Ok(())
}

#[rstest]
fn reject_named_loci(mut triple: LocusTable) -> anyhow::Result<()> {
    let groups = groups_of(&triple);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &triple)?;
    resolver.resolve_all(&mut triple, &groups, &script(r#"{"1":["reject","B"]}"#), None)?;
    assert_eq!(triple.len(), 2);
    assert!(!triple.contains("B"));
    Ok(())
}

#[test]
fn merge_combines_loci() -> anyhow::Result<()> {
    let mut table: LocusTable = vec![
        assembled("A", vec![hit("a1", 1000, 1100, Strand::Forward, "internal", (1, 101))]),
        assembled("B", vec![hit("b1", 1090, 1140, Strand::Forward, "internal", (201, 251))]),
    ]
    .into_iter()
    .collect();
    let groups = groups_of(&table);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
    let report = resolver.resolve_all(&mut table, &groups, &script(r#"{"1":["merge"]}"#), None)?;

    assert_eq!(table.len(), 1);
    let merged = table.get("A").unwrap();
    assert_eq!(merged.members().len(), 2);
    assert_eq!(merged.span().int_attr("exons")?, 2);
    assert_eq!(merged.category().as_deref(), Some("merged*"));
    assert_eq!(merged.span().str_attr("conflict")?, "merged");
    assert_eq!(merged.model_cov()?, 139);
    assert_eq!((merged.span().start, merged.span().end), (1000, 1140));
    for (i, record) in merged.members().iter().enumerate() {
        assert_eq!(record.source.as_str(), "merged*");
        assert_eq!(record.locus().as_deref(), Some("A"));
        assert_eq!(record.int_attr("exon_number")?, i as i64 + 1);
    }
    assert!(matches!(&report.outcomes[&1], GroupOutcome::Merged { locus, .. } if locus == "A"));
    Ok(())
}

#[test]
fn merge_flags_minority_strand() -> anyhow::Result<()> {
    let mut table: LocusTable = vec![
        assembled("A", vec![
            hit("a1", 1000, 1100, Strand::Forward, "internal", (1, 101)),
            hit("a2", 1200, 1300, Strand::Forward, "internal", (102, 202)),
        ]),
        assembled("B", vec![hit("b1", 1250, 1400, Strand::Reverse, "internal", (1, 151))]),
    ]
    .into_iter()
    .collect();
    let groups = groups_of(&table);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
    resolver.resolve_all(&mut table, &groups, &script(r#"{"1":["merge","B+A"]}"#), None)?;

    let merged = table.get("B").unwrap();
    assert_eq!(merged.strand(), Strand::Forward);
    let b1 = merged.members().iter().find(|r| r.id() == "b1").unwrap();
    assert_eq!(b1.strand, Strand::None);
    assert_eq!(b1.start, 1301);
    Ok(())
}

#[rstest]
#[case::drop(EmptyLocusPolicy::Drop)]
#[case::fail(EmptyLocusPolicy::Fail)]
fn diff_emptied_locus(#[case] policy: EmptyLocusPolicy) -> anyhow::Result<()> {
    let mut table: LocusTable = vec![
        assembled("A", vec![hit("a1", 145, 160, Strand::Forward, "internal", (1, 16))]),
        assembled("B", vec![hit("b1", 150, 300, Strand::Forward, "internal", (1, 151))]),
    ]
    .into_iter()
    .collect();
    let before = table.clone();
    let groups = groups_of(&table);
    let resolver = ConflictResolver::new(ResolverConfig::default().with_empty_policy(policy), &table)?;
    let result = resolver.resolve_all(&mut table, &groups, &script(r#"{"1":["diff","A-B"]}"#), None);

    match policy {
        EmptyLocusPolicy::Drop => {
            let report = result?;
            assert_eq!(report.outcomes[&1], GroupOutcome::ResolvedEmpty {
                locus: "A".to_string(),
            });
            assert_eq!(report.dropped_fragments, ["a1"]);
            assert!(!table.contains("A"));
            assert!(table.contains("B"));
        },
        EmptyLocusPolicy::Fail => {
            assert_eq!(
                locus_error(result.unwrap_err()),
                LocusError::DataInconsistency(DataInconsistency::EmptiedLocus {
                    locus: "A".to_string(),
                })
            );
            assert_eq!(table, before);
        },
    }
    Ok(())
}

#[rstest]
fn missing_command_in_batch(mut triple: LocusTable) -> anyhow::Result<()> {
    let before = triple.clone();
    let groups = groups_of(&triple);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &triple)?;
    let err = resolver
        .resolve_all(&mut triple, &groups, &CommandScript::new(), None)
        .unwrap_err();
    let err = locus_error(err);
    assert!(err.is_usage());
    assert_eq!(err, LocusError::Usage(UsageError::MissingCommand { group: 1 }));
    assert_eq!(triple, before);
    Ok(())
}

#[test]
fn failed_group_leaves_table_untouched() -> anyhow::Result<()> {
    // D carries a second internal model, so merging it with C fails.
    let mut d = assembled("D", vec![hit("d1", 5050, 5150, Strand::Forward, "internal", (1, 101))]);
    d.members_mut()[0]
        .attributes
        .insert("repName", "HERVH-int");
    let mut table: LocusTable = vec![
        assembled("A", vec![hit("a1", 100, 200, Strand::Forward, "internal", (1, 81))]),
        assembled("B", vec![hit("b1", 150, 250, Strand::Forward, "internal", (1, 41))]),
        assembled("C", vec![hit("c1", 5000, 5100, Strand::Forward, "internal", (1, 101))]),
        d,
    ]
    .into_iter()
    .collect();

    let before = table.clone();
    let groups = groups_of(&table);
    assert_eq!(groups.len(), 2);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
    let err = resolver
        .resolve_all(&mut table, &groups, &script(r#"{"1":["reject"],"2":["merge"]}"#), None)
        .unwrap_err();
    assert!(matches!(
        locus_error(err),
        LocusError::DataInconsistency(DataInconsistency::InternalModel { found: 2, .. })
    ));
    assert_eq!(table, before);
    Ok(())
}

#[rstest]
fn prompt_fills_missing_commands(mut triple: LocusTable) -> anyhow::Result<()> {
    let groups = groups_of(&triple);
    let resolver = ConflictResolver::new(ResolverConfig::default(), &triple)?;
    let mut prompt = LinePrompt::new(Cursor::new("diff\nreject A,C\n"), Vec::new());
    let report = resolver.resolve_all(
        &mut triple,
        &groups,
        &CommandScript::new(),
        Some(&mut prompt),
    )?;
    assert_eq!(report.commands.to_json()?, r#"{"1":["reject","A,C"]}"#);
    assert_eq!(triple.len(), 1);
    assert!(triple.contains("B"));
    Ok(())
}
