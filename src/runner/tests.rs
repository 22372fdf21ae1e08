//! Unit tests for run orchestration.

use super::*;
use crate::catalog::{Batch, ExpectedArg, MockBatchLoader, RecordEntry};
use crate::matcher::{MatchResult, MockStepMatcher, StepMatch};
use crate::output_prefs::OutputPrefs;
use crate::registry::{
    MockStepLoader, StepImpl, StepLocation, StepParam, StepPattern, StepRegistry,
};
use crate::report::SilentReporter;
use crate::value::ArgKind;
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> StepRegistry {
    let mut registry = StepRegistry::default();
    for (name, line, params) in [
        ("step_a", 3, vec!["world", "arg"]),
        ("step_b", 8, vec!["world"]),
    ] {
        let step = StepImpl::new(
            name,
            StepLocation::new("tests/steps.rs", line),
            params.into_iter().map(|p| StepParam::new(p, None)).collect(),
            StepPattern::placeholder(name),
        )
        .expect("valid step");
        registry.insert(step).expect("unique step");
    }
    registry
}

fn loader_for(registry: StepRegistry) -> MockStepLoader {
    let mut loader = MockStepLoader::new();
    loader
        .expect_load()
        .times(1)
        .returning(move || Ok(registry.clone()));
    loader.expect_describe().return_const(String::from("tests"));
    loader
}

fn batches(catalogs: Vec<(&'static str, Batch)>) -> MockBatchLoader {
    let mut loader = MockBatchLoader::new();
    loader.expect_load_batch().returning(move |path| {
        Ok(catalogs
            .iter()
            .find(|(name, _)| path.as_str() == *name)
            .map(|(_, batch)| batch.clone())
            .unwrap_or_default())
    });
    loader
}

/// Resolves "given a" to `step_a` extracting `arg`, and "given b" to `step_b`.
fn matcher(arg: i64) -> MockStepMatcher {
    let mut matcher = MockStepMatcher::new();
    matcher
        .expect_find_match()
        .returning(move |sentence, _| match sentence {
            "given a" => MatchResult::Matched(StepMatch::bare("step_a").with_positional(arg)),
            "given b" => MatchResult::Matched(StepMatch::bare("step_b")),
            _ => MatchResult::NoMatch,
        });
    matcher
}

fn sample_batch() -> Batch {
    vec![
        RecordEntry::new("given a", "step_a")
            .with_argument("arg", ExpectedArg::explicit(ArgKind::Integer, 5_i64)),
        RecordEntry::new("given b", "step_b"),
    ]
}

fn plan(catalogs: &[&str], minimum: Option<f64>) -> RunPlan {
    RunPlan {
        catalogs: catalogs.iter().map(Utf8PathBuf::from).collect(),
        minimum,
        show_missing: true,
    }
}

#[rstest]
fn minimum_above_100_is_rejected_before_loading() {
    let mut steps = MockStepLoader::new();
    steps.expect_load().times(0);
    let mut loader = MockBatchLoader::new();
    loader.expect_load_batch().times(0);
    let err = verify_catalogs(
        &plan(&["matches.yml"], Some(150.0)),
        &steps,
        &loader,
        &MockStepMatcher::new(),
        &mut SilentReporter,
    )
    .expect_err("minimum out of range");
    assert!(matches!(err, RunnerError::MinimumOutOfRange { .. }));
    assert_eq!(err.exit_status(), ExitStatus::InvalidConfiguration);
}

#[rstest]
fn empty_registry_stops_before_catalogs() {
    let mut loader = MockBatchLoader::new();
    loader.expect_load_batch().times(0);
    let err = verify_catalogs(
        &plan(&["matches.yml"], None),
        &loader_for(StepRegistry::default()),
        &loader,
        &MockStepMatcher::new(),
        &mut SilentReporter,
    )
    .expect_err("no steps");
    assert_eq!(err.to_string(), "no step implementations found in tests");
    assert_eq!(err.exit_status(), ExitStatus::NoSteps);
}

#[rstest]
fn all_sentences_pass(registry: StepRegistry) {
    let mut reporter = TextReporter::new(Vec::new(), OutputPrefs::with_emoji(true));
    let status = verify_catalogs(
        &plan(&["matches.yml"], Some(100.0)),
        &loader_for(registry),
        &batches(vec![("matches.yml", sample_batch())]),
        &matcher(5),
        &mut reporter,
    )
    .expect("run completes");
    assert_eq!(status, ExitStatus::Success);
    let out = String::from_utf8(reporter.into_inner()).expect("utf-8");
    assert_eq!(
        out,
        concat!(
            "Testing sentences from matches.yml:\n",
            ">> STEP \"given a\" SHOULD MATCH step_a    ✔\n",
            ">> STEP \"given b\" SHOULD MATCH step_b    ✔\n",
            "\n",
            "2 sentences (2 passed)\n",
            "Covered 2 of 2 step implementations (coverage: 100.00%)\n",
        )
    );
}

#[rstest]
fn argument_mismatch_fails_the_run(registry: StepRegistry) {
    let mut reporter = TextReporter::new(Vec::new(), OutputPrefs::with_emoji(false));
    let status = verify_catalogs(
        &plan(&["matches.yml"], None),
        &loader_for(registry),
        &batches(vec![("matches.yml", sample_batch())]),
        &matcher(6),
        &mut reporter,
    )
    .expect("run completes");
    assert_eq!(status, ExitStatus::FailedMatches);
    let out = String::from_utf8(reporter.into_inner()).expect("utf-8");
    assert!(
        out.contains(concat!(
            ">> STEP \"given a\" SHOULD MATCH step_a    FAIL (at tests/steps.rs:3)\n",
            "  - expected argument \"arg\" with value \"5\" but matched \"6\"\n",
            ">> STEP \"given b\" SHOULD MATCH step_b    PASS\n",
        )),
        "unexpected output:\n{out}"
    );
    assert!(out.contains("2 sentences (1 passed, 1 failed)\n"));
}

#[rstest]
#[case::passing_matches(5, ExitStatus::CoverageShortfall)]
#[case::failed_matches_win(6, ExitStatus::FailedMatches)]
fn coverage_shortfall_precedence(
    registry: StepRegistry,
    #[case] arg: i64,
    #[case] expected: ExitStatus,
) {
    let only_a = vec![
        RecordEntry::new("given a", "step_a").with_argument("arg", 5_i64),
    ];
    let mut reporter = TextReporter::new(Vec::new(), OutputPrefs::with_emoji(false));
    let status = verify_catalogs(
        &plan(&["matches.yml"], Some(75.0)),
        &loader_for(registry),
        &batches(vec![("matches.yml", only_a)]),
        &matcher(arg),
        &mut reporter,
    )
    .expect("run completes");
    assert_eq!(status, expected);
    let out = String::from_utf8(reporter.into_inner()).expect("utf-8");
    assert!(out.ends_with(concat!(
        "Covered 1 of 2 step implementations (coverage: 50.00%, expected a minimum of 75%)\n",
        "Missing steps:\n",
        "- step_b at tests/steps.rs:8\n",
    )));
}

#[rstest]
fn coverage_is_unioned_across_catalogs(registry: StepRegistry) {
    let first = vec![RecordEntry::new("given a", "step_a")];
    let second = vec![RecordEntry::new("given b", "step_b")];
    let status = verify_catalogs(
        &plan(&["first.yml", "second.yml"], Some(100.0)),
        &loader_for(registry),
        &batches(vec![("first.yml", first), ("second.yml", second)]),
        &matcher(5),
        &mut SilentReporter,
    )
    .expect("run completes");
    assert_eq!(status, ExitStatus::Success);
}

#[rstest]
fn empty_catalog_stops_the_run(registry: StepRegistry) {
    let mut loader = MockBatchLoader::new();
    loader
        .expect_load_batch()
        .times(1)
        .returning(|_| Ok(Batch::new()));
    let err = verify_catalogs(
        &plan(&["empty.yml", "never.yml"], None),
        &loader_for(registry),
        &loader,
        &matcher(5),
        &mut SilentReporter,
    )
    .expect_err("empty batch");
    assert_eq!(err.to_string(), "no sentences found in empty.yml to test against");
    assert_eq!(err.exit_status(), ExitStatus::EmptyBatch);
}

#[rstest]
fn malformed_record_aborts_the_run(registry: StepRegistry) {
    let batch = vec![
        RecordEntry::new("given b", "step_b"),
        RecordEntry {
            should_match: Some("step_a".into()),
            ..RecordEntry::default()
        },
    ];
    let err = verify_catalogs(
        &plan(&["matches.yml"], None),
        &loader_for(registry),
        &batches(vec![("matches.yml", batch)]),
        &matcher(5),
        &mut SilentReporter,
    )
    .expect_err("malformed record");
    assert_eq!(err.exit_status(), ExitStatus::MalformedRecord);
    let RunnerError::MalformedRecord { source, .. } = err else {
        panic!("expected a malformed record error");
    };
    assert_eq!(source.to_string(), "record #2 is missing `sentence`");
}
