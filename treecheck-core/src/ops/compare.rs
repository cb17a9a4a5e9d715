//! Tree state comparison.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Entry, MismatchKind, MismatchRecord, MismatchReport, TreeState};

/// Compare an expected state against an actual one.
///
/// - Paths only in `expected` are `Missing`, paths only in `actual` are
///   `Unexpected`.
/// - For shared paths, contents are compared byte for byte unless the
///   expected contents are ignored; status is compared only when the expected
///   entry sets one; props only when the expected entry sets them.
///
/// Records come back sorted by path, so the same inputs always produce the
/// same report.
pub fn compare(expected: &TreeState, actual: &TreeState) -> MismatchReport {
    let mut records = Vec::new();

    let expected_paths: BTreeSet<&str> = expected.paths().collect();
    let actual_paths: BTreeSet<&str> = actual.paths().collect();

    for path in expected_paths.union(&actual_paths) {
        match (expected.desc().get(*path), actual.desc().get(*path)) {
            (Some(exp), None) => records.push(MismatchRecord::missing(path, exp)),
            (None, Some(act)) => records.push(MismatchRecord::unexpected(path, act)),
            (Some(exp), Some(act)) => compare_entry(path, exp, act, &mut records),
            (None, None) => {}
        }
    }

    let report = MismatchReport::new(records);
    log::debug!(
        "compare: {} expected, {} actual, {} mismatches",
        expected.len(),
        actual.len(),
        report.len()
    );
    report
}

fn compare_entry(path: &str, exp: &Entry, act: &Entry, records: &mut Vec<MismatchRecord>) {
    if let Some(want) = exp.contents().as_bytes() {
        if act.contents().as_bytes() != Some(want) {
            records.push(MismatchRecord::differs(path, MismatchKind::ContentDiff, exp, act));
        }
    }

    let status_differs = exp.status().is_some() && exp.status() != act.status();
    let props_differ = match exp.props() {
        None => false,
        Some(want) => {
            let empty = BTreeMap::new();
            act.props().unwrap_or(&empty) != want
        }
    };
    if status_differs || props_differ {
        records.push(MismatchRecord::differs(path, MismatchKind::AttrDiff, exp, act));
    }
}
