//! Mismatch records produced by the comparator.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::entry::{Contents, Entry, PREVIEW_BYTES};
use super::status::StatusCode;

/// Bytes shown before the first difference in a long content diff.
const CONTEXT_BEFORE: usize = 32;

/// Classification of one discrepancy.
///
/// The declaration order is the reporting order for records on the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Path expected but not found.
    Missing,
    /// Path found but not expected.
    Unexpected,
    /// Contents differ.
    ContentDiff,
    /// Status or properties differ.
    AttrDiff,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MismatchKind::Missing => "missing",
            MismatchKind::Unexpected => "unexpected",
            MismatchKind::ContentDiff => "content differs",
            MismatchKind::AttrDiff => "attributes differ",
        };
        f.write_str(s)
    }
}

/// One path-level discrepancy between expected and actual state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchRecord {
    /// Relative path (`""` is the root).
    pub path: String,

    /// What kind of discrepancy this is.
    pub kind: MismatchKind,

    /// The expected entry, absent for `Unexpected`.
    pub expected: Option<Entry>,

    /// The actual entry, absent for `Missing`.
    pub actual: Option<Entry>,
}

impl MismatchRecord {
    pub fn missing(path: &str, expected: &Entry) -> Self {
        Self {
            path: path.to_string(),
            kind: MismatchKind::Missing,
            expected: Some(expected.clone()),
            actual: None,
        }
    }

    pub fn unexpected(path: &str, actual: &Entry) -> Self {
        Self {
            path: path.to_string(),
            kind: MismatchKind::Unexpected,
            expected: None,
            actual: Some(actual.clone()),
        }
    }

    pub fn differs(path: &str, kind: MismatchKind, expected: &Entry, actual: &Entry) -> Self {
        Self {
            path: path.to_string(),
            kind,
            expected: Some(expected.clone()),
            actual: Some(actual.clone()),
        }
    }

    fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }
}

fn show_status(status: Option<StatusCode>) -> String {
    status.map_or_else(|| "<none>".to_string(), |s| s.to_string())
}

/// Both sides of a content diff.
///
/// Short contents are shown whole. When either side is longer than a
/// preview, both are shown from a little before the first differing byte.
fn show_content_diff(exp: &Contents, act: &Contents) -> String {
    let (Some(want), Some(got)) = (exp.as_bytes(), act.as_bytes()) else {
        return format!("expected {exp}, got {act}");
    };
    if want.len() <= PREVIEW_BYTES && got.len() <= PREVIEW_BYTES {
        return format!("expected {exp}, got {act}");
    }

    let offset = want
        .iter()
        .zip(got)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| want.len().min(got.len()));
    let start = offset.saturating_sub(CONTEXT_BEFORE);
    format!(
        "first difference at byte {offset}: expected {} ({} bytes), got {} ({} bytes)",
        window(want, start),
        want.len(),
        window(got, start),
        got.len()
    )
}

fn window(bytes: &[u8], start: usize) -> String {
    let start = start.min(bytes.len());
    let end = (start + PREVIEW_BYTES).min(bytes.len());
    let text = format!("{:?}", String::from_utf8_lossy(&bytes[start..end]));
    match (start > 0, end < bytes.len()) {
        (true, true) => format!("...{text}..."),
        (true, false) => format!("...{text}"),
        (false, true) => format!("{text}..."),
        (false, false) => text,
    }
}

fn show_props(props: Option<&BTreeMap<String, String>>) -> String {
    match props {
        None => "<none>".to_string(),
        Some(map) => format!("{map:?}"),
    }
}

impl fmt::Display for MismatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.display_path();
        match (&self.kind, &self.expected, &self.actual) {
            (MismatchKind::Missing, Some(exp), _) => {
                write!(f, "missing: {path} (expected contents {})", exp.contents())?;
                if let Some(status) = exp.status() {
                    write!(f, ", status {status}")?;
                }
                Ok(())
            }
            (MismatchKind::Unexpected, _, Some(act)) => {
                write!(f, "unexpected: {path} (found contents {})", act.contents())?;
                if let Some(status) = act.status() {
                    write!(f, ", status {status}")?;
                }
                Ok(())
            }
            (MismatchKind::ContentDiff, Some(exp), Some(act)) => write!(
                f,
                "content differs: {path}: {}",
                show_content_diff(exp.contents(), act.contents())
            ),
            (MismatchKind::AttrDiff, Some(exp), Some(act)) => {
                write!(f, "attributes differ: {path}:")?;
                if exp.status().is_some() && exp.status() != act.status() {
                    write!(
                        f,
                        " status expected {}, got {};",
                        show_status(exp.status()),
                        show_status(act.status())
                    )?;
                }
                if exp.props().is_some() {
                    write!(
                        f,
                        " props expected {}, got {}",
                        show_props(exp.props()),
                        show_props(act.props())
                    )?;
                }
                Ok(())
            }
            (kind, _, _) => write!(f, "{kind}: {path}"),
        }
    }
}

/// All mismatches found by one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MismatchReport {
    /// Records sorted by path, then kind.
    pub records: Vec<MismatchRecord>,
}

impl MismatchReport {
    pub fn new(mut records: Vec<MismatchRecord>) -> Self {
        records.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
        Self { records }
    }

    /// Check if there are no mismatches.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the number of mismatches.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MismatchRecord> {
        self.records.iter()
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: MismatchKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// Append another report's records after this one's.
    ///
    /// Each part stays sorted; the concatenation is not re-sorted so output
    /// records from an export stay ahead of disk records.
    pub fn extend(&mut self, other: MismatchReport) {
        self.records.extend(other.records);
    }

    /// Format the report as human-readable text.
    pub fn report(&self) -> String {
        if self.is_empty() {
            return "No differences found.".to_string();
        }

        let mut lines = vec![format!("Found {} differences:", self.records.len())];
        for m in &self.records {
            lines.push(format!("  - {}", m));
        }
        lines.join("\n")
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl IntoIterator for MismatchReport {
    type Item = MismatchRecord;
    type IntoIter = std::vec::IntoIter<MismatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_sorted_by_path_then_kind() {
        let exp = Entry::file("x");
        let act = Entry::file("y");
        let report = MismatchReport::new(vec![
            MismatchRecord::differs("b", MismatchKind::AttrDiff, &exp, &act),
            MismatchRecord::missing("c", &exp),
            MismatchRecord::differs("b", MismatchKind::ContentDiff, &exp, &act),
            MismatchRecord::unexpected("a", &act),
        ]);

        let order: Vec<_> = report.iter().map(|r| (r.path.as_str(), r.kind)).collect();
        assert_eq!(
            order,
            vec![
                ("a", MismatchKind::Unexpected),
                ("b", MismatchKind::ContentDiff),
                ("b", MismatchKind::AttrDiff),
                ("c", MismatchKind::Missing),
            ]
        );
        assert_eq!(report.count(MismatchKind::ContentDiff), 1);
    }

    #[test]
    fn test_empty_report_text() {
        assert_eq!(MismatchReport::default().report(), "No differences found.");
    }

    #[test]
    fn test_record_display_has_both_sides() {
        let rec = MismatchRecord::differs(
            "A/mu",
            MismatchKind::ContentDiff,
            &Entry::file("old\n"),
            &Entry::file("new\n"),
        );
        assert_eq!(
            rec.to_string(),
            "content differs: A/mu: expected \"old\\n\", got \"new\\n\""
        );

        let rec = MismatchRecord::differs(
            "",
            MismatchKind::AttrDiff,
            &Entry::dir().with_status(StatusCode::ADDED),
            &Entry::dir().with_status(StatusCode::UPDATED),
        );
        assert_eq!(
            rec.to_string(),
            "attributes differ: <root>: status expected \"A \", got \"U \";"
        );
    }

    #[test]
    fn test_long_content_diff_shows_first_difference() {
        let mut want = vec![b'x'; 300];
        let mut got = want.clone();
        got[200] = b'Y';
        want.extend_from_slice(b"tail");
        got.extend_from_slice(b"tail");

        let rec = MismatchRecord::differs(
            "big",
            MismatchKind::ContentDiff,
            &Entry::file(want),
            &Entry::file(got),
        );
        let text = rec.to_string();
        assert!(text.contains("first difference at byte 200"), "{text}");
        assert!(text.contains("(304 bytes)"), "{text}");

        let (expected_side, actual_side) = text.split_once(", got ").unwrap();
        assert!(!expected_side.contains('Y'));
        assert!(actual_side.contains('Y'));
    }

    #[test]
    fn test_long_content_diff_with_truncated_side() {
        let want = vec![b'z'; 200];
        let got = vec![b'z'; 150];
        let rec = MismatchRecord::differs(
            "short",
            MismatchKind::ContentDiff,
            &Entry::file(want),
            &Entry::file(got),
        );
        let text = rec.to_string();
        assert!(text.contains("first difference at byte 150"), "{text}");
        assert!(text.contains("(150 bytes)"), "{text}");
    }

    #[test]
    fn test_report_lists_every_record() {
        let report = MismatchReport::new(vec![
            MismatchRecord::missing("x", &Entry::dir()),
            MismatchRecord::unexpected("y", &Entry::file("y")),
        ]);
        let text = report.report();
        assert!(text.starts_with("Found 2 differences:"));
        assert!(text.contains("  - missing: x"));
        assert!(text.contains("  - unexpected: y"));
    }
}
