//! Converts a sprint report into spreadsheet rows.

use tracing::debug;
use url::Url;

use super::discipline::DisciplineResolver;
use super::row::SheetRow;
use super::sprint_name::simplify_sprint_name;
use crate::jira::{browse_url, ReportIssue, SprintReport};

/// Report bucket an issue was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    /// Completed during the sprint.
    Completed,
    /// Still open when the sprint closed.
    NotCompleted,
    /// Removed from the sprint ("punted").
    Removed,
}

/// Builds a Sheets `=HYPERLINK` formula for an issue.
///
/// Double quotes in the title become single quotes; nothing else is escaped.
pub fn hyperlink_formula(endpoint: &Url, key: &str, title: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\",\"{}\")",
        browse_url(endpoint, key),
        title.replace('"', "'").trim()
    )
}

/// Turns sprint reports into ticket rows.
///
/// The classifier owns its [`DisciplineResolver`], so disciplines resolved
/// for one report are reused for the next when the same instance is kept.
pub struct ReportClassifier {
    endpoint: Url,
    resolver: DisciplineResolver,
}

impl ReportClassifier {
    /// Creates a classifier linking issues under `endpoint`.
    pub fn new(endpoint: Url, resolver: DisciplineResolver) -> Self {
        Self { endpoint, resolver }
    }

    /// The discipline resolver in use.
    pub fn resolver(&self) -> &DisciplineResolver {
        &self.resolver
    }

    /// Produces one row per issue: completed, then not completed, then
    /// removed, each bucket in report order.
    ///
    /// Issues completed in another sprint are not reported.
    pub async fn classify(&mut self, report: &SprintReport) -> Vec<SheetRow> {
        let contents = &report.contents;
        let buckets = [
            (IssueCategory::Completed, &contents.completed_issues),
            (
                IssueCategory::NotCompleted,
                &contents.issues_not_completed_in_current_sprint,
            ),
            (IssueCategory::Removed, &contents.punted_issues),
        ];

        let sprint_label = simplify_sprint_name(&report.sprint.name);
        let mut rows = Vec::with_capacity(buckets.iter().map(|(_, issues)| issues.len()).sum());

        for (category, issues) in buckets {
            for issue in issues {
                let added = contents.was_added_during_sprint(&issue.key);
                let mut row = self.estimate_row(issue, added, category, &sprint_label);
                row.discipline = self.resolver.resolve(&issue.key, &issue.summary).await;
                rows.push(row);
            }
        }

        debug!(
            sprint = %report.sprint.name,
            rows = rows.len(),
            remote_fetches = self.resolver.remote_fetches(),
            "Classified sprint report"
        );
        rows
    }

    /// Fills every row field except the discipline.
    fn estimate_row(
        &self,
        issue: &ReportIssue,
        added: bool,
        category: IssueCategory,
        sprint_label: &str,
    ) -> SheetRow {
        let original = issue.original_estimate();
        let mut row = SheetRow {
            sprint: sprint_label.to_string(),
            ticket_number: issue.key.clone(),
            title: issue.summary.clone(),
            link: hyperlink_formula(&self.endpoint, &issue.key, &issue.summary),
            ..SheetRow::default()
        };

        if added {
            row.added = original;
        } else {
            row.commited = original;
        }

        match category {
            IssueCategory::Completed => row.completed = original,
            IssueCategory::NotCompleted => row.carried_over = issue.current_estimate(),
            IssueCategory::Removed => row.dropped = original,
        }

        row.adjusted = row.compute_adjusted();
        row
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::jira::test_utils::{details, ConfigurableMockIssueSource, RequestLogHandle};
    use crate::jira::{SprintDetails, SprintReportContents};

    const ENDPOINT: &str = "https://example.atlassian.net";

    fn classifier(
        responses: Vec<anyhow::Result<crate::jira::IssueDetails>>,
    ) -> (ReportClassifier, RequestLogHandle) {
        let source = ConfigurableMockIssueSource::new(responses);
        let handle = source.request_handle();
        let resolver = DisciplineResolver::new(Box::new(source));
        (
            ReportClassifier::new(Url::parse(ENDPOINT).unwrap(), resolver),
            handle,
        )
    }

    fn report(
        completed: Vec<ReportIssue>,
        not_completed: Vec<ReportIssue>,
        removed: Vec<ReportIssue>,
        added: &[&str],
    ) -> SprintReport {
        SprintReport {
            contents: SprintReportContents {
                completed_issues: completed,
                issues_not_completed_in_current_sprint: not_completed,
                punted_issues: removed,
                issues_completed_in_another_sprint: Vec::new(),
                issue_keys_added_during_sprint: added
                    .iter()
                    .map(|k| ((*k).to_string(), true))
                    .collect::<HashMap<_, _>>(),
            },
            sprint: SprintDetails {
                id: 7,
                name: "IMR Sprint 2021-W05-06".to_string(),
                ..SprintDetails::default()
            },
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[tokio::test]
    async fn completed_issue_row() {
        let (mut classifier, _) = classifier(vec![]);
        let report = report(
            vec![ReportIssue::new("PROJ-1", "[Backend] Fix bug", 5.0)],
            vec![],
            vec![],
            &[],
        );

        let rows = classifier.classify(&report).await;

        assert_eq!(
            rows,
            vec![SheetRow {
                sprint: "2021-W05-06".to_string(),
                discipline: "Backend".to_string(),
                ticket_number: "PROJ-1".to_string(),
                title: "[Backend] Fix bug".to_string(),
                link: "=HYPERLINK(\"https://example.atlassian.net/browse/PROJ-1\",\"[Backend] Fix bug\")"
                    .to_string(),
                commited: 5,
                dropped: 0,
                added: 0,
                adjusted: 5,
                carried_over: 0,
                completed: 5,
            }]
        );
    }

    #[tokio::test]
    async fn completed_issue_added_mid_sprint() {
        let (mut classifier, _) = classifier(vec![]);
        let report = report(
            vec![ReportIssue::new("PROJ-1", "[Backend] Fix bug", 5.0)],
            vec![],
            vec![],
            &["PROJ-1"],
        );

        let rows = classifier.classify(&report).await;
        let row = &rows[0];

        assert_eq!(row.commited, 0);
        assert_eq!(row.added, 5);
        assert_eq!(row.completed, 5);
        assert_eq!(row.adjusted, 5);
    }

    #[tokio::test]
    async fn not_completed_uses_current_estimate() {
        let (mut classifier, _) = classifier(vec![]);
        let report = report(
            vec![],
            vec![ReportIssue::new("PROJ-2", "[Web] Form", 8.0).with_current_estimate(3.0)],
            vec![],
            &[],
        );

        let rows = classifier.classify(&report).await;
        let row = &rows[0];

        assert_eq!(row.commited, 8);
        assert_eq!(row.carried_over, 3);
        assert_eq!(row.completed, 0);
        assert_eq!(row.dropped, 0);
        assert_eq!(row.adjusted, 8);
    }

    #[tokio::test]
    async fn removed_issue_subtracts_from_adjusted() {
        let (mut classifier, _) = classifier(vec![]);
        let report = report(
            vec![],
            vec![],
            vec![
                ReportIssue::new("PROJ-3", "[iOS] Widget", 3.0),
                ReportIssue::new("PROJ-4", "[Android] Widget", 2.0),
            ],
            &["PROJ-4"],
        );

        let rows = classifier.classify(&report).await;

        assert_eq!((rows[0].commited, rows[0].dropped, rows[0].adjusted), (3, 3, 0));
        assert_eq!((rows[1].added, rows[1].dropped, rows[1].adjusted), (2, 2, 0));
    }

    #[tokio::test]
    async fn completed_and_dropped_use_original_estimate() {
        let (mut classifier, _) = classifier(vec![]);
        let report = report(
            vec![ReportIssue::new("PROJ-1", "[Web] Done", 5.0).with_current_estimate(8.0)],
            vec![],
            vec![
                ReportIssue::new("PROJ-2", "[Web] Dropped", 3.0).with_current_estimate(13.0),
                ReportIssue::new("PROJ-3", "[Web] Added and dropped", 2.0)
                    .with_current_estimate(1.0),
            ],
            &["PROJ-3"],
        );

        let rows = classifier.classify(&report).await;

        assert_eq!((rows[0].commited, rows[0].completed, rows[0].adjusted), (5, 5, 5));
        assert_eq!((rows[1].commited, rows[1].dropped, rows[1].adjusted), (3, 3, 0));
        assert_eq!((rows[2].added, rows[2].dropped, rows[2].adjusted), (2, 2, 0));
    }

    #[tokio::test]
    async fn rows_follow_bucket_order() {
        let (mut classifier, _) = classifier(vec![]);
        let report = report(
            vec![
                ReportIssue::new("C-1", "[Web] a", 1.0),
                ReportIssue::new("C-2", "[Web] b", 1.0),
            ],
            vec![ReportIssue::new("N-1", "[Web] c", 1.0)],
            vec![
                ReportIssue::new("R-1", "[Web] d", 1.0),
                ReportIssue::new("R-2", "[Web] e", 1.0),
            ],
            &[],
        );

        let keys: Vec<String> = classifier
            .classify(&report)
            .await
            .into_iter()
            .map(|r| r.ticket_number)
            .collect();

        assert_eq!(keys, vec!["C-1", "C-2", "N-1", "R-1", "R-2"]);
    }

    #[tokio::test]
    async fn failed_lookup_still_emits_row() {
        let (mut classifier, handle) = classifier(vec![
            Err(anyhow::anyhow!("HTTP 503")),
            Ok(details("PROJ-9", None, &["Payments"])),
        ]);
        let first = report(vec![ReportIssue::new("PROJ-9", "Untagged", 2.0)], vec![], vec![], &[]);

        let rows = classifier.classify(&first).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].discipline, "Other");
        assert_eq!(rows[0].completed, 2);

        // Same issue in the next sprint's report triggers a new lookup.
        let rows = classifier.classify(&first).await;
        assert_eq!(rows[0].discipline, "Payments");
        assert_eq!(handle.request_count(), 2);
    }

    #[tokio::test]
    async fn resolver_is_shared_across_reports() {
        let (mut classifier, handle) =
            classifier(vec![Ok(details("PROJ-5", Some("Data"), &[]))]);
        let r = report(vec![], vec![ReportIssue::new("PROJ-5", "Untagged", 1.0)], vec![], &[]);

        classifier.classify(&r).await;
        let rows = classifier.classify(&r).await;

        assert_eq!(rows[0].discipline, "Data");
        assert_eq!(handle.request_count(), 1);
        assert_eq!(classifier.resolver().remote_fetches(), 1);
    }

    #[tokio::test]
    async fn unmatched_sprint_name_is_kept() {
        let (mut classifier, _) = classifier(vec![]);
        let mut r = report(vec![ReportIssue::new("P-1", "[Web] x", 1.0)], vec![], vec![], &[]);
        r.sprint.name = "Random Sprint Name".to_string();

        assert_eq!(classifier.classify(&r).await[0].sprint, "Random Sprint Name");
    }

    #[test]
    fn hyperlink_sanitizes_title() {
        let endpoint = Url::parse("https://example.atlassian.net/").unwrap();
        assert_eq!(
            hyperlink_formula(&endpoint, "PROJ-1", "  Say \"hi\" to users \n"),
            "=HYPERLINK(\"https://example.atlassian.net/browse/PROJ-1\",\"Say 'hi' to users\")"
        );
    }

    fn arb_issues() -> impl Strategy<Value = Vec<(f64, f64, bool)>> {
        prop::collection::vec((0.0f64..20.0, 0.0f64..20.0, any::<bool>()), 0..5)
    }

    fn build_bucket(prefix: &str, specs: &[(f64, f64, bool)]) -> (Vec<ReportIssue>, Vec<String>) {
        let mut added = Vec::new();
        let issues = specs
            .iter()
            .enumerate()
            .map(|(i, (original, current, was_added))| {
                let key = format!("{prefix}-{i}");
                if *was_added {
                    added.push(key.clone());
                }
                ReportIssue::new(key, "[Web] generated", *original).with_current_estimate(*current)
            })
            .collect();
        (issues, added)
    }

    proptest! {
        #[test]
        fn row_invariants_hold(
            completed in arb_issues(),
            not_completed in arb_issues(),
            removed in arb_issues(),
        ) {
            let (c, mut added) = build_bucket("C", &completed);
            let (n, added_n) = build_bucket("N", &not_completed);
            let (r, added_r) = build_bucket("R", &removed);
            added.extend(added_n);
            added.extend(added_r);
            let added_refs: Vec<&str> = added.iter().map(String::as_str).collect();
            let report = report(c, n, r, &added_refs);
            let contents = &report.contents;
            let estimates: HashMap<String, (i64, i64)> = contents
                .completed_issues
                .iter()
                .chain(&contents.issues_not_completed_in_current_sprint)
                .chain(&contents.punted_issues)
                .map(|i| (i.key.clone(), (i.original_estimate(), i.current_estimate())))
                .collect();

            let (mut classifier, handle) = classifier(vec![]);
            let rows = block_on(classifier.classify(&report));

            prop_assert_eq!(rows.len(), completed.len() + not_completed.len() + removed.len());
            prop_assert_eq!(handle.request_count(), 0);

            for row in &rows {
                prop_assert_eq!(row.adjusted, row.commited - row.dropped + row.added);
                prop_assert!(row.commited == 0 || row.added == 0);
                let (original, current) = estimates[&row.ticket_number];
                let was_added = added.contains(&row.ticket_number);
                if was_added {
                    prop_assert_eq!(row.commited, 0);
                    prop_assert_eq!(row.added, original);
                } else {
                    prop_assert_eq!(row.commited, original);
                    prop_assert_eq!(row.added, 0);
                }

                match row.ticket_number.split('-').next() {
                    Some("C") => {
                        prop_assert_eq!(row.completed, original);
                        prop_assert_eq!(row.carried_over, 0);
                        prop_assert_eq!(row.dropped, 0);
                    }
                    Some("N") => {
                        prop_assert_eq!(row.carried_over, current);
                        prop_assert_eq!(row.completed, 0);
                        prop_assert_eq!(row.dropped, 0);
                    }
                    _ => {
                        prop_assert_eq!(row.dropped, original);
                        prop_assert_eq!(row.completed, 0);
                        prop_assert_eq!(row.carried_over, 0);
                    }
                }
            }
        }
    }
}
