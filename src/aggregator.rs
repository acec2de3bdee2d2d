use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::filter::{filter_comments, filter_status_transitions};
use crate::models::{DailySummaries, IssueSummary};
use crate::source::IssueSource;
use crate::time_window::{DateWindow, day_key, parse_jira_timestamp};

/// 日付キー → 課題キー → サマリー
///
/// 同じ (日付, 課題) の組は常に1つのサマリーにまとめられる。
#[derive(Debug, Default)]
struct DayBuckets {
    days: HashMap<String, HashMap<String, IssueSummary>>,
}

impl DayBuckets {
    fn summary_mut(
        &mut self,
        day: String,
        issue_key: &str,
        link: impl FnOnce() -> String,
    ) -> &mut IssueSummary {
        self.days
            .entry(day)
            .or_default()
            .entry(issue_key.to_string())
            .or_insert_with(|| IssueSummary::new(issue_key, link()))
    }

    fn into_daily(self) -> DailySummaries {
        self.days
            .into_iter()
            .map(|(day, by_key)| (day, by_key.into_values().collect()))
            .collect()
    }
}

/// 1ユーザー分の活動を日別に集計する
pub struct UserAggregator<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for UserAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: IssueSource + ?Sized> UserAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// 期間内のステータス遷移とコメントを日付ごとに集計
    ///
    /// 課題1件でもコメント取得やタイムスタンプのパースに失敗した場合、
    /// そのユーザーの集計全体を失敗とする。
    pub async fn aggregate_for_user(
        &self,
        window: &DateWindow,
        user_id: &str,
    ) -> Result<DailySummaries> {
        if user_id.is_empty() {
            return Err(Error::EmptyUser);
        }

        let issues = self.source.search_issues_by_user(user_id, window).await?;
        let mut buckets = DayBuckets::default();

        for issue in &issues {
            let all_comments = self.source.list_comments(&issue.key).await?;
            let comments = filter_comments(&all_comments, window, user_id)?;
            let transitions = filter_status_transitions(issue, window, user_id)?;
            debug!(
                issue = %issue.key,
                transitions = transitions.len(),
                comments = comments.len(),
                "filtered issue events"
            );

            for transition in transitions {
                let day = day_key(&transition.timestamp);
                buckets
                    .summary_mut(day, &issue.key, || self.source.browse_link(&issue.key))
                    .push_status_transition(transition);
            }

            for comment in comments {
                let created = parse_jira_timestamp(&comment.created)?;
                buckets
                    .summary_mut(day_key(&created), &issue.key, || {
                        self.source.browse_link(&issue.key)
                    })
                    .push_comment(comment);
            }
        }

        let daily = buckets.into_daily();
        info!(
            user_id,
            issues = issues.len(),
            days = daily.len(),
            "aggregated user activity"
        );
        Ok(daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Changelog, Comment, History, HistoryItem, Issue, IssueFields, User};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        issues: Vec<Issue>,
        comments: HashMap<String, Vec<Comment>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IssueSource for StubSource {
        fn base_url(&self) -> &str {
            "https://jira.example.com"
        }

        async fn search_issues_by_user(&self, _user_id: &str, _window: &DateWindow) -> Result<Vec<Issue>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.issues.clone())
        }

        async fn list_comments(&self, issue_key: &str) -> Result<Vec<Comment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.comments.get(issue_key) {
                Some(comments) => Ok(comments.clone()),
                None => Err(Error::ApiError {
                    status: 404,
                    message: format!("no comments for {}", issue_key),
                }),
            }
        }

        async fn search_users(&self, _query: &str) -> Result<Vec<User>> {
            Ok(Vec::new())
        }
    }

    fn alice() -> User {
        User {
            account_id: "acc-123".to_string(),
            display_name: "Alice".to_string(),
            email_address: Some("alice@example.com".to_string()),
            active: Some(true),
        }
    }

    fn status_history(created: &str, from: &str, to: &str) -> History {
        History {
            created: created.to_string(),
            author: alice(),
            items: vec![HistoryItem {
                field: "status".to_string(),
                field_type: "jira".to_string(),
                from: None,
                from_string: Some(from.to_string()),
                to: None,
                to_string: Some(to.to_string()),
            }],
        }
    }

    fn issue(key: &str, histories: Vec<History>) -> Issue {
        Issue {
            key: key.to_string(),
            self_url: String::new(),
            fields: IssueFields::default(),
            changelog: Changelog { histories },
        }
    }

    fn comment(created: &str, body: &str) -> Comment {
        Comment {
            body: body.to_string(),
            created: created.to_string(),
            author: alice(),
        }
    }

    fn aggregator(issues: Vec<Issue>, comments: Vec<(&str, Vec<Comment>)>) -> UserAggregator<StubSource> {
        UserAggregator::new(Arc::new(StubSource {
            issues,
            comments: comments
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            calls: AtomicUsize::new(0),
        }))
    }

    fn window() -> DateWindow {
        DateWindow::from_input_dates("03/01/2024", "03/07/2024").unwrap()
    }

    #[tokio::test]
    async fn test_empty_user_fails_before_network() {
        let aggregator = aggregator(vec![], vec![]);

        let result = aggregator.aggregate_for_user(&window(), "").await;

        assert!(matches!(result, Err(Error::EmptyUser)));
        assert_eq!(aggregator.source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transition_and_comment_on_same_day_share_summary() {
        // Given: 同じ日のステータス遷移とコメント
        let aggregator = aggregator(
            vec![issue(
                "PROJ-1",
                vec![status_history("2024-03-02T10:00:00.000+0000", "To-Do", "In Progress")],
            )],
            vec![("PROJ-1", vec![comment("2024-03-02T11:00:00.000+0000", "started")])],
        );

        // When: 集計
        let daily = aggregator.aggregate_for_user(&window(), "acc-123").await.unwrap();

        // Then: 1日・1サマリーにまとまる
        assert_eq!(daily.len(), 1);
        let summaries = &daily["03/02/2024"];
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[0];
        assert_eq!(summary.key, "PROJ-1");
        assert_eq!(summary.link, "https://jira.example.com/browse/PROJ-1");
        assert_eq!(summary.status_transitions.len(), 1);
        assert_eq!(summary.comments.len(), 1);
        assert_eq!(summary.last_comment.as_ref().unwrap().body, "started");
        assert_eq!(summary.last_status_transition.as_ref().unwrap().to, "In Progress");
    }

    #[tokio::test]
    async fn test_events_bucket_by_their_own_day() {
        let aggregator = aggregator(
            vec![issue(
                "PROJ-1",
                vec![
                    status_history("2024-03-02T10:00:00.000+0000", "To-Do", "In Progress"),
                    status_history("2024-03-04T10:00:00.000+0000", "In Progress", "Done"),
                ],
            )],
            vec![("PROJ-1", vec![comment("2024-03-03T23:59:59.999-0000", "late night")])],
        );

        let daily = aggregator.aggregate_for_user(&window(), "acc-123").await.unwrap();

        let mut days: Vec<_> = daily.keys().cloned().collect();
        days.sort();
        assert_eq!(days, vec!["03/02/2024", "03/03/2024", "03/04/2024"]);
        assert_eq!(daily["03/03/2024"][0].comments.len(), 1);
        assert!(daily["03/03/2024"][0].status_transitions.is_empty());
        assert!(daily["03/03/2024"][0].last_status_transition.is_none());
    }

    #[tokio::test]
    async fn test_multiple_issues_same_day_are_separate_summaries() {
        let aggregator = aggregator(
            vec![
                issue("PROJ-1", vec![status_history("2024-03-02T10:00:00.000+0000", "A", "B")]),
                issue("PROJ-2", vec![status_history("2024-03-02T12:00:00.000+0000", "A", "B")]),
            ],
            vec![("PROJ-1", vec![]), ("PROJ-2", vec![])],
        );

        let daily = aggregator.aggregate_for_user(&window(), "acc-123").await.unwrap();

        let mut keys: Vec<_> = daily["03/02/2024"].iter().map(|s| s.key.clone()).collect();
        keys.sort();
        assert_eq!(keys, vec!["PROJ-1", "PROJ-2"]);
    }

    #[tokio::test]
    async fn test_issue_without_matching_events_is_omitted() {
        let aggregator = aggregator(
            vec![issue("PROJ-1", vec![status_history("2024-04-02T10:00:00.000+0000", "A", "B")])],
            vec![("PROJ-1", vec![])],
        );

        let daily = aggregator.aggregate_for_user(&window(), "acc-123").await.unwrap();

        assert!(daily.is_empty());
    }

    #[tokio::test]
    async fn test_comment_fetch_failure_aborts_user() {
        // Given: 2件目の課題のコメント取得が失敗する
        let aggregator = aggregator(
            vec![
                issue("PROJ-1", vec![status_history("2024-03-02T10:00:00.000+0000", "A", "B")]),
                issue("PROJ-2", vec![]),
            ],
            vec![("PROJ-1", vec![])],
        );

        // When: 集計
        let result = aggregator.aggregate_for_user(&window(), "acc-123").await;

        // Then: 部分結果ではなくエラーになる
        assert!(matches!(result, Err(Error::ApiError { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_bad_timestamp_aborts_user() {
        let aggregator = aggregator(
            vec![issue("PROJ-1", vec![status_history("03/02/2024", "A", "B")])],
            vec![("PROJ-1", vec![])],
        );

        let result = aggregator.aggregate_for_user(&window(), "acc-123").await;

        assert!(matches!(result, Err(Error::TimestampParse { .. })));
    }
}
