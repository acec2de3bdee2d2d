//! 課題1件分のchangelogとコメントから、期間内かつ指定ユーザーによるイベントを抽出する。
//!
//! I/Oは行わない。タイムスタンプのパースに失敗した時点で処理全体を中断する。

use crate::error::Result;
use crate::models::{Comment, Issue, StatusTransition};
use crate::time_window::{DateWindow, parse_jira_timestamp};

/// 期間内に指定ユーザーが行ったステータス遷移を抽出
pub fn filter_status_transitions(
    issue: &Issue,
    window: &DateWindow,
    user_id: &str,
) -> Result<Vec<StatusTransition>> {
    let mut transitions = Vec::new();

    for history in &issue.changelog.histories {
        let timestamp = parse_jira_timestamp(&history.created)?;
        if !window.contains(&timestamp) || !history.author.matches(user_id) {
            continue;
        }

        for item in history.items.iter().filter(|item| item.is_status_change()) {
            transitions.push(StatusTransition {
                from: item.from_string.clone().unwrap_or_default(),
                to: item.to_string.clone().unwrap_or_default(),
                timestamp,
            });
        }
    }

    Ok(transitions)
}

/// 期間内に指定ユーザーが書いたコメントを抽出（入力順を保持）
pub fn filter_comments(
    comments: &[Comment],
    window: &DateWindow,
    user_id: &str,
) -> Result<Vec<Comment>> {
    let mut matched = Vec::new();

    for comment in comments {
        let created = parse_jira_timestamp(&comment.created)?;
        if window.contains(&created) && comment.author.matches(user_id) {
            matched.push(comment.clone());
        }
    }

    Ok(matched)
}
