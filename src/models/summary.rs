use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Comment;

/// 日付キー（MM/DD/YYYY）ごとの課題サマリー一覧
pub type DailySummaries = HashMap<String, Vec<IssueSummary>>;

/// 要求されたユーザー識別子ごとの日別サマリー
pub type UserSummaries = HashMap<String, DailySummaries>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// (ユーザー, 日付, 課題キー) 単位で集約された活動
///
/// `last_*` は最後に追加された値であり、タイムスタンプの最大値ではない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub link: String,
    pub comments: Vec<Comment>,
    pub status_transitions: Vec<StatusTransition>,
    pub last_comment: Option<Comment>,
    pub last_status_transition: Option<StatusTransition>,
}

impl IssueSummary {
    pub fn new(key: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            link: link.into(),
            comments: Vec::new(),
            status_transitions: Vec::new(),
            last_comment: None,
            last_status_transition: None,
        }
    }

    pub fn push_status_transition(&mut self, transition: StatusTransition) {
        self.last_status_transition = Some(transition.clone());
        self.status_transitions.push(transition);
    }

    pub fn push_comment(&mut self, comment: Comment) {
        self.last_comment = Some(comment.clone());
        self.comments.push(comment);
    }
}
