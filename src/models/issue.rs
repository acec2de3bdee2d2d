use serde::{Deserialize, Serialize};

use super::User;

/// 課題ステータスの変更を表すchangelogフィールド名
pub const STATUS_FIELD: &str = "status";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(rename = "self")]
    #[serde(default)]
    pub self_url: String,
    #[serde(default)]
    pub fields: IssueFields,
    #[serde(default)]
    pub changelog: Changelog,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Changelog {
    #[serde(default)]
    pub histories: Vec<History>,
}

/// changelogの1エントリ。タイムスタンプは固定オフセット形式の文字列のまま保持する
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub created: String,
    #[serde(default)]
    pub author: User,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub field: String,
    #[serde(rename = "fieldtype")]
    #[serde(default)]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(rename = "fromString")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(rename = "toString")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_string: Option<String>,
}

impl HistoryItem {
    pub fn is_status_change(&self) -> bool {
        self.field == STATUS_FIELD
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueSearchResponse {
    #[serde(default)]
    pub issues: Vec<Issue>,
}
