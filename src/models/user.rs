use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "accountId")]
    #[serde(default)]
    pub account_id: String,
    #[serde(rename = "displayName")]
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "emailAddress")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl User {
    /// 指定された識別子（メールアドレスまたはアカウントID）がこのユーザーを指すか判定
    ///
    /// 正規化は行わず、両方のフィールドをそのまま比較する。
    pub fn matches(&self, identifier: &str) -> bool {
        self.email_address.as_deref() == Some(identifier) || self.account_id == identifier
    }
}
