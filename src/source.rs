use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{Comment, Issue, User};
use crate::time_window::DateWindow;

/// 集計処理が依存する課題データの取得元
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// 課題の参照URLを組み立てるためのベースURL
    fn base_url(&self) -> &str;

    /// 指定ユーザーが担当し、期間内に作成された課題をchangelog付きで取得
    async fn search_issues_by_user(&self, user_id: &str, window: &DateWindow) -> Result<Vec<Issue>>;

    /// 課題のコメントをAPIの返却順で取得
    async fn list_comments(&self, issue_key: &str) -> Result<Vec<Comment>>;

    /// クエリ文字列に一致するユーザーを検索
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;

    /// メールアドレスをアカウントIDに解決
    ///
    /// 一致が0件または複数件の場合は設定・データの異常として扱う。
    async fn resolve_account_id(&self, email: &str) -> Result<String> {
        let mut users = self.search_users(email).await?;
        if users.len() != 1 {
            return Err(Error::AmbiguousIdentity {
                query: email.to_string(),
                matches: users.len(),
            });
        }
        Ok(users.remove(0).account_id)
    }

    /// 課題キーからブラウズ用リンクを作成
    fn browse_link(&self, issue_key: &str) -> String {
        format!("{}/browse/{}", self.base_url().trim_end_matches('/'), issue_key)
    }
}
