use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::aggregator::UserAggregator;
use crate::error::{Error, Result};
use crate::models::{DailySummaries, UserSummaries};
use crate::source::IssueSource;
use crate::time_window::DateWindow;

/// 同時に処理するユーザー数の既定値
pub const DEFAULT_MAX_PARALLEL: usize = 5;

/// 複数ユーザー集計の設定
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// 同時に処理するユーザー数の上限
    pub max_parallel: usize,
}

impl SummarizerConfig {
    pub fn new() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }

    /// 並行処理数を設定（0は1として扱う）
    pub fn max_parallel(mut self, count: usize) -> Self {
        self.max_parallel = count.max(1);
        self
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 複数ユーザーの集計を並行に実行し、ユーザーごとの結果にまとめる
pub struct Coordinator<S: ?Sized> {
    aggregator: UserAggregator<S>,
    config: SummarizerConfig,
}

impl<S: IssueSource + ?Sized + 'static> Coordinator<S> {
    pub fn new(source: Arc<S>, config: SummarizerConfig) -> Self {
        Self {
            aggregator: UserAggregator::new(source),
            config,
        }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// 要求された全ユーザーの日別サマリーを取得
    ///
    /// 結果は要求された識別子（解決前のメールアドレスを含む）をキーにする。
    /// いずれかのユーザーが失敗した時点で残りのタスクを中断し、そのエラーを返す。
    /// 返り値のFutureをdropすると実行中のタスクもすべて中断される。
    pub async fn aggregate_for_users(
        &self,
        window: &DateWindow,
        users: &[String],
    ) -> Result<UserSummaries> {
        let permits = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut tasks = JoinSet::new();
        let mut requested = HashSet::new();

        for user in users {
            if !requested.insert(user.as_str()) {
                continue;
            }

            let aggregator = self.aggregator.clone();
            let permits = Arc::clone(&permits);
            let window = *window;
            let user = user.clone();

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::TaskFailed(e.to_string()))?;
                let daily = aggregate_requested_user(&aggregator, &window, &user).await?;
                Ok::<_, Error>((user, daily))
            });
        }

        let mut summaries = UserSummaries::with_capacity(requested.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| Error::TaskFailed(e.to_string()))
                .and_then(|result| result);

            match outcome {
                Ok((user, daily)) => {
                    summaries.insert(user, daily);
                }
                Err(err) => {
                    warn!(error = %err, "user aggregation failed, cancelling remaining users");
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        Ok(summaries)
    }
}

/// メールアドレス形式ならアカウントIDに解決してから集計する
async fn aggregate_requested_user<S: IssueSource + ?Sized>(
    aggregator: &UserAggregator<S>,
    window: &DateWindow,
    requested: &str,
) -> Result<DailySummaries> {
    let user_id = if requested.contains('@') {
        let account_id = aggregator.source().resolve_account_id(requested).await?;
        debug!(requested, account_id = %account_id, "resolved email to account id");
        account_id
    } else {
        requested.to_string()
    };

    aggregator.aggregate_for_user(window, &user_id).await
}
