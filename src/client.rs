use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, header};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::models::comment::CommentPage;
use crate::models::issue::IssueSearchResponse;
use crate::models::{Comment, Issue, User};
use crate::source::IssueSource;
use crate::time_window::DateWindow;

/// 1リクエストあたりのタイムアウト
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub enum Auth {
    Basic { username: String, api_token: String },
    Bearer { token: String },
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub auth: Auth,
    pub timeout: Duration,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        // Validate URL
        let _ = Url::parse(&base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url,
            auth,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct JiraClient {
    pub(crate) client: Client,
    pub(crate) config: Arc<JiraConfig>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let auth_value = match &config.auth {
            Auth::Basic { username, api_token } => {
                let credentials = format!("{}:{}", username, api_token);
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
                format!("Basic {}", encoded)
            }
            Auth::Bearer { token } => format!("Bearer {}", token),
        };
        let mut auth_header = header::HeaderValue::from_str(&auth_value)
            .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub(crate) async fn get<T>(&self, endpoint: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::ApiError { status, message });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// 担当者と作成日で課題を絞り込むJQL
pub fn assigned_issues_jql(user_id: &str, window: &DateWindow) -> String {
    format!(
        "assignee = {} AND createdDate >= \"{}\" AND createdDate <= \"{}\"",
        user_id,
        window.jql_start(),
        window.jql_end()
    )
}

#[async_trait]
impl IssueSource for JiraClient {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn search_issues_by_user(&self, user_id: &str, window: &DateWindow) -> Result<Vec<Issue>> {
        let jql = assigned_issues_jql(user_id, window);
        let endpoint = format!(
            "/rest/api/2/search?jql={}&expand=changelog",
            urlencoding::encode(&jql)
        );

        let response: IssueSearchResponse = self.get(&endpoint).await?;
        debug!(user_id, count = response.issues.len(), "fetched assigned issues");
        Ok(response.issues)
    }

    async fn list_comments(&self, issue_key: &str) -> Result<Vec<Comment>> {
        let endpoint = format!("/rest/api/2/issue/{}/comment", urlencoding::encode(issue_key));

        let page: CommentPage = self.get(&endpoint).await?;
        Ok(page.comments)
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let endpoint = format!("/rest/api/3/user/search?query={}", urlencoding::encode(query));

        self.get(&endpoint).await
    }
}
