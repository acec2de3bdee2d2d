//! 集計結果の出力（Slack向けテキスト / JSON）

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::models::{Comment, IssueSummary, UserSummaries};
use crate::time_window::{day_of_week, parse_day_key};

static JIRA_SMART_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]|]*)\|[^\[\]]*\]").expect("valid smart link regex"));
static JIRA_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!image-[^!]+!").expect("valid image regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Slack,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_end_matches(".tmpl").to_lowercase().as_str() {
            "slack" => Ok(Self::Slack),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidInput(format!("unknown output template: {}", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slack => write!(f, "slack"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// `[url|text]` 形式のスマートリンクを `[url](url)` に置き換える
pub fn clean_jira_links(s: &str) -> String {
    JIRA_SMART_LINK.replace_all(s, "[$1]($1)").into_owned()
}

/// 埋め込み画像をプレースホルダーに置き換える
pub fn clean_jira_images(s: &str) -> String {
    JIRA_IMAGE
        .replace_all(s, "(see image in Jira issue)")
        .into_owned()
}

/// 前後の空白を除いた空でない行の一覧
pub fn to_lines(s: &str) -> Vec<&str> {
    s.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

fn sorted_days(daily: &BTreeMap<String, Vec<IssueSummary>>) -> Result<Vec<(&String, &Vec<IssueSummary>)>> {
    let mut days = daily
        .iter()
        .map(|(day, summaries)| -> Result<_> { Ok((parse_day_key(day)?, (day, summaries))) })
        .collect::<Result<Vec<_>>>()?;
    days.sort_by_key(|(date, _)| *date);
    Ok(days.into_iter().map(|(_, entry)| entry).collect())
}

/// ユーザー・日付・課題キーの順に並べた出力用の構造
fn ordered(summaries: &UserSummaries) -> BTreeMap<String, BTreeMap<String, Vec<IssueSummary>>> {
    summaries
        .iter()
        .map(|(user, daily)| {
            let days = daily
                .iter()
                .map(|(day, issues)| {
                    let mut issues = issues.clone();
                    issues.sort_by(|a, b| a.key.cmp(&b.key));
                    (day.clone(), issues)
                })
                .collect();
            (user.clone(), days)
        })
        .collect()
}

fn write_comment<W: Write>(writer: &mut W, comment: &Comment) -> Result<()> {
    let body = clean_jira_images(&clean_jira_links(&comment.body));
    let mut lines = to_lines(&body).into_iter();
    if let Some(first) = lines.next() {
        writeln!(writer, "    ◦ 💬 {}", first)?;
    }
    for line in lines {
        writeln!(writer, "       {}", line)?;
    }
    Ok(())
}

fn render_slack<W: Write>(writer: &mut W, summaries: &UserSummaries) -> Result<()> {
    for (user, daily) in ordered(summaries) {
        writeln!(writer, "*{}*", user)?;
        if daily.is_empty() {
            writeln!(writer, "_No activity_")?;
        }

        for (day, issues) in sorted_days(&daily)? {
            writeln!(writer, "*{} {}*", day_of_week(day)?, day)?;
            for issue in issues {
                writeln!(writer, "• <{}|{}>", issue.link, issue.key)?;
                for transition in &issue.status_transitions {
                    writeln!(writer, "    ◦ {} → {}", transition.from, transition.to)?;
                }
                for comment in &issue.comments {
                    write_comment(writer, comment)?;
                }
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// 集計結果を指定フォーマットで書き出す
pub fn render<W: Write>(writer: &mut W, format: OutputFormat, summaries: &UserSummaries) -> Result<()> {
    match format {
        OutputFormat::Slack => render_slack(writer, summaries),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &ordered(summaries))?;
            writeln!(writer)?;
            Ok(())
        }
    }
}
