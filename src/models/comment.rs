use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: String,
    pub created: String,
    #[serde(default)]
    pub author: User,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
}
