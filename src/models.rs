// Domain model for the upstream post feed

use serde::{Deserialize, Serialize};

/// A single post record from the upstream feed.
///
/// `id` is assigned by the source and treated as opaque; posts are never
/// mutated after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub title: String,
    pub body: String,
}
