// Post filtering

use crate::models::Post;

/// Return the posts authored by `user_id`, preserving their relative order.
pub fn filter_by_user(posts: Vec<Post>, user_id: i64) -> Vec<Post> {
    posts.into_iter().filter(|p| p.user_id == user_id).collect()
}
