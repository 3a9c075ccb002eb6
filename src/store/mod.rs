//! The storage collaborator consumed by the post services.
//!
//! Every call resolves to either data or an [`ApiError`](crate::errors::ApiError), never both.
//! [`DB`](crate::config::db::DB) is the SQLite-backed implementation.

use crate::errors::ApiResult;
use crate::model::comment::Comment;
use crate::model::post::{Post, PostFilter};
use crate::model::tag::Tag;
use crate::model::user::User;
use async_trait::async_trait;

pub mod sqlite;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn find_user(&self, username: &str) -> ApiResult<Option<User>>;

    async fn create_post(&self, title: &str, body: &str) -> ApiResult<Post>;

    /// Bulk lookup of the tags whose string equals any of `names`.
    async fn find_tags(&self, names: &[String]) -> ApiResult<Vec<Tag>>;

    async fn create_tag(&self, name: &str) -> ApiResult<Tag>;

    async fn add_post_tag(&self, post_id: i64, tag_id: i64) -> ApiResult<()>;

    async fn set_post_author(&self, post_id: i64, user_id: i64) -> ApiResult<()>;

    /// One page of posts that already have an author, newest first, restricted to posts
    /// carrying any of `filter.tags` when that list is not empty.
    async fn list_posts(&self, filter: &PostFilter) -> ApiResult<Vec<Post>>;

    async fn get_post_tags(&self, post_id: i64) -> ApiResult<Vec<Tag>>;

    async fn get_post_author(&self, post_id: i64) -> ApiResult<Option<User>>;

    async fn get_post_comments(&self, post_id: i64) -> ApiResult<Vec<Comment>>;
}
