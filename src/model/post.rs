use crate::model::tag::Tag;
use crate::model::user::{Author, User};
use crate::util::common::{millis_to_utc_string, split_tag_list};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// which Rust types correspond to which sqlite column types:
// https://docs.rs/sqlx/latest/sqlx/sqlite/types/index.html
#[derive(Debug, Serialize, FromRow, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// The denormalized shape a post is served in: the post joined to its tags, author and
/// comment count.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PostRecord {
    pub tags: Vec<String>,
    pub title: String,
    pub author: Author,
    pub body: String,
    pub id: i64,
    pub create_date: String,
    pub update_date: String,
    pub num_comments: usize,
}

impl PostRecord {
    pub fn new(post: &Post, tags: Vec<String>, author: &User, num_comments: usize) -> Self {
        Self {
            tags,
            title: post.title.clone(),
            author: Author::from(author),
            body: post.body.clone(),
            id: post.id,
            create_date: millis_to_utc_string(post.created_at),
            update_date: millis_to_utc_string(post.updated_at),
            num_comments,
        }
    }
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct PostCreate {
    // Missing fields deserialize to "" so they are reported by validation, not by the extractor.
    #[serde(default)]
    #[validate(length(min = 1, message = "can not be empty"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "can not be empty"))]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<Option<String>>,
}

impl PostCreate {
    /// Requested tags with null and empty entries dropped and duplicates removed,
    /// keeping the first occurrence. Comparison is case-sensitive.
    pub fn requested_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().flatten() {
            if !tag.is_empty() && !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PostListQuery {
    pub tag_list: Option<String>,
    pub offset: u32,
}

impl PostListQuery {
    pub fn into_filter(self, limit: u32) -> PostFilter {
        PostFilter {
            tags: self.tag_list.as_deref().map(split_tag_list).unwrap_or_default(),
            offset: self.offset,
            limit,
        }
    }
}

/// What the store is asked for when listing: one page, optionally restricted to posts
/// carrying any of `tags`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub tags: Vec<String>,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PostPage {
    pub posts: Vec<PostRecord>,
}

/// Tags resolved for a new post: the ones created for it and the ones that already existed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResolvedTags {
    pub created: Vec<Tag>,
    pub matched: Vec<Tag>,
}

impl ResolvedTags {
    pub fn all(&self) -> impl Iterator<Item = &Tag> {
        self.created.iter().chain(self.matched.iter())
    }
}
