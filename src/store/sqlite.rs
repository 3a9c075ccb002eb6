use crate::config::db::DB;
use crate::errors::ApiResult;
use crate::model::comment::Comment;
use crate::model::post::{Post, PostFilter};
use crate::model::tag::Tag;
use crate::model::user::User;
use crate::store::Storage;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, QueryBuilder, Sqlite};

#[async_trait]
impl Storage for DB {
    async fn find_user(&self, username: &str) -> ApiResult<Option<User>> {
        let user = query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_post(&self, title: &str, body: &str) -> ApiResult<Post> {
        let now = Utc::now().timestamp_millis();

        let id = query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (title, body, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(Post {
            id,
            title: title.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_tags(&self, names: &[String]) -> ApiResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, tag FROM tags WHERE tag IN (");
        let mut separated = builder.separated(", ");
        for name in names {
            separated.push_bind(name);
        }
        separated.push_unseparated(")");

        let tags = builder.build_query_as::<Tag>().fetch_all(&self.pool).await?;

        Ok(tags)
    }

    async fn create_tag(&self, name: &str) -> ApiResult<Tag> {
        let id = query_scalar::<_, i64>("INSERT INTO tags (tag) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(Tag {
            id,
            tag: name.to_string(),
        })
    }

    async fn add_post_tag(&self, post_id: i64, tag_id: i64) -> ApiResult<()> {
        query("INSERT INTO tag_post_assoc (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_post_author(&self, post_id: i64, user_id: i64) -> ApiResult<()> {
        query("UPDATE posts SET user_id = ? WHERE id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_posts(&self, filter: &PostFilter) -> ApiResult<Vec<Post>> {
        // Posts get their author last, so a row without one is a create still in flight or one
        // that failed halfway. Neither is listed.
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT p.id, p.title, p.body, p.created_at, p.updated_at FROM posts p WHERE p.user_id IS NOT NULL",
        );

        // A post carrying several of the requested tags must still appear once.
        if !filter.tags.is_empty() {
            builder.push(
                r#"
                AND EXISTS (
                    SELECT 1
                    FROM tag_post_assoc tp
                    JOIN tags t ON t.id = tp.tag_id
                    WHERE tp.post_id = p.id AND t.tag IN ("#,
            );
            let mut separated = builder.separated(", ");
            for tag in &filter.tags {
                separated.push_bind(tag);
            }
            separated.push_unseparated("))");
        }

        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(filter.limit as i64)
            .push(" OFFSET ")
            .push_bind(filter.offset as i64);

        let posts = builder.build_query_as::<Post>().fetch_all(&self.pool).await?;

        Ok(posts)
    }

    async fn get_post_tags(&self, post_id: i64) -> ApiResult<Vec<Tag>> {
        let tags = query_as::<_, Tag>(
            r#"
            SELECT t.id, t.tag
            FROM tags t
            JOIN tag_post_assoc tp ON tp.tag_id = t.id
            WHERE tp.post_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn get_post_author(&self, post_id: i64) -> ApiResult<Option<User>> {
        let user = query_as::<_, User>(
            r#"
            SELECT u.*
            FROM users u
            JOIN posts p ON p.user_id = u.id
            WHERE p.id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_post_comments(&self, post_id: i64) -> ApiResult<Vec<Comment>> {
        let comments = query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = ? ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
