use crate::errors::{auth_required, storage_error, ApiResult};
use crate::model::post::{Post, PostCreate, PostFilter, PostPage, PostRecord};
use crate::model::tag::Tag;
use crate::model::user::{Session, User};
use crate::service::pipeline::{run_serially, SerialBatch};
use crate::store::Storage;
use tracing::{debug, info};
use validator::Validate;

/// Listing page size.
pub const PAGE_SIZE: u32 = 5;

impl Post {
    /// Creates a post for the session's user and links it to the requested tags.
    ///
    /// Validation and the session check happen before anything is written, so those failures
    /// leave no rows behind. Past that point there is no transaction: a failure while resolving
    /// tags or writing associations keeps whatever was already written.
    pub async fn create<S>(store: &S, session: Option<&Session>, req: &PostCreate) -> ApiResult<PostRecord>
    where
        S: Storage + ?Sized,
    {
        req.validate()?;

        let session = session.ok_or_else(|| auth_required("Must log in to post."))?;
        let user = store
            .find_user(&session.username)
            .await?
            .ok_or_else(|| auth_required("Must log in to post."))?;

        let tags = req.requested_tags();
        let post = store.create_post(&req.title, &req.body).await?;

        let resolved = Tag::resolve(store, post.id, &tags).await?;
        Post::write_associations(store, &post, &resolved.matched, &user).await?;

        info!(
            "{} created post {} with {} tag(s), {} new",
            user.username,
            post.id,
            resolved.all().count(),
            resolved.created.len()
        );

        Ok(PostRecord::new(&post, tags, &user, 0))
    }

    /// Links the already existing tags and the author to `post` as one fail-fast batch.
    async fn write_associations<S>(store: &S, post: &Post, matched: &[Tag], author: &User) -> ApiResult<()>
    where
        S: Storage + ?Sized,
    {
        let mut batch = SerialBatch::new();
        for tag in matched {
            batch.add(store.add_post_tag(post.id, tag.id));
        }
        batch.add(store.set_post_author(post.id, author.id));

        debug!("post {}: {} association write(s)", post.id, batch.len());
        batch.run().await
    }

    /// Lists one page of posts, each joined to its tags, author and live comment count.
    ///
    /// Posts are enriched one after another, so the output keeps the store's order.
    /// If any post fails, the whole listing fails.
    pub async fn list<S>(store: &S, filter: &PostFilter) -> ApiResult<PostPage>
    where
        S: Storage + ?Sized,
    {
        let posts = store.list_posts(filter).await?;
        if posts.is_empty() {
            return Ok(PostPage { posts: vec![] });
        }

        let capacity = posts.len();
        let posts = run_serially(posts, Vec::with_capacity(capacity), move |mut records, post| async move {
            records.push(Post::aggregate(store, post).await?);
            Ok(records)
        })
        .await?;

        Ok(PostPage { posts })
    }

    async fn aggregate<S>(store: &S, post: Post) -> ApiResult<PostRecord>
    where
        S: Storage + ?Sized,
    {
        let mut state = Aggregation::PendingTags(post);
        loop {
            state = match state {
                Aggregation::Done(record) => return Ok(record),
                pending => pending.advance(store).await?,
            };
        }
    }
}

/// Where a single post is in its enrichment. An error from [`Aggregation::advance`] is the
/// failed state: it ends the post and the listing it belongs to.
#[derive(Debug)]
enum Aggregation {
    PendingTags(Post),
    PendingAuthor { post: Post, tags: Vec<String> },
    PendingComments { post: Post, tags: Vec<String>, author: User },
    Done(PostRecord),
}

impl Aggregation {
    async fn advance<S>(self, store: &S) -> ApiResult<Self>
    where
        S: Storage + ?Sized,
    {
        match self {
            Aggregation::PendingTags(post) => {
                let tags = store
                    .get_post_tags(post.id)
                    .await?
                    .into_iter()
                    .map(|t| t.tag)
                    .collect();
                Ok(Aggregation::PendingAuthor { post, tags })
            }
            Aggregation::PendingAuthor { post, tags } => {
                let author = store
                    .get_post_author(post.id)
                    .await?
                    .ok_or_else(|| storage_error(&format!("post {} has no author", post.id)))?;
                Ok(Aggregation::PendingComments { post, tags, author })
            }
            Aggregation::PendingComments { post, tags, author } => {
                let comments = store.get_post_comments(post.id).await?;
                debug!("post {}: {} comment(s)", post.id, comments.len());
                Ok(Aggregation::Done(PostRecord::new(&post, tags, &author, comments.len())))
            }
            done @ Aggregation::Done(_) => Ok(done),
        }
    }
}
