use crate::errors::ApiResult;
use crate::model::post::ResolvedTags;
use crate::model::tag::Tag;
use crate::service::pipeline::run_serially;
use crate::store::Storage;
use tracing::debug;

impl Tag {
    /// Resolves the requested tag strings for a freshly created post.
    ///
    /// Tags that do not exist yet are created one at a time, and each is linked to the post
    /// right after its creation, before the next one is touched. Tags that already exist are
    /// returned in `matched` and left for the caller to link. A failure stops the whole
    /// resolution; whatever was created or linked before it stays in place.
    pub async fn resolve<S>(store: &S, post_id: i64, requested: &[String]) -> ApiResult<ResolvedTags>
    where
        S: Storage + ?Sized,
    {
        let existing = store.find_tags(requested).await?;
        let (matched, unmatched) = partition_tags(requested, existing);

        debug!(
            "post {}: {} existing tag(s), {} to create",
            post_id,
            matched.len(),
            unmatched.len()
        );

        let created = run_serially(unmatched, Vec::new(), move |mut created, name| async move {
            let tag = store.create_tag(&name).await?;
            store.add_post_tag(post_id, tag.id).await?;
            created.push(tag);
            Ok(created)
        })
        .await?;

        Ok(ResolvedTags { created, matched })
    }
}

/// Splits `requested` into the tags found in `existing` (in request order) and the names that
/// still need a row. Matching is an exact, case-sensitive comparison of the tag string.
pub fn partition_tags(requested: &[String], existing: Vec<Tag>) -> (Vec<Tag>, Vec<String>) {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for name in requested {
        match existing.iter().find(|t| &t.tag == name) {
            Some(tag) => matched.push(tag.clone()),
            None => unmatched.push(name.clone()),
        }
    }

    (matched, unmatched)
}
