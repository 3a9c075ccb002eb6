#[cfg(test)]
mod tests {
    use crate::tests::support::{session_for, MemoryStore};
    use agora::errors::ApiError;
    use agora::model::post::{Post, PostCreate, PostFilter};
    use agora::service::post_service::PAGE_SIZE;

    fn create_request(title: &str, body: &str, tags: &[&str]) -> PostCreate {
        PostCreate {
            title: title.to_string(),
            body: body.to_string(),
            tags: tags.iter().map(|t| Some(t.to_string())).collect(),
        }
    }

    fn page(offset: u32) -> PostFilter {
        PostFilter {
            tags: vec![],
            offset,
            limit: PAGE_SIZE,
        }
    }

    fn tagged(tags: &[&str]) -> PostFilter {
        PostFilter {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            offset: 0,
            limit: PAGE_SIZE,
        }
    }

    #[tokio::test]
    async fn test_create_with_existing_and_new_tag() {
        let store = MemoryStore::new();
        store.add_user("alice");
        let news = store.add_tag("news");
        let tags_before = store.tag_count();

        let session = session_for("alice");
        let req = create_request("Hello", "World", &["news", "tech"]);
        let record = Post::create(&store, Some(&session), &req).await.unwrap();

        assert_eq!(record.tags, vec!["news", "tech"]);
        assert_eq!(record.title, "Hello");
        assert_eq!(record.body, "World");
        assert_eq!(record.author.username, "alice");
        assert_eq!(record.num_comments, 0);
        assert!(record.create_date.ends_with(" GMT"));

        // exactly one new tag row, and it is "tech"
        assert_eq!(store.tag_count(), tags_before + 1);
        assert!(store.tag("tech").is_some());
        assert_eq!(store.tag("news"), Some(news));

        assert_eq!(store.post_tag_names(record.id), vec!["news", "tech"]);
        assert!(store.author_id_of(record.id).is_some());
    }

    #[tokio::test]
    async fn test_create_runs_steps_in_order() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let news = store.add_tag("news");

        let req = create_request("Hello", "World", &["tech", "news", "rust"]);
        let record = Post::create(&store, Some(&session_for("alice")), &req).await.unwrap();

        let tech = store.tag("tech").unwrap();
        let rust = store.tag("rust").unwrap();
        let id = record.id;

        // new tags are created and linked one by one before existing tags and the author are linked
        assert_eq!(
            store.calls(),
            vec![
                "find_user:alice".to_string(),
                "create_post:Hello".to_string(),
                "find_tags".to_string(),
                "create_tag:tech".to_string(),
                format!("add_post_tag:{}:{}", id, tech.id),
                "create_tag:rust".to_string(),
                format!("add_post_tag:{}:{}", id, rust.id),
                format!("add_post_tag:{}:{}", id, news.id),
                format!("set_post_author:{}:{}", id, alice.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_dedups_and_drops_empty_tags() {
        let store = MemoryStore::new();
        store.add_user("alice");

        let req = PostCreate {
            title: "Hello".to_string(),
            body: "World".to_string(),
            tags: vec![
                Some("rust".to_string()),
                None,
                Some("".to_string()),
                Some("Rust".to_string()),
                Some("rust".to_string()),
            ],
        };
        let record = Post::create(&store, Some(&session_for("alice")), &req).await.unwrap();

        assert_eq!(record.tags, vec!["rust", "Rust"]);
        assert_eq!(store.tag_count(), 2);
        assert_eq!(store.post_tag_names(record.id), vec!["Rust", "rust"]);
    }

    #[tokio::test]
    async fn test_create_without_tags() {
        let store = MemoryStore::new();
        store.add_user("alice");

        let req = create_request("Hello", "World", &[]);
        let record = Post::create(&store, Some(&session_for("alice")), &req).await.unwrap();

        assert!(record.tags.is_empty());
        assert_eq!(store.tag_count(), 0);
        assert!(store.author_id_of(record.id).is_some());
    }

    #[tokio::test]
    async fn test_create_validation_comes_first() {
        let store = MemoryStore::new();
        store.add_user("alice");
        let session = session_for("alice");

        for req in [
            create_request("", "World", &["news"]),
            create_request("Hello", "", &["news"]),
            PostCreate::default(),
        ] {
            let with_session = Post::create(&store, Some(&session), &req).await.unwrap_err();
            assert!(matches!(with_session, ApiError::ValidationError(_)));

            let without_session = Post::create(&store, None, &req).await.unwrap_err();
            assert!(matches!(without_session, ApiError::ValidationError(_)));
        }

        assert!(store.calls().is_empty());
        assert_eq!(store.post_count(), 0);
        assert_eq!(store.tag_count(), 0);
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let store = MemoryStore::new();
        store.add_user("alice");

        let req = create_request("Hello", "World", &["news"]);
        let err = Post::create(&store, None, &req).await.unwrap_err();

        assert!(matches!(err, ApiError::AuthRequired(_)));
        assert_eq!(err.code(), 401);
        assert!(store.calls().is_empty());
        assert_eq!(store.post_count(), 0);
        assert_eq!(store.tag_count(), 0);
    }

    #[tokio::test]
    async fn test_create_with_unknown_session_user() {
        let store = MemoryStore::new();

        let req = create_request("Hello", "World", &["news"]);
        let err = Post::create(&store, Some(&session_for("mallory")), &req).await.unwrap_err();

        assert!(matches!(err, ApiError::AuthRequired(_)));
        assert_eq!(store.post_count(), 0);
        assert_eq!(store.tag_count(), 0);
    }

    #[tokio::test]
    async fn test_tag_creation_failure_aborts_without_rollback() {
        let store = MemoryStore::new();
        store.add_user("alice");
        store.add_tag("news");
        store.fail_on("create_tag:rust");

        let req = create_request("Hello", "World", &["tech", "rust", "go", "news"]);
        let err = Post::create(&store, Some(&session_for("alice")), &req).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));

        let calls = store.calls();
        assert_eq!(calls.last().map(String::as_str), Some("create_tag:rust"));
        assert!(!calls.iter().any(|c| c == "create_tag:go"));
        assert!(!calls.iter().any(|c| c.starts_with("set_post_author")));

        // what was done before the failure stays in place
        assert_eq!(store.post_count(), 1);
        assert!(store.tag("tech").is_some());
        assert!(store.tag("go").is_none());
    }

    #[tokio::test]
    async fn test_association_batch_is_fail_fast() {
        let store = MemoryStore::new();
        store.add_user("alice");
        let news = store.add_tag("news");
        let rust = store.add_tag("rust");

        // post ids continue after the seeded user and tags
        let next_post_id = rust.id + 1;
        store.fail_on(&format!("add_post_tag:{}:{}", next_post_id, news.id));

        let req = create_request("Hello", "World", &["news", "rust"]);
        let err = Post::create(&store, Some(&session_for("alice")), &req).await.unwrap_err();
        assert_eq!(err.code(), 500);

        let calls = store.calls();
        assert!(!calls.iter().any(|c| *c == format!("add_post_tag:{}:{}", next_post_id, rust.id)));
        assert!(!calls.iter().any(|c| c.starts_with("set_post_author")));
        assert_eq!(store.author_id_of(next_post_id), None);
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let posts: Vec<Post> = (1..=7)
            .map(|i| store.add_post(&format!("post {}", i), Some(&alice), &[]))
            .collect();

        let first = Post::list(&store, &page(0)).await.unwrap();
        let second = Post::list(&store, &page(5)).await.unwrap();

        let first_ids: Vec<i64> = first.posts.iter().map(|p| p.id).collect();
        let second_ids: Vec<i64> = second.posts.iter().map(|p| p.id).collect();

        let newest: Vec<i64> = posts.iter().rev().map(|p| p.id).collect();
        assert_eq!(first_ids, newest[..5].to_vec());
        assert_eq!(second_ids, newest[5..].to_vec());
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

        let third = Post::list(&store, &page(10)).await.unwrap();
        assert!(third.posts.is_empty());
    }

    #[tokio::test]
    async fn test_list_enriches_each_post_sequentially() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        let older = store.add_post("older", Some(&alice), &["news"]);
        let newer = store.add_post("newer", Some(&bob), &["tech", "rust"]);
        store.add_comment(older.id);
        store.add_comment(older.id);

        let listed = Post::list(&store, &page(0)).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                "list_posts".to_string(),
                format!("get_post_tags:{}", newer.id),
                format!("get_post_author:{}", newer.id),
                format!("get_post_comments:{}", newer.id),
                format!("get_post_tags:{}", older.id),
                format!("get_post_author:{}", older.id),
                format!("get_post_comments:{}", older.id),
            ]
        );

        assert_eq!(listed.posts.len(), 2);
        assert_eq!(listed.posts[0].title, "newer");
        assert_eq!(listed.posts[0].author.username, "bob");
        assert_eq!(listed.posts[0].tags, vec!["tech", "rust"]);
        assert_eq!(listed.posts[0].num_comments, 0);
        assert_eq!(listed.posts[1].author.username, "alice");
        assert_eq!(listed.posts[1].num_comments, 2);
    }

    #[tokio::test]
    async fn test_list_counts_comments_live() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let post = store.add_post("post", Some(&alice), &[]);

        assert_eq!(Post::list(&store, &page(0)).await.unwrap().posts[0].num_comments, 0);

        store.add_comment(post.id);
        store.add_comment(post.id);
        store.add_comment(post.id);
        assert_eq!(Post::list(&store, &page(0)).await.unwrap().posts[0].num_comments, 3);
    }

    #[tokio::test]
    async fn test_list_filter_matches_any_tag() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let a = store.add_post("a", Some(&alice), &["news"]);
        store.add_post("b", Some(&alice), &["cats"]);
        let c = store.add_post("c", Some(&alice), &["tech", "news"]);

        let listed = Post::list(&store, &tagged(&["news", "tech"])).await.unwrap();
        let ids: Vec<i64> = listed.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
    }

    #[tokio::test]
    async fn test_list_filter_without_matches_is_empty() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        store.add_post("a", Some(&alice), &["news"]);

        let listed = Post::list(&store, &tagged(&["nothing"])).await.unwrap();
        assert!(listed.posts.is_empty());
        // an empty page needs no enrichment
        assert_eq!(store.calls(), vec!["list_posts".to_string()]);
    }

    #[tokio::test]
    async fn test_list_failure_aborts_whole_listing() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let first = store.add_post("first", Some(&alice), &[]);
        let second = store.add_post("second", Some(&alice), &[]);
        let third = store.add_post("third", Some(&alice), &[]);
        store.fail_on(&format!("get_post_author:{}", second.id));

        let err = Post::list(&store, &page(0)).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));

        let calls = store.calls();
        assert!(calls.contains(&format!("get_post_comments:{}", third.id)));
        assert_eq!(calls.last(), Some(&format!("get_post_author:{}", second.id)));
        assert!(!calls.iter().any(|c| c.ends_with(&format!(":{}", first.id))));
    }

    #[tokio::test]
    async fn test_list_fails_when_author_row_is_gone() {
        let store = MemoryStore::new();
        let ghost = store.add_user("ghost");
        store.add_post("orphan", Some(&ghost), &[]);
        store.remove_user(ghost.id);

        let err = Post::list(&store, &page(0)).await.unwrap_err();
        assert_eq!(err.code(), 500);
    }

    #[tokio::test]
    async fn test_list_skips_half_created_post() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let done = store.add_post("done", Some(&alice), &[]);

        // create fails after the post row exists, so it never gets an author
        store.fail_on("create_tag:fresh");
        let req = create_request("broken", "body", &["fresh"]);
        assert!(Post::create(&store, Some(&session_for("alice")), &req).await.is_err());
        assert_eq!(store.post_count(), 2);

        let listed = Post::list(&store, &page(0)).await.unwrap();
        let ids: Vec<i64> = listed.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![done.id]);
    }

    #[tokio::test]
    async fn test_created_post_is_listed() {
        let store = MemoryStore::new();
        store.add_user("alice");
        store.add_tag("news");

        let req = create_request("Hello", "World", &["news", "tech"]);
        let created = Post::create(&store, Some(&session_for("alice")), &req).await.unwrap();
        store.clear_calls();

        let listed = Post::list(&store, &tagged(&["tech"])).await.unwrap();
        assert_eq!(listed.posts.len(), 1);
        let record = &listed.posts[0];
        assert_eq!(record.id, created.id);
        assert_eq!(record.create_date, created.create_date);

        let mut tags = record.tags.clone();
        tags.sort();
        assert_eq!(tags, vec!["news", "tech"]);
    }
}
