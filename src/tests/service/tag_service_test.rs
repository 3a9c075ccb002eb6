#[cfg(test)]
mod tests {
    use crate::tests::support::MemoryStore;
    use agora::model::tag::Tag;
    use agora::store::Storage;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_creates_only_missing_tags() {
        let store = MemoryStore::new();
        let news = store.add_tag("news");
        let post = store.create_post("Hello", "World").await.unwrap();
        store.clear_calls();

        let resolved = Tag::resolve(&store, post.id, &names(&["news", "tech"])).await.unwrap();

        assert_eq!(resolved.matched, vec![news]);
        assert_eq!(resolved.created.len(), 1);
        assert_eq!(resolved.created[0].tag, "tech");
        assert_eq!(resolved.all().count(), 2);

        // the new tag is linked right away, the existing one is left to the caller
        assert_eq!(store.post_tag_names(post.id), vec!["tech"]);
    }

    #[tokio::test]
    async fn test_resolve_links_each_new_tag_before_the_next() {
        let store = MemoryStore::new();
        let post = store.create_post("Hello", "World").await.unwrap();
        store.clear_calls();

        let resolved = Tag::resolve(&store, post.id, &names(&["a", "b"])).await.unwrap();
        let (a, b) = (&resolved.created[0], &resolved.created[1]);

        assert_eq!(
            store.calls(),
            vec![
                "find_tags".to_string(),
                "create_tag:a".to_string(),
                format!("add_post_tag:{}:{}", post.id, a.id),
                "create_tag:b".to_string(),
                format!("add_post_tag:{}:{}", post.id, b.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_link_failure_stops_creation() {
        let store = MemoryStore::new();
        let post = store.create_post("Hello", "World").await.unwrap();
        // ids: post, then "a"
        store.fail_on(&format!("add_post_tag:{}:{}", post.id, post.id + 1));

        let rv = Tag::resolve(&store, post.id, &names(&["a", "b"])).await;

        assert!(rv.is_err());
        assert!(store.tag("a").is_some());
        assert!(store.tag("b").is_none());
    }

    #[tokio::test]
    async fn test_resolve_all_existing() {
        let store = MemoryStore::new();
        store.add_tag("news");
        store.add_tag("tech");
        let post = store.create_post("Hello", "World").await.unwrap();
        store.clear_calls();

        let resolved = Tag::resolve(&store, post.id, &names(&["tech", "news"])).await.unwrap();

        assert!(resolved.created.is_empty());
        let matched: Vec<&str> = resolved.matched.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(matched, vec!["tech", "news"]);
        assert_eq!(store.calls(), vec!["find_tags".to_string()]);
    }
}
