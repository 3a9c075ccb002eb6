use crate::model::post::{Post, PostCreate, PostFilter, PostListQuery};
use crate::model::user::Session;
use crate::route::emit::Emitter;
use crate::service::post_service::PAGE_SIZE;
use crate::util::common::split_tag_list;
use crate::util::extractor::{Json, Path, Query};
use crate::AppState;
use axum::response::Response;
use axum::routing::get;
use axum::{extract::State, Extension, Router};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/post", get(get_posts).put(create_post))
        .route("/t/{*tags}", get(get_posts_by_tags))
}

async fn create_post(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
    Json(req): Json<PostCreate>,
) -> Response {
    let session = session.map(|Extension(session)| session);
    state.emitter.emit(Post::create(state.db.as_ref(), session.as_ref(), &req).await)
}

async fn get_posts(State(state): State<AppState>, Query(query): Query<PostListQuery>) -> Response {
    let filter = query.into_filter(PAGE_SIZE);
    state.emitter.emit(Post::list(state.db.as_ref(), &filter).await)
}

// `/t/news/tech` lists the first page of posts tagged `news` or `tech`.
async fn get_posts_by_tags(State(state): State<AppState>, Path(tags): Path<String>) -> Response {
    let filter = PostFilter {
        tags: split_tag_list(&tags),
        offset: 0,
        limit: PAGE_SIZE,
    };
    state.emitter.emit(Post::list(state.db.as_ref(), &filter).await)
}
