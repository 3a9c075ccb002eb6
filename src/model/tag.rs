use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub tag: String,
}
