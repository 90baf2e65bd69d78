//! Identity layer: the users table as seen by the auth middleware.

use api_types::user::Me;
use axum::{Extension, Json};
use sea_orm::entity::prelude::*;

use crate::ServerError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub is_verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Returns the authenticated user.
pub async fn me(Extension(user): Extension<Model>) -> Result<Json<Me>, ServerError> {
    Ok(Json(Me {
        id: user.id,
        email: user.email,
        username: user.username,
        is_admin: user.is_admin,
        is_verified: user.is_verified,
    }))
}
