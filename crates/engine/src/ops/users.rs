use sea_orm::{QueryFilter, Set, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::{Engine, normalize_required_text};

/// Input for bootstrapping a user account.
#[derive(Clone, Debug, Default)]
pub struct UserNew {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

impl Engine {
    /// Creates a user. Used by the admin tooling; sign-up itself is handled by
    /// the identity provider.
    pub async fn new_user(&self, user: UserNew) -> ResultEngine<i32> {
        let email = normalize_required_text(&user.email, "email")?.to_lowercase();
        if !email.contains('@') {
            return Err(EngineError::InvalidInput(format!("invalid email: {email}")));
        }
        let username = normalize_required_text(&user.username, "username")?;
        if user.password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(
                users::Column::Email
                    .eq(email.clone())
                    .or(users::Column::Username.eq(username.clone())),
            )
            .one(&self.database)
            .await?;
        if let Some(existing) = existing {
            let key = if existing.email == email {
                email
            } else {
                username
            };
            return Err(EngineError::ExistingKey(key));
        }

        let model = users::ActiveModel {
            email: Set(email),
            username: Set(username),
            password: Set(user.password),
            is_admin: Set(user.is_admin),
            is_verified: Set(false),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        tracing::info!(id = model.id, admin = model.is_admin, "user created");
        Ok(model.id)
    }

    /// Grants or revokes the admin flag.
    pub async fn set_admin(&self, username: &str, is_admin: bool) -> ResultEngine<()> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.trim().to_string()))?;

        let mut user: users::ActiveModel = user.into();
        user.is_admin = Set(is_admin);
        user.update(&self.database).await?;
        Ok(())
    }
}
