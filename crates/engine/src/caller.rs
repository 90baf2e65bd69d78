//! Identity of the user performing an operation.

/// The authenticated caller, as resolved by the identity layer.
///
/// Every read or write in the engine is scoped by a `Caller`. Operations take
/// an `Option<&Caller>` so that an anonymous request maps to `Unauthorized`
/// inside the engine rather than in each transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: i32) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: i32) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

impl From<&crate::users::Model> for Caller {
    fn from(user: &crate::users::Model) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.is_admin,
        }
    }
}
