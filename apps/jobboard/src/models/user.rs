use serde::{Deserialize, Serialize};

/// Identity handed over by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// One emission of the auth stream. `user == None` means signed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub is_loading: bool,
}

impl AuthState {
    pub fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn signed_in(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}
