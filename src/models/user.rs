use serde::{Deserialize, Serialize};

/// Authenticated user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Successful login result: a bearer token plus the user it belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub jwt: String,
    pub user: AuthUser,
}
