use serde::{Deserialize, Serialize};

/// Public view of an account. The password hash never leaves the server.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}
