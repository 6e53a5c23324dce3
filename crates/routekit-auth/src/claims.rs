//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims embedded in an access token.
///
/// `sub`, `iat` and `exp` are registered claims; anything else the issuer
/// put in the token is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (usually the user id)
    pub sub: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
