use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,       // user ID, also the key a revocation list would use
    pub email: String,  // email as stored
    pub name: String,   // display name
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
}
