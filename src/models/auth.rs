// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// As claims do JWT. A emissão do token é feita pelo serviço de identidade,
// fora deste backend; aqui apenas validamos e extraímos o usuário.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// O usuário autenticado da requisição, inserido nos extensions pelo guard.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        CurrentUser {
            id: claims.sub,
            email: claims.email,
        }
    }
}
