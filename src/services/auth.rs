// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, CurrentUser},
};

// A emissão do token fica no serviço de identidade, fora deste backend.
// Aqui só validamos a assinatura e a expiração e extraímos o usuário.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn token_for(secret: &str, exp: usize) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id,
            email: "ana@exemplo.com".to_string(),
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (user_id, token)
    }

    fn far_future() -> usize {
        // Bem depois de qualquer execução plausível desta suíte.
        4102444800 // 2100-01-01
    }

    #[test]
    fn token_valido_extrai_o_usuario() {
        let service = AuthService::new("segredo".to_string());
        let (user_id, token) = token_for("segredo", far_future());

        let user = service.validate_token(&token).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email, "ana@exemplo.com");
    }

    #[test]
    fn token_de_outro_segredo_e_rejeitado() {
        let service = AuthService::new("segredo".to_string());
        let (_, token) = token_for("intruso", far_future());

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let service = AuthService::new("segredo".to_string());
        let (_, token) = token_for("segredo", 1000);

        assert!(service.validate_token(&token).is_err());
    }
}
