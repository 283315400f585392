//! User models and login request/response types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: String,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub creado_en: String,
}

/// User summary returned by login and /me. Never carries the hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsuarioResumen {
    pub id: String,
    pub nombre: String,
    pub email: String,
}

impl From<Usuario> for UsuarioResumen {
    fn from(usuario: Usuario) -> Self {
        Self {
            id: usuario.id,
            nombre: usuario.nombre,
            email: usuario.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: UsuarioResumen,
}
