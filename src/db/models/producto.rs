//! Product models.
//!
//! A product owns at most one inventory row; reads always join the two and
//! coalesce a missing quantity to zero.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Product joined with its on-hand inventory quantity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Producto {
    pub id: String,
    pub nombre: String,
    /// Unit of sale: "kg" (weight) or "pieza" (count).
    pub unidad: String,
    pub precio: f64,
    pub activo: bool,
    pub existencia: f64,
    pub actualizado_en: String,
}

/// Body for POST /api/productos. Missing string fields deserialize to
/// empty so validation can answer with the API's own error shape.
#[derive(Debug, Deserialize)]
pub struct CreateProductoRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub unidad: String,
    pub precio: Option<f64>,
    #[serde(default)]
    pub existencia: f64,
}

/// Body for PATCH /api/productos/:id; absent fields keep prior values.
#[derive(Debug, Deserialize)]
pub struct PatchProductoRequest {
    pub precio: Option<f64>,
    pub activo: Option<bool>,
}

/// Body for PUT /api/productos/:id; every field is required.
#[derive(Debug, Deserialize)]
pub struct PutProductoRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub unidad: String,
    pub precio: Option<f64>,
    pub existencia: Option<f64>,
    pub activo: Option<bool>,
}
