//! Sale models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One line item in a sale request. Defaults let malformed items reach
/// the per-item validation instead of failing JSON extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct VentaItemRequest {
    #[serde(default)]
    pub producto_id: String,
    #[serde(default)]
    pub cantidad: f64,
    #[serde(default)]
    pub precio: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateVentaRequest {
    #[serde(default)]
    pub items: Vec<VentaItemRequest>,
    /// Stored on the sale header verbatim; not recomputed from subtotals.
    pub total: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct VentaCreada {
    pub id: String,
    pub total: f64,
    pub fecha: String,
}

/// Row of GET /api/ventas/diarias.
#[derive(Debug, Serialize, FromRow)]
pub struct VentaDiaria {
    pub dia: String,
    pub num_ventas: i64,
    pub total_dia: f64,
}
