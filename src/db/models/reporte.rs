//! Report row models.

use serde::Serialize;
use sqlx::FromRow;

/// Sale within a reporting range, date truncated to day.
#[derive(Debug, Serialize, FromRow)]
pub struct ReporteVenta {
    pub id: String,
    pub usuario_id: String,
    pub total: f64,
    pub fecha: String,
}

/// Aggregated product line for the best-sellers report.
#[derive(Debug, Serialize, FromRow)]
pub struct ProductoVendido {
    pub nombre: String,
    pub cantidad_vendida: f64,
    pub total_generado: f64,
}

/// Row of the inventory snapshot report.
#[derive(Debug, Serialize, FromRow)]
pub struct InventarioItem {
    pub id: String,
    pub nombre: String,
    pub precio: f64,
    pub existencia: f64,
}
