//! Read-only reporting queries over sales, line items, and inventory.
//!
//! Date ranges are validated before any query runs; an empty range is an
//! empty result, not an error.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::{DbPool, InventarioItem, ProductoVendido, ReporteVenta};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_rango_fechas;

#[derive(Debug, Deserialize)]
pub struct RangoFechas {
    pub inicio: Option<String>,
    pub fin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReporteVentasResponse {
    pub ventas: Vec<ReporteVenta>,
}

#[derive(Debug, Serialize)]
pub struct MasVendidosResponse {
    pub productos: Vec<ProductoVendido>,
}

#[derive(Debug, Serialize)]
pub struct InventarioResponse {
    pub inventario: Vec<InventarioItem>,
}

async fn consultar_ventas(
    pool: &DbPool,
    inicio: NaiveDate,
    fin: NaiveDate,
) -> Result<Vec<ReporteVenta>, ApiError> {
    let ventas = sqlx::query_as::<_, ReporteVenta>(
        r#"
        SELECT v.id, v.usuario_id, v.total, date(v.fecha) AS fecha
        FROM ventas v
        WHERE date(v.fecha) BETWEEN ? AND ?
        ORDER BY v.fecha ASC
        "#,
    )
    .bind(inicio.to_string())
    .bind(fin.to_string())
    .fetch_all(pool)
    .await?;

    Ok(ventas)
}

async fn consultar_mas_vendidos(
    pool: &DbPool,
    inicio: NaiveDate,
    fin: NaiveDate,
) -> Result<Vec<ProductoVendido>, ApiError> {
    let productos = sqlx::query_as::<_, ProductoVendido>(
        r#"
        SELECT p.nombre,
               SUM(d.cantidad) AS cantidad_vendida,
               SUM(d.subtotal) AS total_generado
        FROM detalle_venta d
        INNER JOIN productos p ON p.id = d.producto_id
        INNER JOIN ventas v ON v.id = d.venta_id
        WHERE date(v.fecha) BETWEEN ? AND ?
        GROUP BY p.nombre
        ORDER BY cantidad_vendida DESC
        "#,
    )
    .bind(inicio.to_string())
    .bind(fin.to_string())
    .fetch_all(pool)
    .await?;

    Ok(productos)
}

async fn consultar_inventario(pool: &DbPool) -> Result<Vec<InventarioItem>, ApiError> {
    let inventario = sqlx::query_as::<_, InventarioItem>(
        r#"
        SELECT p.id, p.nombre, p.precio, i.existencia
        FROM productos p
        INNER JOIN inventario i ON i.producto_id = p.id
        ORDER BY p.nombre ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(inventario)
}

/// Sales within a date range, dates truncated to day
///
/// GET /api/reportes/ventas?inicio=YYYY-MM-DD&fin=YYYY-MM-DD
pub async fn reporte_ventas(
    State(state): State<Arc<AppState>>,
    Query(rango): Query<RangoFechas>,
) -> Result<Json<ReporteVentasResponse>, ApiError> {
    let (inicio, fin) = validate_rango_fechas(rango.inicio.as_deref(), rango.fin.as_deref())
        .map_err(ApiError::bad_request)?;

    let ventas = consultar_ventas(&state.db, inicio, fin).await?;
    Ok(Json(ReporteVentasResponse { ventas }))
}

/// Best-selling products within a date range
///
/// GET /api/reportes/mas-vendidos?inicio=YYYY-MM-DD&fin=YYYY-MM-DD
pub async fn mas_vendidos(
    State(state): State<Arc<AppState>>,
    Query(rango): Query<RangoFechas>,
) -> Result<Json<MasVendidosResponse>, ApiError> {
    let (inicio, fin) = validate_rango_fechas(rango.inicio.as_deref(), rango.fin.as_deref())
        .map_err(ApiError::bad_request)?;

    let productos = consultar_mas_vendidos(&state.db, inicio, fin).await?;
    Ok(Json(MasVendidosResponse { productos }))
}

/// Current inventory snapshot
///
/// GET /api/reportes/inventario
pub async fn inventario(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InventarioResponse>, ApiError> {
    let inventario = consultar_inventario(&state.db).await?;
    Ok(Json(InventarioResponse { inventario }))
}
