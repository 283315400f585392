//! Product + inventory CRUD.
//!
//! Products and their inventory row move together: create upserts the
//! inventory quantity, replace updates both, delete removes both, all
//! inside one transaction per operation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{CreateProductoRequest, PatchProductoRequest, Producto, PutProductoRequest};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_unidad;

#[derive(Debug, Serialize)]
pub struct Mensaje {
    pub message: String,
}

async fn fetch_producto(db: &crate::db::DbPool, id: &str) -> Result<Option<Producto>, ApiError> {
    let producto = sqlx::query_as::<_, Producto>(
        r#"
        SELECT p.id, p.nombre, p.unidad, p.precio, p.activo,
               COALESCE(i.existencia, 0.0) AS existencia,
               p.actualizado_en
        FROM productos p
        LEFT JOIN inventario i ON i.producto_id = p.id
        WHERE p.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(producto)
}

/// List all products with inventory
///
/// GET /api/productos
pub async fn list_productos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Producto>>, ApiError> {
    let productos = sqlx::query_as::<_, Producto>(
        r#"
        SELECT p.id, p.nombre, p.unidad, p.precio, p.activo,
               COALESCE(i.existencia, 0.0) AS existencia,
               p.actualizado_en
        FROM productos p
        LEFT JOIN inventario i ON i.producto_id = p.id
        ORDER BY p.nombre
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(productos))
}

/// Get a single product
///
/// GET /api/productos/:id
pub async fn get_producto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Producto>, ApiError> {
    let producto = fetch_producto(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("No encontrado"))?;

    Ok(Json(producto))
}

/// Create a product and its inventory row in one transaction
///
/// POST /api/productos
pub async fn create_producto(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductoRequest>,
) -> Result<(StatusCode, Json<Producto>), ApiError> {
    let nombre = req.nombre.trim().to_string();
    if nombre.is_empty() || req.unidad.is_empty() || req.precio.is_none() {
        return Err(ApiError::bad_request("nombre, unidad, precio son requeridos"));
    }
    validate_unidad(&req.unidad).map_err(ApiError::bad_request)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO productos (id, nombre, unidad, precio, activo, actualizado_en)
        VALUES (?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(&id)
    .bind(&nombre)
    .bind(&req.unidad)
    .bind(req.precio)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO inventario (producto_id, existencia)
        VALUES (?, ?)
        ON CONFLICT (producto_id) DO UPDATE SET existencia = excluded.existencia
        "#,
    )
    .bind(&id)
    .bind(req.existencia)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let producto = fetch_producto(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::internal("Error del servidor"))?;

    Ok((StatusCode::CREATED, Json(producto)))
}

/// Partial update: absent fields keep their prior values
///
/// PATCH /api/productos/:id
pub async fn patch_producto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PatchProductoRequest>,
) -> Result<Json<Producto>, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE productos
        SET precio = COALESCE(?, precio),
            activo = COALESCE(?, activo),
            actualizado_en = ?
        WHERE id = ?
        "#,
    )
    .bind(req.precio)
    .bind(req.activo)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("No encontrado"));
    }

    let producto = fetch_producto(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("No encontrado"))?;

    Ok(Json(producto))
}

/// Full replace of product and inventory in one transaction
///
/// PUT /api/productos/:id
pub async fn put_producto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PutProductoRequest>,
) -> Result<Json<Producto>, ApiError> {
    let nombre = req.nombre.trim().to_string();
    if nombre.is_empty()
        || req.unidad.is_empty()
        || req.precio.is_none()
        || req.existencia.is_none()
        || req.activo.is_none()
    {
        return Err(ApiError::bad_request(
            "nombre, unidad, precio, existencia, activo son requeridos",
        ));
    }
    validate_unidad(&req.unidad).map_err(ApiError::bad_request)?;

    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE productos
        SET nombre = ?, unidad = ?, precio = ?, activo = ?, actualizado_en = ?
        WHERE id = ?
        "#,
    )
    .bind(&nombre)
    .bind(&req.unidad)
    .bind(req.precio)
    .bind(req.activo)
    .bind(&now)
    .bind(&id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Producto no encontrado"));
    }

    sqlx::query("UPDATE inventario SET existencia = ? WHERE producto_id = ?")
        .bind(req.existencia)
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let producto = fetch_producto(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Producto no encontrado"))?;

    Ok(Json(producto))
}

/// Delete a product and its inventory row. Historical sale line items
/// survive with their product reference nulled.
///
/// DELETE /api/productos/:id
pub async fn delete_producto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Mensaje>, ApiError> {
    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM inventario WHERE producto_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM productos WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Producto no encontrado"));
    }

    tx.commit().await?;

    Ok(Json(Mensaje {
        message: "Producto eliminado correctamente".to_string(),
    }))
}
