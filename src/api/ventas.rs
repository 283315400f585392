//! Sale recording.
//!
//! A sale is one header row plus its line items, inserted inside a single
//! transaction: any invalid item or constraint failure rolls back
//! everything from the request. Items are validated in input order,
//! mid-transaction, after the header insert.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{CreateVentaRequest, DbPool, VentaCreada, VentaDiaria};
use crate::AppState;

use super::auth::Claims;
use super::error::ApiError;
use super::validation::validate_item;

/// Insert a sale header and its line items atomically.
///
/// The caller-supplied total is stored verbatim on the header; subtotals
/// come from each item's quantity × unit price. When
/// `descontar_existencia` is set, each line item also subtracts its
/// quantity from inventory inside the same transaction.
pub(crate) async fn registrar_venta(
    pool: &DbPool,
    usuario_id: &str,
    req: &CreateVentaRequest,
    descontar_existencia: bool,
) -> Result<VentaCreada, ApiError> {
    if req.items.is_empty() {
        return Err(ApiError::bad_request("No hay productos en la venta"));
    }
    let total = req
        .total
        .ok_or_else(|| ApiError::bad_request("total requerido"))?;

    let id = Uuid::new_v4().to_string();
    let fecha = chrono::Utc::now().to_rfc3339();

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO ventas (id, usuario_id, total, fecha) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(usuario_id)
        .bind(total)
        .bind(&fecha)
        .execute(&mut *tx)
        .await?;

    for item in &req.items {
        // Per-item validation happens mid-transaction; the rollback
        // undoes the header and any line items already inserted
        if let Err(e) = validate_item(item) {
            tx.rollback().await?;
            return Err(ApiError::bad_request(e));
        }

        let subtotal = item.cantidad * item.precio;

        sqlx::query(
            r#"
            INSERT INTO detalle_venta (id, venta_id, producto_id, cantidad, precio, subtotal)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&id)
        .bind(&item.producto_id)
        .bind(item.cantidad)
        .bind(item.precio)
        .bind(subtotal)
        .execute(&mut *tx)
        .await?;

        if descontar_existencia {
            sqlx::query("UPDATE inventario SET existencia = existencia - ? WHERE producto_id = ?")
                .bind(item.cantidad)
                .bind(&item.producto_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    Ok(VentaCreada { id, total, fecha })
}

/// Record a sale
///
/// POST /api/ventas
pub async fn create_venta(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateVentaRequest>,
) -> Result<(StatusCode, Json<VentaCreada>), ApiError> {
    let venta = registrar_venta(
        &state.db,
        &claims.sub,
        &req,
        state.config.ventas.descontar_existencia,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(venta)))
}

/// Sales grouped by day
///
/// GET /api/ventas/diarias
pub async fn ventas_diarias(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VentaDiaria>>, ApiError> {
    let filas = sqlx::query_as::<_, VentaDiaria>(
        r#"
        SELECT date(fecha) AS dia,
               COUNT(*) AS num_ventas,
               SUM(total) AS total_dia
        FROM ventas
        GROUP BY date(fecha)
        ORDER BY dia DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(filas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::VentaItemRequest;

    async fn test_state() -> Arc<AppState> {
        let pool = crate::db::init_test().await;
        seed(&pool).await;
        Arc::new(AppState::new(Config::default(), pool))
    }

    async fn seed(pool: &DbPool) {
        sqlx::query(
            "INSERT INTO usuarios (id, nombre, email, password_hash, creado_en) \
             VALUES ('u-1', 'Ana', 'ana@example.com', 'x', '2026-01-01T00:00:00+00:00')",
        )
        .execute(pool)
        .await
        .unwrap();

        for (id, nombre, precio, existencia) in
            [("p-1", "Manzana", 25.0, 50.0), ("p-2", "Arroz", 30.0, 20.0)]
        {
            sqlx::query(
                "INSERT INTO productos (id, nombre, unidad, precio, activo, actualizado_en) \
                 VALUES (?, ?, 'kg', ?, 1, '2026-01-01T00:00:00+00:00')",
            )
            .bind(id)
            .bind(nombre)
            .bind(precio)
            .execute(pool)
            .await
            .unwrap();

            sqlx::query("INSERT INTO inventario (producto_id, existencia) VALUES (?, ?)")
                .bind(id)
                .bind(existencia)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    fn item(producto_id: &str, cantidad: f64, precio: f64) -> VentaItemRequest {
        VentaItemRequest {
            producto_id: producto_id.to_string(),
            cantidad,
            precio,
        }
    }

    async fn contar(pool: &DbPool, tabla: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", tabla))
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_registrar_venta_persists_header_and_items() {
        let state = test_state().await;

        let req = CreateVentaRequest {
            items: vec![item("p-1", 2.0, 25.0), item("p-2", 1.5, 30.0)],
            total: Some(95.0),
        };
        let venta = registrar_venta(&state.db, "u-1", &req, false).await.unwrap();

        assert_eq!(venta.total, 95.0);
        assert_eq!(contar(&state.db, "ventas").await, 1);
        assert_eq!(contar(&state.db, "detalle_venta").await, 2);

        let (subtotal,): (f64,) =
            sqlx::query_as("SELECT subtotal FROM detalle_venta WHERE producto_id = 'p-2'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(subtotal, 45.0);
    }

    #[tokio::test]
    async fn test_total_is_stored_verbatim() {
        let state = test_state().await;

        // Header total is trusted from the caller, not recomputed from
        // the line items
        let req = CreateVentaRequest {
            items: vec![item("p-1", 1.0, 25.0)],
            total: Some(999.0),
        };
        registrar_venta(&state.db, "u-1", &req, false).await.unwrap();

        let (total,): (f64,) = sqlx::query_as("SELECT total FROM ventas")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(total, 999.0);
    }

    #[tokio::test]
    async fn test_invalid_item_rolls_back_everything() {
        let state = test_state().await;

        let req = CreateVentaRequest {
            items: vec![item("p-1", 2.0, 25.0), item("p-2", 0.0, 30.0)],
            total: Some(50.0),
        };
        let err = registrar_venta(&state.db, "u-1", &req, false)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(contar(&state.db, "ventas").await, 0);
        assert_eq!(contar(&state.db, "detalle_venta").await, 0);
    }

    #[tokio::test]
    async fn test_empty_items_rejected_before_any_insert() {
        let state = test_state().await;

        let req = CreateVentaRequest {
            items: vec![],
            total: Some(0.0),
        };
        let err = registrar_venta(&state.db, "u-1", &req, false)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(contar(&state.db, "ventas").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_producto_aborts_transaction() {
        let state = test_state().await;

        let req = CreateVentaRequest {
            items: vec![item("p-1", 1.0, 25.0), item("no-such-product", 1.0, 10.0)],
            total: Some(35.0),
        };
        let err = registrar_venta(&state.db, "u-1", &req, false)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(contar(&state.db, "ventas").await, 0);
        assert_eq!(contar(&state.db, "detalle_venta").await, 0);
    }

    #[tokio::test]
    async fn test_inventory_untouched_by_default() {
        let state = test_state().await;

        let req = CreateVentaRequest {
            items: vec![item("p-1", 5.0, 25.0)],
            total: Some(125.0),
        };
        registrar_venta(&state.db, "u-1", &req, false).await.unwrap();

        let (existencia,): (f64,) =
            sqlx::query_as("SELECT existencia FROM inventario WHERE producto_id = 'p-1'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(existencia, 50.0);
    }

    #[tokio::test]
    async fn test_decrement_hook_runs_in_transaction() {
        let state = test_state().await;

        let req = CreateVentaRequest {
            items: vec![item("p-1", 5.0, 25.0), item("p-2", 2.0, 30.0)],
            total: Some(185.0),
        };
        registrar_venta(&state.db, "u-1", &req, true).await.unwrap();

        let (existencia,): (f64,) =
            sqlx::query_as("SELECT existencia FROM inventario WHERE producto_id = 'p-1'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(existencia, 45.0);

        let (existencia,): (f64,) =
            sqlx::query_as("SELECT existencia FROM inventario WHERE producto_id = 'p-2'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(existencia, 18.0);
    }

    #[tokio::test]
    async fn test_ventas_diarias_groups_by_day() {
        let state = test_state().await;

        for total in [100.0, 50.0] {
            let req = CreateVentaRequest {
                items: vec![item("p-1", 1.0, total)],
                total: Some(total),
            };
            registrar_venta(&state.db, "u-1", &req, false).await.unwrap();
        }

        let Json(dias) = ventas_diarias(State(state)).await.unwrap();
        assert_eq!(dias.len(), 1);
        assert_eq!(dias[0].num_ventas, 2);
        assert_eq!(dias[0].total_dia, 150.0);
    }
}
