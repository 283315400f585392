//! Input validation for API requests.
//!
//! Small `Result<(), String>` helpers; handlers turn the message into a
//! 400 response with the API's error shape.

use chrono::NaiveDate;

use crate::db::VentaItemRequest;

pub const UNIDADES: [&str; 2] = ["kg", "pieza"];

/// Validate a product's unit of sale
pub fn validate_unidad(unidad: &str) -> Result<(), String> {
    if UNIDADES.contains(&unidad) {
        Ok(())
    } else {
        Err("unidad inválida (kg|pieza)".to_string())
    }
}

/// Validate one sale line item: product reference present, quantity and
/// unit price strictly positive
pub fn validate_item(item: &VentaItemRequest) -> Result<(), String> {
    if item.producto_id.trim().is_empty() || item.cantidad <= 0.0 || item.precio <= 0.0 {
        return Err("Datos de producto inválidos".to_string());
    }
    Ok(())
}

/// Validate a reporting date range: both bounds present, ISO dates,
/// inicio not after fin. Returns the parsed bounds.
pub fn validate_rango_fechas(
    inicio: Option<&str>,
    fin: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), String> {
    let (inicio, fin) = match (inicio, fin) {
        (Some(i), Some(f)) => (i, f),
        _ => return Err("Debes enviar fechas inicio y fin".to_string()),
    };

    let inicio = NaiveDate::parse_from_str(inicio, "%Y-%m-%d")
        .map_err(|_| "Formato de fecha inválido".to_string())?;
    let fin = NaiveDate::parse_from_str(fin, "%Y-%m-%d")
        .map_err(|_| "Formato de fecha inválido".to_string())?;

    if inicio > fin {
        return Err("La fecha inicio no puede ser mayor que fin".to_string());
    }

    Ok((inicio, fin))
}
