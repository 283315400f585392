mod producto;
mod reporte;
mod usuario;
mod venta;

pub use producto::*;
pub use reporte::*;
pub use usuario::*;
pub use venta::*;
