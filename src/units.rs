//! Human-readable quantity formatting for suggestion texts.

use crate::models::stock::StockUnit;

/// Formats a quantity with its unit symbol, e.g. `450 ml`, `65%`,
/// `12 pieces`. Whole amounts drop the decimal part; fractional amounts
/// keep one digit. Unknown units render the bare amount.
pub fn format_quantity(quantity: f64, unit: StockUnit) -> String {
    let amount = if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{:.1}", quantity)
    };

    match unit {
        StockUnit::Percentage => format!("{}%", amount),
        StockUnit::Meter => format!("{} m", amount),
        StockUnit::Ml => format!("{} ml", amount),
        StockUnit::Liter => format!("{} l", amount),
        StockUnit::G => format!("{} g", amount),
        StockUnit::Kg => format!("{} kg", amount),
        StockUnit::Piece => {
            if (quantity - 1.0).abs() < f64::EPSILON {
                format!("{} piece", amount)
            } else {
                format!("{} pieces", amount)
            }
        }
        StockUnit::Unknown => amount,
    }
}
