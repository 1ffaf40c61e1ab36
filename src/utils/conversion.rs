// Serving scaling and unit conversion
use crate::db::models::RecipeIngredient;
use crate::error::{Error, Result};

/// Factor to the base unit (ml for volume, g for weight)
fn unit_factor(unit: &str) -> Option<(f64, UnitKind)> {
    let factor = match unit.trim().to_lowercase().as_str() {
        "ml" => (1.0, UnitKind::Volume),
        "l" => (1000.0, UnitKind::Volume),
        "tsp" => (5.0, UnitKind::Volume),
        "tbsp" => (15.0, UnitKind::Volume),
        "cup" => (240.0, UnitKind::Volume),
        "fl oz" => (30.0, UnitKind::Volume),
        "pint" => (473.0, UnitKind::Volume),
        "quart" => (946.0, UnitKind::Volume),
        "gallon" => (3785.0, UnitKind::Volume),
        "g" => (1.0, UnitKind::Weight),
        "kg" => (1000.0, UnitKind::Weight),
        "oz" => (28.35, UnitKind::Weight),
        "lb" => (453.592, UnitKind::Weight),
        "mg" => (0.001, UnitKind::Weight),
        _ => return None,
    };
    Some(factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Volume,
    Weight,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scale one quantity from `original_servings` to `new_servings`
pub fn scale_quantity(quantity: f64, original_servings: i64, new_servings: i64) -> f64 {
    if original_servings <= 0 {
        return quantity;
    }
    round2(quantity * new_servings as f64 / original_servings as f64)
}

/// Scale every quantity in an ingredient list; ingredients without a
/// quantity are left untouched
pub fn scale_ingredients(
    ingredients: &[RecipeIngredient],
    original_servings: i64,
    new_servings: i64,
) -> Vec<RecipeIngredient> {
    ingredients
        .iter()
        .map(|ing| RecipeIngredient {
            quantity: ing
                .quantity
                .map(|q| scale_quantity(q, original_servings, new_servings)),
            ..ing.clone()
        })
        .collect()
}

/// Convert a quantity between units of the same kind.
///
/// Unknown units, or a volume/weight mix, return the quantity unchanged.
pub fn convert_unit(quantity: f64, from: &str, to: &str) -> f64 {
    if from.eq_ignore_ascii_case(to) {
        return quantity;
    }

    match (unit_factor(from), unit_factor(to)) {
        (Some((from_factor, from_kind)), Some((to_factor, to_kind))) if from_kind == to_kind => {
            round2(quantity * from_factor / to_factor)
        }
        _ => quantity,
    }
}

/// Express every quantity measured in the same kind of unit as `to_unit`
/// in that unit. Other ingredients are left untouched; an unknown target
/// unit is a validation error.
pub fn convert_ingredients(
    ingredients: &[RecipeIngredient],
    to_unit: &str,
) -> Result<Vec<RecipeIngredient>> {
    let (_, target_kind) = unit_factor(to_unit)
        .ok_or_else(|| Error::Validation(format!("Unknown unit: {to_unit}")))?;
    let to_unit = to_unit.trim().to_lowercase();

    let converted = ingredients
        .iter()
        .map(|ing| match (ing.quantity, ing.unit.as_deref()) {
            (Some(quantity), Some(unit))
                if unit_factor(unit).is_some_and(|(_, kind)| kind == target_kind) =>
            {
                RecipeIngredient {
                    quantity: Some(convert_unit(quantity, unit, &to_unit)),
                    unit: Some(to_unit.clone()),
                    ..ing.clone()
                }
            }
            _ => ing.clone(),
        })
        .collect();

    Ok(converted)
}

/// Human-readable duration: "45 min", "2 hr", "1 hr 30 min"
pub fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return String::new();
    }

    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    let mins = minutes % 60;

    if mins == 0 {
        format!("{hours} hr")
    } else {
        format!("{hours} hr {mins} min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ing(name: &str, quantity: Option<f64>, unit: Option<&str>) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity,
            unit: unit.map(str::to_string),
            order_index: 0,
        }
    }

    #[test]
    fn test_scale_ingredients() {
        let list = vec![
            ing("Gạo", Some(300.0), Some("g")),
            ing("Muối", None, None),
            ing("Nước", Some(1.0), Some("l")),
        ];

        let scaled = scale_ingredients(&list, 4, 6);
        assert_eq!(scaled[0].quantity, Some(450.0));
        assert_eq!(scaled[1].quantity, None);
        assert_eq!(scaled[2].quantity, Some(1.5));
        assert_eq!(scaled[0].name, "Gạo");

        assert_eq!(scale_quantity(1.0, 3, 1), 0.33);
        // unknown base servings leaves quantities alone
        assert_eq!(scale_quantity(2.0, 0, 5), 2.0);
    }

    #[test]
    fn test_convert_unit() {
        assert_eq!(convert_unit(2.0, "cup", "ml"), 480.0);
        assert_eq!(convert_unit(1.0, "kg", "g"), 1000.0);
        assert_eq!(convert_unit(3.0, "TSP", "tbsp"), 1.0);
        assert_eq!(convert_unit(1.0, "lb", "oz"), 16.0);
        // mismatched kinds and unknown units are returned as-is
        assert_eq!(convert_unit(2.0, "cup", "g"), 2.0);
        assert_eq!(convert_unit(2.0, "nắm", "g"), 2.0);
    }

    #[test]
    fn test_convert_ingredients() {
        let list = vec![
            ing("Nước dùng", Some(2.0), Some("l")),
            ing("Nước mắm", Some(2.0), Some("tbsp")),
            ing("Thịt bò", Some(500.0), Some("g")),
            ing("Hành", None, Some("ml")),
            ing("Gừng", Some(1.0), Some("củ")),
        ];

        let converted = convert_ingredients(&list, "ML").unwrap();
        assert_eq!(converted[0].quantity, Some(2000.0));
        assert_eq!(converted[0].unit.as_deref(), Some("ml"));
        assert_eq!(converted[1].quantity, Some(30.0));
        // weight, missing quantity and unknown units are left alone
        assert_eq!(converted[2], list[2]);
        assert_eq!(converted[3], list[3]);
        assert_eq!(converted[4], list[4]);

        assert!(matches!(
            convert_ingredients(&list, "bát"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(120), "2 hr");
        assert_eq!(format_duration(90), "1 hr 30 min");
    }
}
