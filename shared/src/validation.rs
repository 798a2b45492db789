//! Input validation for recommendation requests

use validator::Validate;

use crate::types::Coordinate;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validate coordinate ranges, returning the first offending field
pub fn validate_coordinate(coord: &Coordinate) -> Result<(), FieldError> {
    if !coord.latitude.is_finite() {
        return Err(FieldError {
            field: "latitude".to_string(),
            message: "latitude must be a finite number".to_string(),
        });
    }
    if !coord.longitude.is_finite() {
        return Err(FieldError {
            field: "longitude".to_string(),
            message: "longitude must be a finite number".to_string(),
        });
    }

    let Err(errors) = coord.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let (field, errs) = fields.into_iter().next().ok_or_else(|| FieldError {
        field: "coordinate".to_string(),
        message: "invalid coordinate".to_string(),
    })?;
    let message = errs
        .first()
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{} is out of range", field));

    Err(FieldError {
        field: field.to_string(),
        message,
    })
}
