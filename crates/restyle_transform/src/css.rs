//! Text forms of the `transform` and `transform-origin` style properties.
//!
//! Matrices are stored row-major with the translation in the last column,
//! while `matrix3d(...)` lists the values column by column. Both directions of
//! the conversion live here so that the two orders never get mixed up
//! elsewhere.

use crate::{Result, TransformError};
use restyle_math::{Matrix, snap::snap};

/// Decimal places matrix values are written with unless configured
/// otherwise.
pub const DEFAULT_DECIMAL_PLACES: u32 = 6;

/// Formats the matrix as a `matrix3d(...)` value, listing the elements in
/// column-major order rounded to `decimal_places`.
pub fn format_transform(matrix: &Matrix, decimal_places: u32) -> String {
    let values: Vec<_> = (0..matrix.n_cols())
        .flat_map(|j| (0..matrix.n_rows()).map(move |i| (i, j)))
        .map(|(i, j)| format_number(matrix.get(i, j), decimal_places))
        .collect();
    format!("matrix3d({})", values.join(", "))
}

/// Formats the number rounded half away from zero to the given number of
/// decimal places, in its shortest form and without a negative zero.
pub fn format_number(value: f64, decimal_places: u32) -> String {
    let factor = 10_f64.powi(decimal_places as i32);
    let rounded = (value * factor).round() / factor;
    format!("{}", rounded + 0.0)
}

/// Parses a computed `transform` value into a 4x4 matrix.
///
/// Accepts `none` or an empty value (the identity), a 2D `matrix(a, b, c, d,
/// e, f)` and a 3D `matrix3d(...)` with 16 column-major values. Parsed values
/// are snapped to exact `0`/`1`/`-1` where they are within rounding distance.
///
/// # Errors
/// Returns [`TransformError::MalformedTransform`] if the value is not of the
/// accepted forms.
pub fn parse_transform(value: &str) -> Result<Matrix> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "none" {
        return Ok(Matrix::identity(4));
    }

    let malformed = |n_components| TransformError::MalformedTransform {
        value: value.to_string(),
        n_components,
    };

    let arguments = match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        _ => return Err(malformed(0)),
    };

    let components: Vec<&str> = arguments.split(',').collect();
    let values = components
        .iter()
        .map(|component| component.trim().parse::<f64>().map(snap))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_err| malformed(components.len()))?;

    match values[..] {
        [a, b, c, d, e, f] => Ok(Matrix::from_array([
            [a, c, 0.0, e],
            [b, d, 0.0, f],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])),
        _ if values.len() == 16 => {
            let mut rows = [[0.0; 4]; 4];
            for (k, &value) in values.iter().enumerate() {
                rows[k % 4][k / 4] = value;
            }
            Ok(Matrix::from_array(rows))
        }
        _ => Err(malformed(values.len())),
    }
}

/// Formats a transform origin as `"<x>px <y>px <z>"`.
pub fn format_origin(origin: [f64; 3]) -> String {
    let [x, y, z] = origin.map(|component| component + 0.0);
    format!("{x}px {y}px {z}")
}

/// Parses a computed `transform-origin` value of two or three
/// space-separated lengths. The `px` unit is optional and a missing `z` is
/// `0`.
///
/// # Errors
/// Returns [`TransformError::MalformedOrigin`] if the value is not of this
/// form.
pub fn parse_origin(value: &str) -> Result<[f64; 3]> {
    let malformed = || TransformError::MalformedOrigin {
        value: value.to_string(),
    };

    let mut origin = [0.0; 3];
    let mut n_components = 0;

    for component in value.split_whitespace() {
        if n_components == 3 {
            return Err(malformed());
        }
        let number = component.strip_suffix("px").unwrap_or(component);
        origin[n_components] = number.parse().map_err(|_err| malformed())?;
        n_components += 1;
    }

    if n_components < 2 {
        return Err(malformed());
    }

    Ok(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_identity_gives_unit_diagonal() {
        assert_eq!(
            format_transform(&Matrix::identity(4), 6),
            "matrix3d(1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1)"
        );
    }

    #[test]
    fn formatting_lists_translation_last() {
        let matrix = Matrix::from_array([
            [1.0, 0.0, 0.0, 42.0],
            [0.0, 1.0, 0.0, 69.0],
            [0.0, 0.0, 1.0, 99.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(
            format_transform(&matrix, 6),
            "matrix3d(1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 42, 69, 99, 1)"
        );
    }

    #[test]
    fn formatting_numbers_rounds_and_drops_negative_zero() {
        assert_eq!(format_number(0.123_456_789, 6), "0.123457");
        assert_eq!(format_number(-0.000_000_1, 6), "0");
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(-2.5, 0), "-3");
        assert_eq!(format_number(0.5, 6), "0.5");
        assert_eq!(format_number(-1e-3, 2), "0");
    }

    #[test]
    fn parsing_none_or_empty_gives_identity() {
        assert_eq!(parse_transform("none").unwrap(), Matrix::identity(4));
        assert_eq!(parse_transform("  ").unwrap(), Matrix::identity(4));
    }

    #[test]
    fn parsing_2d_matrix_places_translation_in_last_column() {
        assert_eq!(
            parse_transform("matrix(1, 2, 3, 4, 5, 6)").unwrap(),
            Matrix::from_array([
                [1.0, 3.0, 0.0, 5.0],
                [2.0, 4.0, 0.0, 6.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ])
        );
    }

    #[test]
    fn parsing_3d_matrix_reads_columns() {
        let matrix =
            parse_transform("matrix3d(1, 2, 3, 0, 4, 5, 6, 0, 7, 8, 9, 0, 10, 11, 12, 1)").unwrap();
        assert_eq!(matrix.row(0), &[1.0, 4.0, 7.0, 10.0]);
        assert_eq!(matrix.row(3), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn parsing_snaps_rounding_noise() {
        let matrix = parse_transform("matrix(0.9999999999999, 1e-17, 0, 1, 0, 0)").unwrap();
        assert_eq!(matrix, Matrix::identity(4));
    }

    #[test]
    fn parsing_wrong_number_of_components_fails() {
        assert!(matches!(
            parse_transform("matrix(1, 0, 0, 1)"),
            Err(TransformError::MalformedTransform { n_components: 4, .. })
        ));
    }

    #[test]
    fn parsing_non_numeric_components_fails() {
        assert!(matches!(
            parse_transform("translate(10px, 20px)"),
            Err(TransformError::MalformedTransform { n_components: 2, .. })
        ));
        assert!(matches!(
            parse_transform("matrix"),
            Err(TransformError::MalformedTransform { n_components: 0, .. })
        ));
    }

    #[test]
    fn formatting_origin_omits_unit_on_z() {
        assert_eq!(format_origin([0.0, -0.0, 0.0]), "0px 0px 0");
        assert_eq!(format_origin([12.5, 3.0, -4.0]), "12.5px 3px -4");
    }

    #[test]
    fn parsing_origin_accepts_optional_units_and_z() {
        assert_eq!(parse_origin("50px 25px").unwrap(), [50.0, 25.0, 0.0]);
        assert_eq!(parse_origin("1 2px 3px").unwrap(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn parsing_malformed_origin_fails() {
        for value in ["", "50px", "left top", "1px 2px 3px 4px"] {
            assert!(matches!(
                parse_origin(value),
                Err(TransformError::MalformedOrigin { .. })
            ));
        }
    }
}
