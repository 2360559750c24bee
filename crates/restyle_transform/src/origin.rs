//! Arguments for moving the transform origin.

use crate::{Result, TransformError, element::ElementDimensions, vector::PartialVector3};

/// A new transform origin, given either as pixel offsets or as a
/// `transform-origin` style string of keywords, percentages and lengths.
///
/// Keyword strings are resolved against the element's dimensions:
///
/// - `left`/`right` set `x` to `0`/width and `top`/`bottom` set `y` to
///   `0`/height, wherever they appear.
/// - `center` alone sets both `x` and `y` to the middle; combined with other
///   tokens it sets `x` when it comes first and `y` otherwise.
/// - `<N>%` is a percentage of the width as the first token and of the
///   height as the second.
/// - `<N>` or `<N>px` is a length in pixels for the axis of its position.
///
/// Components that the argument does not mention are left unspecified.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OriginSpec<'a> {
    Pixels(PartialVector3),
    Keywords(&'a str),
}

impl OriginSpec<'_> {
    /// Resolves the argument to pixel offsets for an element of the given
    /// dimensions.
    ///
    /// # Errors
    /// Returns [`TransformError::MalformedOrigin`] if a keyword string has
    /// no tokens or more than three, contains an unknown token or has a
    /// percentage beyond the second position.
    pub fn resolve(&self, dimensions: ElementDimensions) -> Result<PartialVector3> {
        match *self {
            Self::Pixels(offsets) => Ok(offsets),
            Self::Keywords(keywords) => resolve_keywords(keywords, dimensions),
        }
    }
}

fn resolve_keywords(keywords: &str, dimensions: ElementDimensions) -> Result<PartialVector3> {
    let malformed = || TransformError::MalformedOrigin {
        value: keywords.to_string(),
    };

    let tokens: Vec<&str> = keywords.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > 3 {
        return Err(malformed());
    }

    let ElementDimensions { width, height } = dimensions;
    let mut origin = PartialVector3::unspecified();

    for (idx, token) in tokens.iter().enumerate() {
        if let Some(percentage) = token.strip_suffix('%') {
            let fraction = percentage.parse::<f64>().map_err(|_err| malformed())? / 100.0;
            match idx {
                0 => origin.x = Some(width * fraction),
                1 => origin.y = Some(height * fraction),
                _ => return Err(malformed()),
            }
            continue;
        }

        match token.to_ascii_lowercase().as_str() {
            "left" => origin.x = Some(0.0),
            "right" => origin.x = Some(width),
            "top" => origin.y = Some(0.0),
            "bottom" => origin.y = Some(height),
            "center" if tokens.len() == 1 => {
                origin.x = Some(0.5 * width);
                origin.y = Some(0.5 * height);
            }
            "center" if idx == 0 => origin.x = Some(0.5 * width),
            "center" => origin.y = Some(0.5 * height),
            length => {
                let pixels = length
                    .strip_suffix("px")
                    .unwrap_or(length)
                    .parse::<f64>()
                    .map_err(|_err| malformed())?;
                match idx {
                    0 => origin.x = Some(pixels),
                    1 => origin.y = Some(pixels),
                    _ => origin.z = Some(pixels),
                }
            }
        }
    }

    Ok(origin)
}

impl<'a> From<&'a str> for OriginSpec<'a> {
    fn from(keywords: &'a str) -> Self {
        Self::Keywords(keywords)
    }
}

impl From<PartialVector3> for OriginSpec<'_> {
    fn from(offsets: PartialVector3) -> Self {
        Self::Pixels(offsets)
    }
}

impl From<f64> for OriginSpec<'_> {
    fn from(x: f64) -> Self {
        Self::Pixels(x.into())
    }
}

impl From<[f64; 2]> for OriginSpec<'_> {
    fn from(offsets: [f64; 2]) -> Self {
        Self::Pixels(offsets.into())
    }
}

impl From<[f64; 3]> for OriginSpec<'_> {
    fn from(offsets: [f64; 3]) -> Self {
        Self::Pixels(offsets.into())
    }
}

impl From<(f64, f64)> for OriginSpec<'_> {
    fn from(offsets: (f64, f64)) -> Self {
        Self::Pixels(offsets.into())
    }
}

impl From<(f64, f64, f64)> for OriginSpec<'_> {
    fn from(offsets: (f64, f64, f64)) -> Self {
        Self::Pixels(offsets.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMENSIONS: ElementDimensions = ElementDimensions::new(200.0, 100.0);

    fn resolve(keywords: &str) -> Result<PartialVector3> {
        OriginSpec::from(keywords).resolve(DIMENSIONS)
    }

    #[test]
    fn resolving_pixels_passes_them_through() {
        assert_eq!(
            OriginSpec::from([1.0, 2.0]).resolve(DIMENSIONS).unwrap(),
            PartialVector3::new(Some(1.0), Some(2.0), None)
        );
    }

    #[test]
    fn resolving_corner_keywords_in_any_order() {
        let expected = PartialVector3::new(Some(200.0), Some(0.0), None);
        assert_eq!(resolve("right top").unwrap(), expected);
        assert_eq!(resolve("top right").unwrap(), expected);
        assert_eq!(
            resolve("bottom left").unwrap(),
            PartialVector3::new(Some(0.0), Some(100.0), None)
        );
    }

    #[test]
    fn resolving_single_keyword_sets_one_axis() {
        assert_eq!(
            resolve("bottom").unwrap(),
            PartialVector3::new(None, Some(100.0), None)
        );
    }

    #[test]
    fn resolving_lone_center_sets_both_axes() {
        assert_eq!(
            resolve("center").unwrap(),
            PartialVector3::new(Some(100.0), Some(50.0), None)
        );
    }

    #[test]
    fn resolving_center_depends_on_position() {
        assert_eq!(
            resolve("center top").unwrap(),
            PartialVector3::new(Some(100.0), Some(0.0), None)
        );
        assert_eq!(
            resolve("left center").unwrap(),
            PartialVector3::new(Some(0.0), Some(50.0), None)
        );
    }

    #[test]
    fn resolving_percentages_uses_width_then_height() {
        assert_eq!(
            resolve("10% 50%").unwrap(),
            PartialVector3::new(Some(20.0), Some(50.0), None)
        );
    }

    #[test]
    fn resolving_lengths_is_positional() {
        assert_eq!(
            resolve("10px 20 -5px").unwrap(),
            PartialVector3::new(Some(10.0), Some(20.0), Some(-5.0))
        );
        assert_eq!(
            resolve("left 25% 3").unwrap(),
            PartialVector3::new(Some(0.0), Some(25.0), Some(3.0))
        );
    }

    #[test]
    fn resolving_malformed_keywords_fails() {
        for keywords in ["", "sideways", "10% 10% 10%", "1 2 3 4", "abc%"] {
            assert!(
                matches!(resolve(keywords), Err(TransformError::MalformedOrigin { .. })),
                "{keywords} should be malformed"
            );
        }
    }
}
