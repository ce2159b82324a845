//! Response body format of the rendering service.
//!
//! Bodies are a JSON array of channel values, RGBA row-major, one integer per
//! byte. The service answers `[]` when it fails internally, which surfaces here
//! as a size mismatch.

use foundation::Dimensions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedResponseError {
    /// Not a JSON array of integers in `0..=255`.
    InvalidJson(String),
    NotRgba { len: usize },
    SizeMismatch { expected: usize, actual: usize },
    /// The requested dimensions cannot be represented in memory.
    DimensionsTooLarge(Dimensions),
}

impl std::fmt::Display for MalformedResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedResponseError::InvalidJson(msg) => {
                write!(f, "response is not a byte array: {msg}")
            }
            MalformedResponseError::NotRgba { len } => {
                write!(f, "response length {len} is not a multiple of 4")
            }
            MalformedResponseError::SizeMismatch { expected, actual } => {
                write!(f, "response has {actual} bytes, expected {expected}")
            }
            MalformedResponseError::DimensionsTooLarge(dims) => {
                write!(f, "requested size {dims} is too large")
            }
        }
    }
}

impl std::error::Error for MalformedResponseError {}

/// Parse a response body and check it against the requested surface size.
pub fn parse_pixel_payload(
    body: &str,
    dims: Dimensions,
) -> Result<Vec<u8>, MalformedResponseError> {
    let bytes: Vec<u8> = serde_json::from_str(body)
        .map_err(|e| MalformedResponseError::InvalidJson(e.to_string()))?;

    if bytes.len() % Dimensions::BYTES_PER_PIXEL != 0 {
        return Err(MalformedResponseError::NotRgba { len: bytes.len() });
    }

    let expected = dims
        .rgba_len()
        .ok_or(MalformedResponseError::DimensionsTooLarge(dims))?;
    if bytes.len() != expected {
        return Err(MalformedResponseError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_payload() {
        let bytes =
            parse_pixel_payload("[255,0,0,255, 0,255,0,255]", Dimensions::new(2, 1)).unwrap();
        assert_eq!(bytes, vec![255, 0, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn rejects_length_not_multiple_of_four() {
        assert_eq!(
            parse_pixel_payload("[1,2,3]", Dimensions::new(2, 1)),
            Err(MalformedResponseError::NotRgba { len: 3 })
        );
    }

    #[test]
    fn rejects_wrong_pixel_count() {
        assert_eq!(
            parse_pixel_payload("[1,2,3,4]", Dimensions::new(2, 1)),
            Err(MalformedResponseError::SizeMismatch {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn service_failure_body_is_malformed() {
        assert_eq!(
            parse_pixel_payload("[]", Dimensions::new(1080, 480)),
            Err(MalformedResponseError::SizeMismatch {
                expected: 1080 * 480 * 4,
                actual: 0
            })
        );
    }

    #[test]
    fn rejects_out_of_range_and_non_arrays() {
        for body in ["[256,0,0,0]", "[-1,0,0,0]", "[1.5,0,0,0]", "{\"a\":1}", "oops"] {
            assert!(
                matches!(
                    parse_pixel_payload(body, Dimensions::new(1, 1)),
                    Err(MalformedResponseError::InvalidJson(_))
                ),
                "{body}"
            );
        }
    }
}
