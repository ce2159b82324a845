//! Viewpoint parameters as edited by the user.
//!
//! The model stores free-form text per field so partially typed input survives
//! editing. Coercion into typed values only happens in
//! [`ParameterModel::snapshot`], which is the single gate every request goes
//! through.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dimensions::Dimensions;

/// Longitude and latitude travel as integers in 1/10000 of a degree.
pub const COORDINATE_SCALE: f64 = 10_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamField {
    Longitude,
    Latitude,
    Elevation,
    Azimuth,
    FieldOfView,
    MaxDistance,
    ImageWidth,
    ImageHeight,
    SamplingExponent,
}

impl ParamField {
    /// Every field, in the order the compute endpoint expects its query keys.
    pub const ALL: [ParamField; 9] = [
        ParamField::Longitude,
        ParamField::Latitude,
        ParamField::Elevation,
        ParamField::Azimuth,
        ParamField::FieldOfView,
        ParamField::MaxDistance,
        ParamField::ImageWidth,
        ParamField::ImageHeight,
        ParamField::SamplingExponent,
    ];

    /// Wire name of the field.
    pub fn key(self) -> &'static str {
        match self {
            ParamField::Longitude => "longitude",
            ParamField::Latitude => "latitude",
            ParamField::Elevation => "elevation",
            ParamField::Azimuth => "azimuth",
            ParamField::FieldOfView => "fieldOfView",
            ParamField::MaxDistance => "maxDistance",
            ParamField::ImageWidth => "imageWidth",
            ParamField::ImageHeight => "imageHeight",
            ParamField::SamplingExponent => "samplingExponent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamField::Longitude => "Longitude",
            ParamField::Latitude => "Latitude",
            ParamField::Elevation => "Elevation",
            ParamField::Azimuth => "Azimuth",
            ParamField::FieldOfView => "Field of View",
            ParamField::MaxDistance => "Max Distance",
            ParamField::ImageWidth => "Width",
            ParamField::ImageHeight => "Height",
            ParamField::SamplingExponent => "Sampling Exponent",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    fn kind(self) -> FieldKind {
        match self {
            ParamField::Longitude
            | ParamField::Latitude
            | ParamField::Elevation
            | ParamField::Azimuth => FieldKind::Signed,
            ParamField::FieldOfView | ParamField::MaxDistance => FieldKind::Positive,
            ParamField::ImageWidth | ParamField::ImageHeight => FieldKind::Size,
            ParamField::SamplingExponent => FieldKind::Unsigned,
        }
    }
}

impl std::fmt::Display for ParamField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FieldKind {
    /// Any i32.
    Signed,
    /// i32 strictly greater than zero.
    Positive,
    /// u32, zero allowed.
    Unsigned,
    /// u32 of at least one pixel.
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidParameterError {
    UnknownField(String),
    NotAnInteger { field: ParamField, value: String },
    OutOfRange { field: ParamField, value: String, expected: &'static str },
}

impl InvalidParameterError {
    /// The offending field, when the key was recognised.
    pub fn field(&self) -> Option<ParamField> {
        match self {
            InvalidParameterError::UnknownField(_) => None,
            InvalidParameterError::NotAnInteger { field, .. }
            | InvalidParameterError::OutOfRange { field, .. } => Some(*field),
        }
    }
}

impl std::fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidParameterError::UnknownField(key) => write!(f, "unknown parameter: {key}"),
            InvalidParameterError::NotAnInteger { field, value } => {
                write!(f, "{} must be an integer, got {value:?}", field.label())
            }
            InvalidParameterError::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{} must be {expected}, got {value:?}", field.label()),
        }
    }
}

impl std::error::Error for InvalidParameterError {}

/// Typed view of a [`ParameterModel`], valid by construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSnapshot {
    pub longitude: i32,
    pub latitude: i32,
    /// Meters.
    pub elevation: i32,
    /// Degrees.
    pub azimuth: i32,
    /// Degrees.
    pub field_of_view: i32,
    /// Kilometers.
    pub max_distance: i32,
    pub image_width: u32,
    pub image_height: u32,
    pub sampling_exponent: u32,
}

impl ParameterSnapshot {
    /// Decimal string form of one field, as sent on the wire.
    pub fn value_string(&self, field: ParamField) -> String {
        match field {
            ParamField::Longitude => self.longitude.to_string(),
            ParamField::Latitude => self.latitude.to_string(),
            ParamField::Elevation => self.elevation.to_string(),
            ParamField::Azimuth => self.azimuth.to_string(),
            ParamField::FieldOfView => self.field_of_view.to_string(),
            ParamField::MaxDistance => self.max_distance.to_string(),
            ParamField::ImageWidth => self.image_width.to_string(),
            ParamField::ImageHeight => self.image_height.to_string(),
            ParamField::SamplingExponent => self.sampling_exponent.to_string(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image_width, self.image_height)
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude as f64 / COORDINATE_SCALE
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude as f64 / COORDINATE_SCALE
    }
}

/// Immutable starting values for a [`ParameterModel`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultParameters(ParameterSnapshot);

impl DefaultParameters {
    pub const fn new(values: ParameterSnapshot) -> Self {
        DefaultParameters(values)
    }

    pub fn values(&self) -> &ParameterSnapshot {
        &self.0
    }
}

impl Default for DefaultParameters {
    fn default() -> Self {
        DefaultParameters(crate::presets::ALPES_DU_JURA)
    }
}

/// Editable parameter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterModel {
    values: BTreeMap<ParamField, String>,
}

impl ParameterModel {
    pub fn new(defaults: &DefaultParameters) -> Self {
        let mut model = Self {
            values: BTreeMap::new(),
        };
        model.reset(defaults);
        model
    }

    /// Overwrite every field with `defaults`.
    pub fn reset(&mut self, defaults: &DefaultParameters) {
        for field in ParamField::ALL {
            self.values
                .insert(field, defaults.values().value_string(field));
        }
    }

    /// Store the edited text verbatim; no validation happens here.
    pub fn set(&mut self, field: ParamField, raw: impl Into<String>) {
        self.values.insert(field, raw.into());
    }

    pub fn set_by_key(
        &mut self,
        key: &str,
        raw: impl Into<String>,
    ) -> Result<ParamField, InvalidParameterError> {
        let field = ParamField::from_key(key)
            .ok_or_else(|| InvalidParameterError::UnknownField(key.to_string()))?;
        self.set(field, raw);
        Ok(field)
    }

    pub fn get(&self, field: ParamField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Coerce every field to its typed value, failing on the first bad one in
    /// wire order.
    pub fn snapshot(&self) -> Result<ParameterSnapshot, InvalidParameterError> {
        Ok(ParameterSnapshot {
            longitude: self.signed(ParamField::Longitude)?,
            latitude: self.signed(ParamField::Latitude)?,
            elevation: self.signed(ParamField::Elevation)?,
            azimuth: self.signed(ParamField::Azimuth)?,
            field_of_view: self.signed(ParamField::FieldOfView)?,
            max_distance: self.signed(ParamField::MaxDistance)?,
            image_width: self.unsigned(ParamField::ImageWidth)?,
            image_height: self.unsigned(ParamField::ImageHeight)?,
            sampling_exponent: self.unsigned(ParamField::SamplingExponent)?,
        })
    }

    /// Coerce only `imageWidth` and `imageHeight`, for requests that carry no
    /// other parameter.
    pub fn dimensions(&self) -> Result<Dimensions, InvalidParameterError> {
        Ok(Dimensions::new(
            self.unsigned(ParamField::ImageWidth)?,
            self.unsigned(ParamField::ImageHeight)?,
        ))
    }

    fn signed(&self, field: ParamField) -> Result<i32, InvalidParameterError> {
        let raw = self.get(field).trim();
        let value: i32 = raw
            .parse()
            .map_err(|_| InvalidParameterError::NotAnInteger {
                field,
                value: raw.to_string(),
            })?;
        if field.kind() == FieldKind::Positive && value <= 0 {
            return Err(InvalidParameterError::OutOfRange {
                field,
                value: raw.to_string(),
                expected: "greater than zero",
            });
        }
        Ok(value)
    }

    fn unsigned(&self, field: ParamField) -> Result<u32, InvalidParameterError> {
        let raw = self.get(field).trim();
        let negated = raw
            .strip_prefix('-')
            .filter(|digits| !digits.starts_with('+'))
            .and_then(|digits| digits.parse::<u32>().ok());
        let value: u32 = match negated {
            // "-0" is still zero.
            Some(0) => 0,
            // A negative number is a range problem, not a typing one.
            Some(_) => {
                return Err(InvalidParameterError::OutOfRange {
                    field,
                    value: raw.to_string(),
                    expected: "zero or more",
                });
            }
            None => raw
                .parse()
                .map_err(|_| InvalidParameterError::NotAnInteger {
                    field,
                    value: raw.to_string(),
                })?,
        };
        if field.kind() == FieldKind::Size && value == 0 {
            return Err(InvalidParameterError::OutOfRange {
                field,
                value: raw.to_string(),
                expected: "at least 1",
            });
        }
        Ok(value)
    }
}

impl Default for ParameterModel {
    fn default() -> Self {
        Self::new(&DefaultParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_preserved_verbatim() {
        let model = ParameterModel::default();
        let snap = model.snapshot().unwrap();
        assert_eq!(
            snap,
            ParameterSnapshot {
                longitude: 68087,
                latitude: 470085,
                elevation: 1380,
                azimuth: 162,
                field_of_view: 27,
                max_distance: 300,
                image_width: 1080,
                image_height: 480,
                sampling_exponent: 0,
            }
        );
        assert_eq!(model.get(ParamField::Longitude), "68087");
    }

    #[test]
    fn set_stores_text_verbatim() {
        let mut model = ParameterModel::default();
        model.set(ParamField::Azimuth, "9x");
        assert_eq!(model.get(ParamField::Azimuth), "9x");
    }

    #[test]
    fn snapshot_names_offending_field() {
        let mut model = ParameterModel::default();
        model.set(ParamField::Elevation, "high");
        let err = model.snapshot().unwrap_err();
        assert_eq!(err.field(), Some(ParamField::Elevation));
        assert_eq!(
            err,
            InvalidParameterError::NotAnInteger {
                field: ParamField::Elevation,
                value: "high".to_string(),
            }
        );
    }

    #[test]
    fn snapshot_trims_whitespace() {
        let mut model = ParameterModel::default();
        model.set(ParamField::Azimuth, " 90 ");
        assert_eq!(model.snapshot().unwrap().azimuth, 90);
    }

    #[test]
    fn fractional_values_are_rejected() {
        let mut model = ParameterModel::default();
        model.set(ParamField::FieldOfView, "27.5");
        assert_eq!(model.snapshot().unwrap_err().field(), Some(ParamField::FieldOfView));
    }

    #[test]
    fn ranges_are_checked() {
        let cases = [
            (ParamField::FieldOfView, "0"),
            (ParamField::MaxDistance, "-3"),
            (ParamField::ImageWidth, "0"),
            (ParamField::ImageHeight, "-1"),
            (ParamField::SamplingExponent, "-2"),
        ];
        for (field, raw) in cases {
            let mut model = ParameterModel::default();
            model.set(field, raw);
            match model.snapshot() {
                Err(InvalidParameterError::OutOfRange { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field}={raw}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn negative_zero_counts_as_zero() {
        let mut model = ParameterModel::default();
        model.set(ParamField::SamplingExponent, "-0");
        model.set(ParamField::Azimuth, "-0");
        let snap = model.snapshot().unwrap();
        assert_eq!(snap.sampling_exponent, 0);
        assert_eq!(snap.azimuth, 0);

        model.set(ParamField::ImageWidth, "-0");
        assert_eq!(
            model.snapshot().unwrap_err(),
            InvalidParameterError::OutOfRange {
                field: ParamField::ImageWidth,
                value: "-0".to_string(),
                expected: "at least 1",
            }
        );
    }

    #[test]
    fn doubled_sign_is_not_an_integer() {
        let mut model = ParameterModel::default();
        model.set(ParamField::SamplingExponent, "-+2");
        assert_eq!(
            model.snapshot().unwrap_err(),
            InvalidParameterError::NotAnInteger {
                field: ParamField::SamplingExponent,
                value: "-+2".to_string(),
            }
        );
    }

    #[test]
    fn dimensions_ignore_other_fields() {
        let mut model = ParameterModel::default();
        model.set(ParamField::Azimuth, "east");
        model.set(ParamField::ImageWidth, "2");
        model.set(ParamField::ImageHeight, "1");
        assert_eq!(model.dimensions(), Ok(Dimensions::new(2, 1)));

        model.set(ParamField::ImageHeight, "0");
        assert_eq!(
            model.dimensions().unwrap_err().field(),
            Some(ParamField::ImageHeight)
        );
    }

    #[test]
    fn snapshot_serializes_with_wire_names() {
        let json = serde_json::to_value(ParameterModel::default().snapshot().unwrap()).unwrap();
        assert_eq!(json["fieldOfView"], 27);
        assert_eq!(json["samplingExponent"], 0);
        assert_eq!(json.as_object().unwrap().len(), ParamField::ALL.len());
    }

    #[test]
    fn negative_coordinates_are_allowed() {
        let mut model = ParameterModel::default();
        model.set(ParamField::Longitude, "-1200");
        model.set(ParamField::Elevation, "-20");
        let snap = model.snapshot().unwrap();
        assert_eq!(snap.longitude, -1200);
        assert_eq!(snap.elevation, -20);
    }

    #[test]
    fn set_by_key_uses_wire_names() {
        let mut model = ParameterModel::default();
        assert_eq!(model.set_by_key("fieldOfView", "45"), Ok(ParamField::FieldOfView));
        assert_eq!(model.get(ParamField::FieldOfView), "45");
        assert_eq!(
            model.set_by_key("fov", "45"),
            Err(InvalidParameterError::UnknownField("fov".to_string()))
        );
    }

    #[test]
    fn reset_restores_defaults() {
        let defaults = DefaultParameters::default();
        let mut model = ParameterModel::new(&defaults);
        model.set(ParamField::Latitude, "");
        model.reset(&defaults);
        assert_eq!(model.snapshot().unwrap(), *defaults.values());
    }

    #[test]
    fn fixed_point_coordinates_convert_to_degrees() {
        let snap = ParameterModel::default().snapshot().unwrap();
        assert!((snap.longitude_degrees() - 6.8087).abs() < 1e-9);
        assert!((snap.latitude_degrees() - 47.0085).abs() < 1e-9);
    }
}
