//! Predefined viewpoints known to the rendering service.

use crate::params::ParameterSnapshot;

/// The Alps seen from the Jura mountains. Doubles as the viewer default.
pub const ALPES_DU_JURA: ParameterSnapshot = ParameterSnapshot {
    longitude: 68087,
    latitude: 470085,
    elevation: 1380,
    azimuth: 162,
    field_of_view: 27,
    max_distance: 300,
    image_width: 1080,
    image_height: 480,
    sampling_exponent: 0,
};

/// The Niesen seen from lake Thun.
pub const NIESEN: ParameterSnapshot = ParameterSnapshot {
    longitude: 76500,
    latitude: 467300,
    elevation: 600,
    azimuth: 180,
    field_of_view: 110,
    max_distance: 300,
    image_width: 1080,
    image_height: 480,
    sampling_exponent: 0,
};

pub const PRESETS: [(&str, ParameterSnapshot); 2] =
    [("alpes-du-jura", ALPES_DU_JURA), ("niesen", NIESEN)];

/// Case-insensitive lookup by preset name.
pub fn find(name: &str) -> Option<ParameterSnapshot> {
    PRESETS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, p)| *p)
}
