pub mod dimensions;
pub mod ids;
pub mod params;
pub mod presets;

// Foundation crate: small, well-tested primitives only.
pub use dimensions::*;
pub use ids::*;
pub use params::*;
