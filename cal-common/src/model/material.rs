//! Surface colors and texture bindings.

use super::Tolerance;

/// Role assumed for a map that does not name one.
pub const DEFAULT_MAP_ROLE: &str = "Diffuse Color";

/// A texture bound to a material under a role such as `"Opacity"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialMap {
    pub role: String,
    pub filename: String,
}

impl MaterialMap {
    pub fn new(role: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            filename: filename.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// RGBA, one byte per channel
    pub ambient: [u8; 4],
    pub diffuse: [u8; 4],
    pub specular: [u8; 4],
    pub shininess: f32,
    /// In file order; roles may repeat
    pub maps: Vec<MaterialMap>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [255; 4],
            diffuse: [255; 4],
            specular: [255; 4],
            shininess: 0.0,
            maps: Vec::new(),
        }
    }
}

impl Material {
    pub fn approx_eq(&self, other: &Material, tol: Tolerance) -> bool {
        self.ambient == other.ambient
            && self.diffuse == other.diffuse
            && self.specular == other.specular
            && tol.scalar(self.shininess, other.shininess)
            && self.maps == other.maps
    }
}
