use std::path::PathBuf;

/// How a material combines its texture layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaterialType {
    /// Single texture layer (or none).
    #[default]
    Solid,
    /// Two texture layers blended by the vertex colour's alpha.
    SolidTwoLayer,
}

/// Surface appearance and fixed-function state for a scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub material_type: MaterialType,
    /// Linear RGBA.
    pub ambient: [f32; 4],
    /// Linear RGBA.
    pub diffuse: [f32; 4],
    pub wireframe: bool,
    pub backface_culling: bool,
    pub lighting: bool,
    /// Interpolate lighting across faces instead of flat shading.
    pub gouraud_shading: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub shininess: f32,
    /// Texture files for layer 0 and layer 1.
    pub layers: [Option<PathBuf>; 2],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            material_type: MaterialType::Solid,
            ambient: [1.0; 4],
            diffuse: [1.0; 4],
            wireframe: false,
            backface_culling: true,
            lighting: true,
            gouraud_shading: true,
            depth_test: true,
            depth_write: true,
            shininess: 0.0,
            layers: [None, None],
        }
    }
}

impl Material {
    /// Number of texture layers the shader should sample.
    pub fn layer_count(&self) -> usize {
        match self.material_type {
            MaterialType::Solid => 1,
            MaterialType::SolidTwoLayer => 2,
        }
    }

    /// Convert an 8-bit sRGB-style colour to normalised RGBA.
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> [f32; 4] {
        [r, g, b, a].map(|c| c as f32 / 255.0)
    }
}
