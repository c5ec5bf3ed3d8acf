//! Phong material presets

/// Colors and shininess of an untextured phong surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    /// Ambient reflectance
    pub ambient: [f32; 3],
    /// Diffuse reflectance
    pub diffuse: [f32; 3],
    /// Specular reflectance
    pub specular: [f32; 3],
    /// Specular exponent
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            ambient: [1.0, 0.5, 0.31],
            diffuse: [1.0, 0.5, 0.31],
            specular: [0.5, 0.5, 0.5],
            shininess: 32.0,
        }
    }
}

/// Emerald
pub const EMERALD: PhongMaterial = PhongMaterial {
    ambient: [0.0215, 0.1745, 0.0215],
    diffuse: [0.075_68, 0.614_24, 0.075_68],
    specular: [0.633, 0.727_811, 0.633],
    shininess: 0.6 * 128.0,
};

/// Jade
pub const JADE: PhongMaterial = PhongMaterial {
    ambient: [0.135, 0.2225, 0.1575],
    diffuse: [0.54, 0.89, 0.63],
    specular: [0.316_228, 0.316_228, 0.316_228],
    shininess: 0.1 * 128.0,
};

/// Obsidian
pub const OBSIDIAN: PhongMaterial = PhongMaterial {
    ambient: [0.053_75, 0.05, 0.066_25],
    diffuse: [0.182_75, 0.17, 0.225_25],
    specular: [0.332_741, 0.328_634, 0.346_435],
    shininess: 0.3 * 128.0,
};

/// Pearl
pub const PEARL: PhongMaterial = PhongMaterial {
    ambient: [0.25, 0.207_25, 0.207_25],
    diffuse: [1.0, 0.829, 0.829],
    specular: [0.296_648, 0.296_648, 0.296_648],
    shininess: 0.088 * 128.0,
};
