/// The UV rectangle a sprite occupies on its atlas, in 0-1 units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl AtlasRegion {
    /// The region covering a whole standalone texture.
    pub const FULL: AtlasRegion = AtlasRegion {
        u_min: 0.0,
        v_min: 0.0,
        u_max: 1.0,
        v_max: 1.0,
    };

    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }
}
