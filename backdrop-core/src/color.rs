/// Linear RGB color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// `t * a + (1 - t) * b`, so `t = 1` yields `a`
    pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Self {
        Self {
            r: t * a.r + (1.0 - t) * b.r,
            g: t * a.g + (1.0 - t) * b.g,
            b: t * a.b + (1.0 - t) * b.b,
        }
    }

    /// Composite over black at the given opacity
    pub fn scaled(self, k: f32) -> Self {
        let k = k.clamp(0.0, 1.0);
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
        }
    }

    /// Saturating add, the terminal stand-in for additive blending
    pub fn add(self, other: Rgb) -> Self {
        Self {
            r: (self.r + other.r).min(1.0),
            g: (self.g + other.g).min(1.0),
            b: (self.b + other.b).min(1.0),
        }
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }

    /// CSS `rgba(...)` string at the given alpha
    pub fn to_css(self, alpha: f32) -> String {
        let (r, g, b) = self.to_u8();
        format!("rgba({}, {}, {}, {})", r, g, b, alpha.clamp(0.0, 1.0))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = Rgb::from_hex(0x00d4ff);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 212.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 1.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(0.0, 0.83, 1.0);
        let b = Rgb::new(0.48, 0.38, 1.0);
        assert_eq!(Rgb::lerp(a, b, 1.0), a);
        assert_eq!(Rgb::lerp(a, b, 0.0), b);

        let mid = Rgb::lerp(a, b, 0.5);
        assert!((mid.r - 0.24).abs() < 1e-6);
        assert!((mid.g - 0.605).abs() < 1e-6);
    }

    #[test]
    fn test_css_string() {
        assert_eq!(Rgb::from_hex(0x7b61ff).to_css(0.15), "rgba(123, 97, 255, 0.15)");
    }
}
