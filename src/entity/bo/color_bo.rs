use serde::{Deserialize, Serialize};

/// rgb color as produced by sliders and pickers, channels are 0..255
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBo {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ColorBo {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        ColorBo { r, g, b }
    }

    pub fn black() -> Self {
        ColorBo::new(0.0, 0.0, 0.0)
    }

    /// channels truncated with floor, no range check
    pub fn to_int_array(&self) -> [i64; 3] {
        [
            self.r.floor() as i64,
            self.g.floor() as i64,
            self.b.floor() as i64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor() {
        assert_eq!(ColorBo::new(10.7, 0.2, 255.9).to_int_array(), [10, 0, 255]);
    }
}
