//! Model matrix: places the model's canvas in view space from its layout block.

use hashbrown::HashMap;
use nalgebra::{Matrix4, Point3, Vector2};

/// Column-major 4x4 with only scale (uniform in x/y) and translation in use.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelMatrix {
    tr: Matrix4<f32>,
    width: f32,
    height: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LayoutKey {
    Width,
    Height,
    X,
    Y,
    CenterX,
    CenterY,
    Top,
    Bottom,
    Left,
    Right,
}

impl LayoutKey {
    /// Accepts both `CenterX` and `center_x` spellings.
    fn parse(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Some(match normalized.as_str() {
            "width" => LayoutKey::Width,
            "height" => LayoutKey::Height,
            "x" => LayoutKey::X,
            "y" => LayoutKey::Y,
            "centerx" => LayoutKey::CenterX,
            "centery" => LayoutKey::CenterY,
            "top" => LayoutKey::Top,
            "bottom" => LayoutKey::Bottom,
            "left" => LayoutKey::Left,
            "right" => LayoutKey::Right,
            _ => return None,
        })
    }

    fn is_size(self) -> bool {
        matches!(self, LayoutKey::Width | LayoutKey::Height)
    }
}

impl ModelMatrix {
    /// Matrix for a canvas of `width` x `height` model units, scaled to a height of 1.
    pub fn new(width: f32, height: f32) -> Self {
        let mut m = Self {
            tr: Matrix4::identity(),
            width,
            height,
        };
        m.set_height(1.0);
        m
    }

    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.tr
    }

    pub fn scale_x(&self) -> f32 {
        self.tr[(0, 0)]
    }

    pub fn scale_y(&self) -> f32 {
        self.tr[(1, 1)]
    }

    pub fn translate_x(&mut self, x: f32) {
        self.tr[(0, 3)] = x;
    }

    pub fn translate_y(&mut self, y: f32) {
        self.tr[(1, 3)] = y;
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.translate_x(x);
        self.translate_y(y);
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.tr[(0, 0)] = x;
        self.tr[(1, 1)] = y;
    }

    /// Scale uniformly so the canvas is `w` units wide. No-op for a zero-width canvas.
    pub fn set_width(&mut self, w: f32) {
        if self.width != 0.0 {
            let s = w / self.width;
            self.scale(s, s);
        }
    }

    /// Scale uniformly so the canvas is `h` units tall. No-op for a zero-height canvas.
    pub fn set_height(&mut self, h: f32) {
        if self.height != 0.0 {
            let s = h / self.height;
            self.scale(s, s);
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.translate(x, y);
    }

    pub fn set_center_position(&mut self, x: f32, y: f32) {
        self.center_x(x);
        self.center_y(y);
    }

    pub fn top(&mut self, y: f32) {
        self.translate_y(y);
    }

    pub fn bottom(&mut self, y: f32) {
        let h = self.height * self.scale_y();
        self.translate_y(y - h);
    }

    pub fn left(&mut self, x: f32) {
        self.translate_x(x);
    }

    pub fn right(&mut self, x: f32) {
        let w = self.width * self.scale_x();
        self.translate_x(x - w);
    }

    pub fn center_x(&mut self, x: f32) {
        let w = self.width * self.scale_x();
        self.translate_x(x - w / 2.0);
    }

    pub fn center_y(&mut self, y: f32) {
        let h = self.height * self.scale_y();
        self.translate_y(y - h / 2.0);
    }

    /// Apply a layout block. Size keys run before position keys so that centring and
    /// edge alignment see the final scale; unknown keys are ignored.
    pub fn setup_from_layout(&mut self, layout: &HashMap<String, f32>) {
        let mut keys: Vec<(LayoutKey, f32)> = layout
            .iter()
            .filter_map(|(k, v)| match LayoutKey::parse(k) {
                Some(key) => Some((key, *v)),
                None => {
                    log::warn!("unknown layout key '{k}'");
                    None
                }
            })
            .collect();
        keys.sort_by_key(|(key, _)| !key.is_size());

        for (key, v) in keys {
            match key {
                LayoutKey::Width => self.set_width(v),
                LayoutKey::Height => self.set_height(v),
                LayoutKey::X => self.translate_x(v),
                LayoutKey::Y => self.translate_y(v),
                LayoutKey::CenterX => self.center_x(v),
                LayoutKey::CenterY => self.center_y(v),
                LayoutKey::Top => self.top(v),
                LayoutKey::Bottom => self.bottom(v),
                LayoutKey::Left => self.left(v),
                LayoutKey::Right => self.right(v),
            }
        }
    }

    pub fn transform_point(&self, p: Vector2<f32>) -> Vector2<f32> {
        let out = self.tr.transform_point(&Point3::new(p.x, p.y, 0.0));
        Vector2::new(out.x, out.y)
    }
}
