//! The drawing surface the machine drives.
//!
//! Backends (canvas, audio, image files) live outside this crate and implement
//! [`Renderer`]. All calls are synchronous. The renderer owns the composed
//! transform; the machine only mirrors it for snapshots.

pub mod recording;

use serde::{Deserialize, Serialize};

pub use recording::{RecordingRenderer, RenderCall};

/// Position, rotation (degrees) and uniform scale of the drawing cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
}

impl Transform {
    /// Identity transform positioned at the middle of a `width` x `height` surface.
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            x: width / 2.0,
            y: height / 2.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Hue in degrees `[0, 360)`, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Capabilities a drawing backend must provide.
pub trait Renderer {
    /// Surface width in pixels; literal operands scale against it.
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Wipes the surface and resets the transform to the centre.
    fn clear(&mut self);

    fn circle(&mut self, radius: f64);
    fn rect(&mut self, width: f64, height: f64);
    fn line(&mut self, length: f64);
    fn triangle(&mut self, size: f64);
    fn ellipse(&mut self, rx: f64, ry: f64);
    fn noise(&mut self, seed: i64, intensity: f64);

    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, degrees: f64);
    fn scale(&mut self, factor: f64);
    fn set_color(&mut self, hue: f64, saturation: f64, lightness: f64);

    fn current_transform(&self) -> Transform;

    /// Moves the renderer to `target` using relative calls.
    ///
    /// A zero current scale cannot be undone by a ratio; backends that can set
    /// their transform directly should override this.
    fn set_transform(&mut self, target: Transform) {
        let current = self.current_transform();
        self.translate(target.x - current.x, target.y - current.y);
        self.rotate(target.rotation - current.rotation);
        if current.scale != 0.0 && target.scale != current.scale {
            self.scale(target.scale / current.scale);
        }
    }
}
