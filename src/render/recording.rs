use super::{Hsl, Renderer, Transform};
use serde::{Deserialize, Serialize};

/// One capability invocation, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RenderCall {
    Clear,
    Circle { radius: f64 },
    Rect { width: f64, height: f64 },
    Line { length: f64 },
    Triangle { size: f64 },
    Ellipse { rx: f64, ry: f64 },
    Noise { seed: i64, intensity: f64 },
    Translate { dx: f64, dy: f64 },
    Rotate { degrees: f64 },
    Scale { factor: f64 },
    SetColor { hue: f64, saturation: f64, lightness: f64 },
    SetTransform { transform: Transform },
}

impl RenderCall {
    /// True for calls that put marks on the surface.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            RenderCall::Circle { .. }
                | RenderCall::Rect { .. }
                | RenderCall::Line { .. }
                | RenderCall::Triangle { .. }
                | RenderCall::Ellipse { .. }
                | RenderCall::Noise { .. }
        )
    }
}

/// In-memory renderer that keeps a trace of every call.
///
/// Translation is applied in surface coordinates, rotation accumulates in
/// degrees and scale multiplies. `clear` empties nothing from the trace; use
/// [`RecordingRenderer::take_calls`] to drain it.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    width: f64,
    height: f64,
    transform: Transform,
    color: Hsl,
    calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            transform: Transform::centered(width, height),
            color: Hsl::default(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    /// Calls that draw something, in order.
    pub fn drawing_calls(&self) -> Vec<&RenderCall> {
        self.calls.iter().filter(|c| c.is_drawing()).collect()
    }

    pub fn color(&self) -> Hsl {
        self.color
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new(400.0, 400.0)
    }
}

impl Renderer for RecordingRenderer {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.transform = Transform::centered(self.width, self.height);
        self.color = Hsl::default();
        self.calls.push(RenderCall::Clear);
    }

    fn circle(&mut self, radius: f64) {
        self.calls.push(RenderCall::Circle { radius });
    }

    fn rect(&mut self, width: f64, height: f64) {
        self.calls.push(RenderCall::Rect { width, height });
    }

    fn line(&mut self, length: f64) {
        self.calls.push(RenderCall::Line { length });
    }

    fn triangle(&mut self, size: f64) {
        self.calls.push(RenderCall::Triangle { size });
    }

    fn ellipse(&mut self, rx: f64, ry: f64) {
        self.calls.push(RenderCall::Ellipse { rx, ry });
    }

    fn noise(&mut self, seed: i64, intensity: f64) {
        self.calls.push(RenderCall::Noise { seed, intensity });
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform.x += dx;
        self.transform.y += dy;
        self.calls.push(RenderCall::Translate { dx, dy });
    }

    fn rotate(&mut self, degrees: f64) {
        self.transform.rotation += degrees;
        self.calls.push(RenderCall::Rotate { degrees });
    }

    fn scale(&mut self, factor: f64) {
        self.transform.scale *= factor;
        self.calls.push(RenderCall::Scale { factor });
    }

    fn set_color(&mut self, hue: f64, saturation: f64, lightness: f64) {
        self.color = Hsl {
            hue,
            saturation,
            lightness,
        };
        self.calls.push(RenderCall::SetColor {
            hue,
            saturation,
            lightness,
        });
    }

    fn current_transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, target: Transform) {
        self.transform = target;
        self.calls.push(RenderCall::SetTransform { transform: target });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_composition() {
        let mut r = RecordingRenderer::new(100.0, 50.0);
        assert_eq!(r.current_transform(), Transform::centered(100.0, 50.0));
        r.translate(10.0, -5.0);
        r.rotate(90.0);
        r.rotate(45.0);
        r.scale(2.0);
        r.scale(1.5);
        let t = r.current_transform();
        assert_eq!((t.x, t.y), (60.0, 20.0));
        assert_eq!(t.rotation, 135.0);
        assert_eq!(t.scale, 3.0);
    }

    #[test]
    fn test_clear_recenters() {
        let mut r = RecordingRenderer::new(100.0, 100.0);
        r.translate(5.0, 5.0);
        r.set_color(120.0, 50.0, 50.0);
        r.clear();
        assert_eq!(r.current_transform(), Transform::centered(100.0, 100.0));
        assert_eq!(r.color(), Hsl::default());
    }

    #[test]
    fn test_drawing_calls_filter() {
        let mut r = RecordingRenderer::default();
        r.circle(3.0);
        r.translate(1.0, 1.0);
        r.rect(1.0, 2.0);
        assert_eq!(r.calls().len(), 3);
        assert_eq!(r.drawing_calls().len(), 2);
    }

    /// Renderer without a direct transform setter, to exercise the provided method.
    struct RelativeOnly(RecordingRenderer);

    impl Renderer for RelativeOnly {
        fn width(&self) -> f64 {
            self.0.width()
        }
        fn height(&self) -> f64 {
            self.0.height()
        }
        fn clear(&mut self) {
            self.0.clear()
        }
        fn circle(&mut self, radius: f64) {
            self.0.circle(radius)
        }
        fn rect(&mut self, width: f64, height: f64) {
            self.0.rect(width, height)
        }
        fn line(&mut self, length: f64) {
            self.0.line(length)
        }
        fn triangle(&mut self, size: f64) {
            self.0.triangle(size)
        }
        fn ellipse(&mut self, rx: f64, ry: f64) {
            self.0.ellipse(rx, ry)
        }
        fn noise(&mut self, seed: i64, intensity: f64) {
            self.0.noise(seed, intensity)
        }
        fn translate(&mut self, dx: f64, dy: f64) {
            self.0.translate(dx, dy)
        }
        fn rotate(&mut self, degrees: f64) {
            self.0.rotate(degrees)
        }
        fn scale(&mut self, factor: f64) {
            self.0.scale(factor)
        }
        fn set_color(&mut self, hue: f64, saturation: f64, lightness: f64) {
            self.0.set_color(hue, saturation, lightness)
        }
        fn current_transform(&self) -> Transform {
            self.0.current_transform()
        }
    }

    #[test]
    fn test_default_set_transform_uses_relative_calls() {
        let mut r = RelativeOnly(RecordingRenderer::new(100.0, 100.0));
        r.translate(10.0, 20.0);
        r.rotate(30.0);
        r.scale(4.0);
        let target = Transform::centered(100.0, 100.0);
        r.set_transform(target);
        assert_eq!(r.current_transform(), target);
    }
}
