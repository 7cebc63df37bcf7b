pub mod color;
pub mod hit;
pub mod paint;

pub use color::Color;
pub use hit::{Candidate, candidates_at, hit_test_pin, hit_test_regions, pin_footprint};
pub use paint::{Outline, PaintSurface, Primitive, SurfaceSync, paint_document, paint_drawing_preview};
