use crate::shared::point::Point;

/// Drives the on-screen pointer. Coordinates are absolute screen pixels.
pub trait Pointer: Send {
    fn move_to(&mut self, target: Point) -> Result<(), Box<dyn std::error::Error>>;
    fn click(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
