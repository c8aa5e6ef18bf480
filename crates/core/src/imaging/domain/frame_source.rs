use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Produces the image that detection runs on.
///
/// With a region, the returned frame covers exactly that region and its
/// pixel (0, 0) corresponds to `(region.left, region.top)` on screen.
/// Without one, the whole capture area is returned.
pub trait FrameSource: Send {
    fn capture(&mut self, region: Option<&Region>) -> Result<Frame, Box<dyn std::error::Error>>;
}
