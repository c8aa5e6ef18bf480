use crate::clicking::domain::pointer::Pointer;
use crate::shared::point::Point;

/// Pointer that only logs what it would do. Used when no real input
/// device backend is available, and for rehearsing a click run.
#[derive(Debug, Default)]
pub struct DryRunPointer {
    position: Option<Point>,
    clicks: usize,
}

impl DryRunPointer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pointer for DryRunPointer {
    fn move_to(&mut self, target: Point) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Pointer move to ({}, {})", target.x, target.y);
        self.position = Some(target);
        Ok(())
    }

    fn click(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let at = self.position.ok_or("click before the pointer was positioned")?;
        self.clicks += 1;
        log::info!("Pointer click #{} at ({}, {})", self.clicks, at.x, at.y);
        Ok(())
    }
}
