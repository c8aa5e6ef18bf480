use crate::clicking::domain::click_delay::ClickDelay;
use crate::clicking::domain::pointer::Pointer;
use crate::shared::cancellation::CancellationToken;
use crate::shared::point::Point;
use crate::shared::region::Region;

/// What happened during one click sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub clicked: usize,
    pub skipped: usize,
    pub interrupted: bool,
    pub error: Option<String>,
}

/// Clicks each detected center in turn: move, click, pause.
///
/// Centers are region-local and are translated by the region origin.
/// Points outside the region (edges inclusive) are skipped. The
/// cancellation token is polled after every click, so at most one click
/// is in flight when a stop is requested. A pointer failure ends the
/// sequence but keeps the count of clicks already made.
pub struct ClickDispatcher {
    pointer: Box<dyn Pointer>,
    delay: ClickDelay,
}

impl ClickDispatcher {
    pub fn new(pointer: Box<dyn Pointer>, delay: ClickDelay) -> Self {
        Self { pointer, delay }
    }

    pub fn dispatch(
        &mut self,
        centers: &[Point],
        region: &Region,
        cancel: &CancellationToken,
    ) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        if cancel.is_cancelled() {
            outcome.interrupted = true;
            return outcome;
        }

        let mut rng = rand::thread_rng();

        for &center in centers {
            let Some(target) = region
                .to_absolute(center)
                .filter(|&target| region.contains(target))
            else {
                log::warn!(
                    "Skipping local point ({}, {}) outside region {region}",
                    center.x,
                    center.y
                );
                outcome.skipped += 1;
                continue;
            };

            if let Err(e) = self.pointer.move_to(target).and_then(|_| self.pointer.click()) {
                log::error!("Click at ({}, {}) failed: {e}", target.x, target.y);
                outcome.error = Some(e.to_string());
                break;
            }

            std::thread::sleep(self.delay.sample(&mut rng));
            outcome.clicked += 1;

            if cancel.is_cancelled() {
                log::info!("Clicking interrupted after {} clicks", outcome.clicked);
                outcome.interrupted = true;
                break;
            }
        }

        outcome
    }
}
