use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ndarray::{s, Array2, ArrayView3};

use crate::shared::frame::Frame;

/// Marker value for pixels on a ridge between two labelled basins, and
/// for the one-pixel image border, which is never flooded.
pub const BOUNDARY: i32 = -1;
const IN_QUEUE: i32 = -2;
const UNLABELLED: i32 = 0;

/// Marker-controlled watershed flood over an RGB frame.
///
/// `markers` is indexed `[[y, x]]` and must match the frame dimensions.
/// Positive values are seed labels, 0 is the unknown area to be flooded.
/// On return every interior pixel carries a seed label or [`BOUNDARY`].
///
/// Flooding is 4-connected. The cost of stepping onto a pixel is the
/// largest per-channel absolute difference to the pixel it was reached
/// from; pixels with equal cost are processed in arrival order.
pub fn flood(frame: &Frame, markers: &mut Array2<i32>) {
    let (height, width) = markers.dim();
    debug_assert_eq!((width as u32, height as u32), (frame.width(), frame.height()));
    if width == 0 || height == 0 {
        return;
    }
    let pixels = frame.as_ndarray();

    for x in 0..width {
        markers[[0, x]] = BOUNDARY;
        markers[[height - 1, x]] = BOUNDARY;
    }
    for y in 0..height {
        markers[[y, 0]] = BOUNDARY;
        markers[[y, width - 1]] = BOUNDARY;
    }
    if width < 3 || height < 3 {
        return;
    }

    let mut queue = FloodQueue::default();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if markers[[y, x]] < 0 {
                markers[[y, x]] = UNLABELLED;
            }
            if markers[[y, x]] != UNLABELLED {
                continue;
            }
            let cost = neighbours(y, x)
                .into_iter()
                .filter(|&(ny, nx)| markers[[ny, nx]] > 0)
                .map(|(ny, nx)| color_step(&pixels, (y, x), (ny, nx)))
                .min();
            if let Some(cost) = cost {
                queue.push(cost, y, x);
                markers[[y, x]] = IN_QUEUE;
            }
        }
    }

    while let Some((y, x)) = queue.pop() {
        let mut label = UNLABELLED;
        for (ny, nx) in neighbours(y, x) {
            let neighbour = markers[[ny, nx]];
            if neighbour <= 0 {
                continue;
            }
            if label == UNLABELLED {
                label = neighbour;
            } else if neighbour != label {
                label = BOUNDARY;
            }
        }
        debug_assert_ne!(label, UNLABELLED, "queued pixel must touch a label");

        markers[[y, x]] = label;
        if label == BOUNDARY {
            continue;
        }

        for (ny, nx) in neighbours(y, x) {
            if markers[[ny, nx]] == UNLABELLED {
                queue.push(color_step(&pixels, (y, x), (ny, nx)), ny, nx);
                markers[[ny, nx]] = IN_QUEUE;
            }
        }
    }
}

/// Left, right, up, down.
fn neighbours(y: usize, x: usize) -> [(usize, usize); 4] {
    [(y, x - 1), (y, x + 1), (y - 1, x), (y + 1, x)]
}

fn color_step(pixels: &ArrayView3<'_, u8>, a: (usize, usize), b: (usize, usize)) -> u8 {
    let (ay, ax) = a;
    let (by, bx) = b;
    pixels
        .slice(s![ay, ax, ..])
        .iter()
        .zip(pixels.slice(s![by, bx, ..]).iter())
        .map(|(p, q)| p.abs_diff(*q))
        .max()
        .unwrap_or(0)
}

/// Min-priority queue, FIFO among equal priorities.
#[derive(Default)]
struct FloodQueue {
    heap: BinaryHeap<(Reverse<u8>, Reverse<u64>, usize, usize)>,
    seq: u64,
}

impl FloodQueue {
    fn push(&mut self, cost: u8, y: usize, x: usize) {
        self.heap.push((Reverse(cost), Reverse(self.seq), y, x));
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<(usize, usize)> {
        self.heap.pop().map(|(_, _, y, x)| (y, x))
    }
}
