//! Collision-free cell picking for level generation
//!
//! Spawns are placed by rejection sampling: draw a uniform random cell and
//! redraw until the caller's occupancy test accepts it.

use rand::seq::SliceRandom;
use rand::Rng;

use super::position::Position;

/// Draws attempted before falling back to choosing among the remaining free cells
const MAX_SAMPLE_ATTEMPTS: u32 = 4096;

/// A uniformly random cell of a `width` x `height` map
pub fn random_cell(rng: &mut impl Rng, width: i32, height: i32) -> Position {
    Position::new(rng.gen_range(0..width), rng.gen_range(0..height))
}

/// Pick a random cell for which `is_taken` is false
///
/// Returns `None` only when every cell of the map is taken.
pub fn pick_free_cell<R, F>(rng: &mut R, width: i32, height: i32, is_taken: F) -> Option<Position>
where
    R: Rng,
    F: Fn(Position) -> bool,
{
    if width <= 0 || height <= 0 {
        return None;
    }

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let pos = random_cell(rng, width, height);
        if !is_taken(pos) {
            return Some(pos);
        }
    }

    // Nearly full map: sample from what is left so we still pick uniformly
    let free: Vec<Position> = (0..height)
        .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
        .filter(|pos| !is_taken(*pos))
        .collect();
    let pos = free.choose(rng).copied();
    if pos.is_none() {
        log::warn!("No free cell left on a {}x{} map", width, height);
    }
    pos
}

/// How many ground items to scatter on a fresh level
pub fn ground_item_count(rng: &mut impl Rng, min: usize, max: usize) -> usize {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}
