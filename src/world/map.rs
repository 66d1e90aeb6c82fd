//! Map projection buffer
//!
//! The 2D grid a presentation layer draws. It is derived state: the world
//! clears and re-projects it from entity positions after every change.

use super::position::Position;
use super::tile::TileType;

/// The rendered outer map
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    tiles: Vec<TileType>,
}

impl Map {
    /// Create a new map filled with floor
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![TileType::Floor; cells],
        }
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Check if a position is within bounds
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.in_bounds(pos.x, pos.y)
    }

    /// Get tile at position
    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        if self.in_bounds(x, y) {
            Some(self.tiles[self.xy_to_idx(x, y)])
        } else {
            None
        }
    }

    /// Number of cells in the map
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Reset every cell to floor
    pub(crate) fn clear(&mut self) {
        self.tiles.fill(TileType::Floor);
    }

    /// Draw a tile; out-of-bounds positions are ignored
    pub(crate) fn set(&mut self, pos: Position, tile: TileType) {
        if self.contains(pos) {
            let idx = self.xy_to_idx(pos.x, pos.y);
            self.tiles[idx] = tile;
        }
    }

    /// Rows of glyphs, top to bottom
    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|t| t.glyph()).collect())
            .collect()
    }

    /// Render the map as text, one padded glyph per cell
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() * 3 + self.height as usize);
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            for tile in row {
                out.push(' ');
                out.push(tile.glyph());
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let map = Map::new(10, 12);
        let idx = map.xy_to_idx(7, 11);
        assert_eq!(map.idx_to_xy(idx), (7, 11));
        assert_eq!(map.cell_count(), 120);
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut map = Map::new(3, 2);
        map.set(Position::new(3, 0), TileType::Player);
        map.set(Position::new(-1, 1), TileType::Player);
        assert!(map.rows().iter().all(|r| r == "..."));

        map.set(Position::new(2, 1), TileType::Enemy);
        assert_eq!(map.rows(), vec!["...".to_string(), "..E".to_string()]);
        assert_eq!(map.render(), " .  .  . \n .  .  E \n");
    }
}
