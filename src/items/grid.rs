//! Grid-based inventory system
//!
//! Items occupy a width x height rectangle of cells anchored at their top-left
//! corner. Cells hold keys into an item table owned by the grid, so every cell
//! of a multi-cell item points at the same entry and the item itself is stored
//! exactly once.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::{Item, ItemId};

/// Default grid dimensions
pub const GRID_WIDTH: u8 = 10;
pub const GRID_HEIGHT: u8 = 10;

/// Position in the inventory grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u8,
    pub y: u8,
}

impl GridPosition {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Why an inventory operation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("no item here ({x}, {y})")]
    NoItemHere { x: u8, y: u8 },
    #[error("position ({x}, {y}) is outside the inventory")]
    OutOfBounds { x: u8, y: u8 },
    #[error("the item does not fit at ({x}, {y})")]
    Blocked { x: u8, y: u8 },
}

/// Grid-based inventory
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryGrid {
    width: u8,
    height: u8,
    /// Row-major cells, each holding the key of the item covering it
    cells: Vec<Option<ItemId>>,
    /// Items stored by key
    items: HashMap<ItemId, Item>,
    next_id: ItemId,
}

impl Default for InventoryGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl InventoryGrid {
    /// Create a new empty inventory grid
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            items: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    fn idx(&self, x: u8, y: u8) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Check if a position is valid within the grid
    pub fn is_valid_position(&self, x: u8, y: u8) -> bool {
        x < self.width && y < self.height
    }

    /// Check if a `width` x `height` rectangle anchored at (x, y) is in bounds and free
    pub fn can_place_at(&self, x: u8, y: u8, width: u8, height: u8) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if x as u16 + width as u16 > self.width as u16
            || y as u16 + height as u16 > self.height as u16
        {
            return false;
        }

        for cy in y..y + height {
            for cx in x..x + width {
                if self.cells[self.idx(cx, cy)].is_some() {
                    return false;
                }
            }
        }
        true
    }

    /// Check if an item can be placed with its anchor at (x, y)
    pub fn can_place(&self, item: &Item, x: u8, y: u8) -> bool {
        self.can_place_at(x, y, item.width(), item.height())
    }

    /// Find the first free anchor for an item, scanning rows top to bottom
    pub fn find_space_for(&self, item: &Item) -> Option<GridPosition> {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.can_place(item, x, y) {
                    return Some(GridPosition::new(x, y));
                }
            }
        }
        None
    }

    /// Place an item with its anchor at (x, y)
    ///
    /// On failure nothing changes and the item is handed back.
    pub fn place(&mut self, mut item: Item, x: u8, y: u8) -> Result<ItemId, Item> {
        if !self.can_place(&item, x, y) {
            return Err(item);
        }

        let id = self.next_id;
        self.next_id += 1;

        let anchor = GridPosition::new(x, y);
        self.fill(anchor, item.width(), item.height(), Some(id));
        item.anchor = Some(anchor);
        self.items.insert(id, item);

        log::debug!("Placed item {} at ({}, {})", id, x, y);
        Ok(id)
    }

    /// Add an item at the first free anchor
    pub fn add_item(&mut self, item: Item) -> Result<ItemId, Item> {
        match self.find_space_for(&item) {
            Some(pos) => self.place(item, pos.x, pos.y),
            None => Err(item),
        }
    }

    /// Remove an item by key, returning it
    ///
    /// Does nothing when the key is unknown, the item is not placed, or its
    /// anchor cell no longer points back at it.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let (anchor, width, height) = {
            let item = self.items.get(&id)?;
            (item.anchor?, item.width(), item.height())
        };

        if self.cell(anchor.x, anchor.y) != Some(id) {
            log::warn!("Item {} is not at its anchor ({}, {})", id, anchor.x, anchor.y);
            return None;
        }

        self.vacate(id, anchor, width, height);
        let mut item = self.items.remove(&id)?;
        item.anchor = None;
        Some(item)
    }

    /// Move the item anchored at (old_x, old_y) so it is anchored at (new_x, new_y)
    ///
    /// The item keeps its key. If it does not fit at the new anchor it stays
    /// exactly where it was.
    pub fn move_item(
        &mut self,
        old_x: u8,
        old_y: u8,
        new_x: u8,
        new_y: u8,
    ) -> Result<ItemId, InventoryError> {
        if !self.is_valid_position(old_x, old_y) {
            return Err(InventoryError::OutOfBounds { x: old_x, y: old_y });
        }
        if !self.is_valid_position(new_x, new_y) {
            return Err(InventoryError::OutOfBounds { x: new_x, y: new_y });
        }

        let id = self
            .anchor_at(old_x, old_y)
            .ok_or(InventoryError::NoItemHere { x: old_x, y: old_y })?;
        let (width, height) = match self.items.get(&id) {
            Some(item) => item.grid_size,
            None => return Err(InventoryError::NoItemHere { x: old_x, y: old_y }),
        };

        let old_anchor = GridPosition::new(old_x, old_y);
        // Clear our own cells first so overlapping moves are allowed
        self.vacate(id, old_anchor, width, height);

        if self.can_place_at(new_x, new_y, width, height) {
            let new_anchor = GridPosition::new(new_x, new_y);
            self.fill(new_anchor, width, height, Some(id));
            if let Some(item) = self.items.get_mut(&id) {
                item.anchor = Some(new_anchor);
            }
            log::debug!("Moved item {} to ({}, {})", id, new_x, new_y);
            Ok(id)
        } else {
            self.fill(old_anchor, width, height, Some(id));
            Err(InventoryError::Blocked { x: new_x, y: new_y })
        }
    }

    /// Write `value` into every in-bounds cell of a rectangle
    fn fill(&mut self, anchor: GridPosition, width: u8, height: u8, value: Option<ItemId>) {
        for dy in 0..height {
            for dx in 0..width {
                let (x, y) = (anchor.x as u16 + dx as u16, anchor.y as u16 + dy as u16);
                if x < self.width as u16 && y < self.height as u16 {
                    let idx = self.idx(x as u8, y as u8);
                    self.cells[idx] = value;
                }
            }
        }
    }

    /// Clear the cells of a rectangle that belong to `id`, leaving the item in the table
    fn vacate(&mut self, id: ItemId, anchor: GridPosition, width: u8, height: u8) {
        for dy in 0..height {
            for dx in 0..width {
                let (x, y) = (anchor.x as u16 + dx as u16, anchor.y as u16 + dy as u16);
                if x < self.width as u16 && y < self.height as u16 {
                    let idx = self.idx(x as u8, y as u8);
                    if self.cells[idx] == Some(id) {
                        self.cells[idx] = None;
                    }
                }
            }
        }
    }

    /// Key of the item covering (x, y), if any
    pub fn cell(&self, x: u8, y: u8) -> Option<ItemId> {
        if !self.is_valid_position(x, y) {
            return None;
        }
        self.cells[self.idx(x, y)]
    }

    /// Check whether (x, y) is covered by an item
    pub fn is_occupied(&self, x: u8, y: u8) -> bool {
        self.cell(x, y).is_some()
    }

    /// Key of the item whose anchor is exactly (x, y)
    pub fn anchor_at(&self, x: u8, y: u8) -> Option<ItemId> {
        let id = self.cell(x, y)?;
        let item = self.items.get(&id)?;
        (item.anchor == Some(GridPosition::new(x, y))).then_some(id)
    }

    /// Get the item covering a grid position
    pub fn get_at(&self, x: u8, y: u8) -> Option<&Item> {
        self.cell(x, y).and_then(|id| self.items.get(&id))
    }

    /// Get item by key
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Flag a gear item as having its bonus applied
    pub(crate) fn mark_active(&mut self, id: ItemId) -> bool {
        match self.items.get_mut(&id) {
            Some(item) => {
                item.active = true;
                true
            }
            None => false,
        }
    }

    /// All items ordered by anchor, top-left to bottom-right
    pub fn anchored_items(&self) -> Vec<&Item> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        // The first cell of a rectangle met in row-major order is its anchor
        for id in self.cells.iter().flatten() {
            if seen.insert(*id) {
                if let Some(item) = self.items.get(id) {
                    result.push(item);
                }
            }
        }
        result
    }

    /// Row-major occupancy flags
    pub fn occupancy(&self) -> Vec<bool> {
        self.cells.iter().map(Option::is_some).collect()
    }

    /// Get item count
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the grid as text
    ///
    /// Anchor cells show `[symbol]`, other covered cells ` # ` and free cells ` . `.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Inventory ({}x{}):", self.width, self.height);

        out.push_str("   ");
        for x in 0..self.width {
            let _ = write!(out, "{:2} ", x);
        }
        out.push('\n');

        for y in 0..self.height {
            let _ = write!(out, "{:2} ", y);
            for x in 0..self.width {
                match self.get_at(x, y) {
                    Some(item) if item.anchor == Some(GridPosition::new(x, y)) => {
                        let _ = write!(out, "[{}]", item.symbol);
                    }
                    Some(_) => out.push_str(" # "),
                    None => out.push_str(" . "),
                }
            }
            out.push('\n');
        }
        out
    }
}
