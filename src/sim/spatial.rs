//! Uniform grid broad phase
//!
//! Entities are bucketed by center with a counting sort (counts, prefix-sum
//! offsets, then a flat contents array), so a rebuild does no per-cell
//! allocation. With a cell size of at least one diameter of the largest
//! entity, any two overlapping circles sit in the same or adjacent cells.

use glam::Vec2;

use super::state::{Arena, EntityStore};

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// `cell_offsets[c]..cell_offsets[c + 1]` indexes `cell_contents`
    cell_offsets: Vec<usize>,
    /// Entity ids grouped by cell, ascending within each cell
    cell_contents: Vec<u32>,
    /// Cell of each entity, indexed by id
    entity_cells: Vec<usize>,
}

impl SpatialGrid {
    pub fn new(arena: Arena, cell_size: f32) -> Self {
        let cols = ((arena.width / cell_size).ceil() as usize).max(1);
        let rows = ((arena.height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            cell_contents: Vec::new(),
            entity_cells: Vec::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions as (columns, rows)
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Column/row of a position, clamped to the grid
    #[inline]
    pub fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let clamp = |v: f32, n: usize| ((v / self.cell_size).floor().max(0.0) as usize).min(n - 1);
        (clamp(pos.x, self.cols), clamp(pos.y, self.rows))
    }

    #[inline]
    fn cell_index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Re-bucket every entity at its current position
    pub fn rebuild(&mut self, entities: &EntityStore) {
        let cells = self.cols * self.rows;
        self.entity_cells.clear();
        self.cell_offsets.clear();
        self.cell_offsets.resize(cells + 1, 0);

        // Count
        for e in entities {
            let (col, row) = self.cell_coords(e.pos);
            let cell = self.cell_index(col, row);
            self.entity_cells.push(cell);
            self.cell_offsets[cell + 1] += 1;
        }

        // Prefix sum
        for c in 0..cells {
            self.cell_offsets[c + 1] += self.cell_offsets[c];
        }

        // Scatter in id order, so each bucket stays sorted
        self.cell_contents.clear();
        self.cell_contents.resize(entities.len(), 0);
        let mut cursor = self.cell_offsets[..cells].to_vec();
        for (id, &cell) in self.entity_cells.iter().enumerate() {
            self.cell_contents[cursor[cell]] = id as u32;
            cursor[cell] += 1;
        }
    }

    /// Ids bucketed in one cell
    pub fn cell_contents(&self, col: usize, row: usize) -> &[u32] {
        let cell = self.cell_index(col, row);
        &self.cell_contents[self.cell_offsets[cell]..self.cell_offsets[cell + 1]]
    }

    /// Every other entity in the same or an adjacent cell as `id`.
    ///
    /// Each candidate is yielded once. Unknown ids yield nothing.
    pub fn neighbors(&self, id: u32) -> impl Iterator<Item = u32> + '_ {
        let cell = self.entity_cells.get(id as usize).copied();
        let (col, row) = cell.map_or((0, 0), |c| (c % self.cols, c / self.cols));
        let (rows, cols) = if cell.is_some() {
            (
                row.saturating_sub(1)..=(row + 1).min(self.rows - 1),
                col.saturating_sub(1)..=(col + 1).min(self.cols - 1),
            )
        } else {
            // Empty ranges
            (1..=0, 1..=0)
        };
        rows.flat_map(move |r| {
            cols.clone()
                .flat_map(move |c| self.cell_contents(c, r).iter().copied())
        })
        .filter(move |&other| other != id)
    }

    /// Number of entities bucketed by the last rebuild
    pub fn len(&self) -> usize {
        self.entity_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kind::Kind;
    use crate::sim::state::Entity;

    fn store(points: &[(f32, f32)]) -> EntityStore {
        EntityStore::from_entities(
            points
                .iter()
                .map(|&(x, y)| Entity::new(Kind::Rock, Vec2::new(x, y), Vec2::ZERO, 5.0))
                .collect(),
        )
    }

    #[test]
    fn test_dimensions_cover_arena() {
        let grid = SpatialGrid::new(Arena::new(105.0, 40.0), 20.0);
        assert_eq!(grid.dimensions(), (6, 2));
        assert_eq!(grid.cell_coords(Vec2::new(105.0, 40.0)), (5, 1));
        assert_eq!(grid.cell_coords(Vec2::new(-3.0, 0.0)), (0, 0));
    }

    #[test]
    fn test_buckets_sorted_by_id() {
        let entities = store(&[(15.0, 15.0), (5.0, 5.0), (55.0, 5.0), (1.0, 1.0)]);
        let mut grid = SpatialGrid::new(Arena::new(100.0, 100.0), 20.0);
        grid.rebuild(&entities);
        assert_eq!(grid.cell_contents(0, 0), &[0, 1, 3]);
        assert_eq!(grid.cell_contents(2, 0), &[2]);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_neighbors_adjacent_only() {
        // 0 and 1 in adjacent cells, 2 two cells away
        let entities = store(&[(19.0, 10.0), (21.0, 10.0), (75.0, 10.0)]);
        let mut grid = SpatialGrid::new(Arena::new(100.0, 100.0), 20.0);
        grid.rebuild(&entities);

        let mut n0: Vec<u32> = grid.neighbors(0).collect();
        n0.sort_unstable();
        assert_eq!(n0, vec![1]);
        assert_eq!(grid.neighbors(2).count(), 0);
        assert_eq!(grid.neighbors(99).count(), 0);
    }

    #[test]
    fn test_single_cell_grid_no_duplicates() {
        let entities = store(&[(5.0, 5.0), (6.0, 6.0), (7.0, 7.0)]);
        let mut grid = SpatialGrid::new(Arena::new(10.0, 10.0), 50.0);
        grid.rebuild(&entities);
        assert_eq!(grid.dimensions(), (1, 1));
        let n: Vec<u32> = grid.neighbors(1).collect();
        assert_eq!(n, vec![0, 2]);
    }

    #[test]
    fn test_rebuild_follows_movement() {
        let mut entities = store(&[(5.0, 5.0), (95.0, 95.0)]);
        let mut grid = SpatialGrid::new(Arena::new(100.0, 100.0), 20.0);
        grid.rebuild(&entities);
        assert_eq!(grid.neighbors(0).count(), 0);

        if let Some(e) = entities.get_mut(1) {
            e.pos = Vec2::new(10.0, 10.0);
        }
        grid.rebuild(&entities);
        assert_eq!(grid.neighbors(0).collect::<Vec<_>>(), vec![1]);
    }
}
