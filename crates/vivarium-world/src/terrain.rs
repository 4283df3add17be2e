//! Spatial index mapping grid cells to the organisms standing on them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vivarium_core::{Direction, Error, OrganismId, Position, Result, Species};

/// A bounded 2D grid holding at most one organism per cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<OrganismId>>,
    locations: HashMap<OrganismId, (Position, Species)>,
}

impl Terrain {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let size = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or_else(|| Error::Config(format!("cannot lay out a {width}x{height} grid")))?;
        Ok(Self {
            width,
            height,
            cells: vec![None; size],
            locations: HashMap::new(),
        })
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    pub fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn add_organism(&mut self, id: OrganismId, species: Species, x: i32, y: i32) -> Result<()> {
        let pos = Position::new(x, y);
        self.check_bounds(pos)?;
        if self.locations.contains_key(&id) {
            return Err(Error::InvariantViolation(format!(
                "organism {id} is already on the terrain"
            )));
        }
        let index = self.pos_to_index(pos);
        if let Some(occupant) = self.cells[index] {
            return Err(Error::CellOccupied { x, y, occupant });
        }
        self.cells[index] = Some(id);
        self.locations.insert(id, (pos, species));
        Ok(())
    }

    /// Remove an organism; returns where it stood, or `None` if it was absent
    pub fn remove_organism(&mut self, id: OrganismId) -> Option<Position> {
        let (pos, _) = self.locations.remove(&id)?;
        let index = self.pos_to_index(pos);
        self.cells[index] = None;
        Some(pos)
    }

    pub fn move_organism(&mut self, id: OrganismId, new_x: i32, new_y: i32) -> Result<()> {
        let target = Position::new(new_x, new_y);
        self.check_bounds(target)?;
        let (current, species) = *self.locations.get(&id).ok_or(Error::OrganismNotFound(id))?;
        if current == target {
            return Ok(());
        }
        let target_index = self.pos_to_index(target);
        if let Some(occupant) = self.cells[target_index] {
            return Err(Error::CellOccupied {
                x: new_x,
                y: new_y,
                occupant,
            });
        }
        let current_index = self.pos_to_index(current);
        self.cells[current_index] = None;
        self.cells[target_index] = Some(id);
        self.locations.insert(id, (target, species));
        Ok(())
    }

    pub fn occupant(&self, x: i32, y: i32) -> Option<OrganismId> {
        let pos = Position::new(x, y);
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.pos_to_index(pos)]
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.pos_to_index(pos)].is_none()
    }

    /// Ids within Chebyshev distance `radius` of (x, y), centre included, ascending
    pub fn neighbors(&self, x: i32, y: i32, radius: i32) -> Vec<OrganismId> {
        let mut found = Vec::new();
        let radius = radius.max(0);
        for ny in (y - radius).max(0)..=(y + radius).min(self.height - 1) {
            for nx in (x - radius).max(0)..=(x + radius).min(self.width - 1) {
                if let Some(id) = self.cells[self.pos_to_index(Position::new(nx, ny))] {
                    found.push(id);
                }
            }
        }
        found.sort_unstable();
        found
    }

    /// Free in-bounds cells among the eight around (x, y)
    pub fn free_adjacent(&self, x: i32, y: i32) -> Vec<Position> {
        let origin = Position::new(x, y);
        Direction::all()
            .into_iter()
            .map(|direction| origin.offset(direction))
            .filter(|pos| self.is_free(*pos))
            .collect()
    }

    /// Free in-bounds cells within Chebyshev distance `radius`, centre excluded
    pub fn free_within(&self, x: i32, y: i32, radius: i32) -> Vec<Position> {
        let mut free = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let pos = Position::new(x + dx, y + dy);
                if self.is_free(pos) {
                    free.push(pos);
                }
            }
        }
        free
    }

    pub fn position_of(&self, id: OrganismId) -> Option<Position> {
        self.locations.get(&id).map(|(pos, _)| *pos)
    }

    pub fn species_of(&self, id: OrganismId) -> Option<Species> {
        self.locations.get(&id).map(|(_, species)| *species)
    }

    pub fn contains(&self, id: OrganismId) -> bool {
        self.locations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Check that the cell array and the reverse index describe the same placement
    pub fn check_consistency(&self) -> Result<()> {
        let occupied = self.cells.iter().filter(|cell| cell.is_some()).count();
        if occupied != self.locations.len() {
            return Err(Error::InvariantViolation(format!(
                "terrain holds {occupied} occupied cells but indexes {} organisms",
                self.locations.len()
            )));
        }
        for (id, (pos, _)) in &self.locations {
            if self.occupant(pos.x, pos.y) != Some(*id) {
                return Err(Error::InvariantViolation(format!(
                    "terrain indexes {id} at {pos} but the cell disagrees"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_creation() {
        let terrain = Terrain::new(10, 10).unwrap();
        assert_eq!(terrain.width, 10);
        assert_eq!(terrain.height, 10);
        assert_eq!(terrain.capacity(), 100);
        assert!(terrain.is_empty());
    }

    #[test]
    fn test_add_and_occupant() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        terrain.add_organism(OrganismId(1), Species::PetitHerbe, 5, 5).unwrap();
        assert_eq!(terrain.occupant(5, 5), Some(OrganismId(1)));
        assert_eq!(terrain.occupant(4, 5), None);
        assert_eq!(terrain.occupant(-1, 5), None);
        assert_eq!(terrain.position_of(OrganismId(1)), Some(Position::new(5, 5)));
        assert_eq!(terrain.species_of(OrganismId(1)), Some(Species::PetitHerbe));
    }

    #[test]
    fn test_single_occupancy() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        terrain.add_organism(OrganismId(1), Species::PetitHerbe, 5, 5).unwrap();
        let err = terrain.add_organism(OrganismId(2), Species::PetitHerbe, 5, 5);
        assert!(matches!(err, Err(Error::CellOccupied { occupant: OrganismId(1), .. })));
        assert_eq!(terrain.len(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        assert!(matches!(
            terrain.add_organism(OrganismId(1), Species::Escargot, 10, 0),
            Err(Error::OutOfBounds { .. })
        ));
        terrain.add_organism(OrganismId(1), Species::Escargot, 0, 0).unwrap();
        assert!(matches!(
            terrain.move_organism(OrganismId(1), 0, -1),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_move_organism() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        terrain.add_organism(OrganismId(1), Species::Escargot, 0, 0).unwrap();
        terrain.add_organism(OrganismId(2), Species::Escargot, 1, 1).unwrap();

        assert!(matches!(
            terrain.move_organism(OrganismId(1), 1, 1),
            Err(Error::CellOccupied { .. })
        ));
        assert_eq!(terrain.occupant(0, 0), Some(OrganismId(1)));

        terrain.move_organism(OrganismId(1), 1, 0).unwrap();
        assert_eq!(terrain.occupant(0, 0), None);
        assert_eq!(terrain.occupant(1, 0), Some(OrganismId(1)));

        assert!(matches!(
            terrain.move_organism(OrganismId(9), 3, 3),
            Err(Error::OrganismNotFound(OrganismId(9)))
        ));
        terrain.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        terrain.add_organism(OrganismId(1), Species::Escargot, 2, 2).unwrap();
        assert_eq!(terrain.remove_organism(OrganismId(1)), Some(Position::new(2, 2)));
        assert_eq!(terrain.remove_organism(OrganismId(1)), None);
        assert!(terrain.is_free(Position::new(2, 2)));
    }

    #[test]
    fn test_neighbors_chebyshev() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        terrain.add_organism(OrganismId(3), Species::Escargot, 5, 5).unwrap();
        terrain.add_organism(OrganismId(1), Species::PetitHerbe, 7, 7).unwrap();
        terrain.add_organism(OrganismId(2), Species::PetitHerbe, 8, 5).unwrap();

        assert_eq!(terrain.neighbors(5, 5, 0), vec![OrganismId(3)]);
        assert_eq!(terrain.neighbors(5, 5, 2), vec![OrganismId(1), OrganismId(3)]);
        assert_eq!(
            terrain.neighbors(5, 5, 3),
            vec![OrganismId(1), OrganismId(2), OrganismId(3)]
        );
    }

    #[test]
    fn test_neighbors_clipped_at_edges() {
        let mut terrain = Terrain::new(4, 4).unwrap();
        terrain.add_organism(OrganismId(1), Species::Escargot, 0, 0).unwrap();
        terrain.add_organism(OrganismId(2), Species::Escargot, 3, 3).unwrap();
        assert_eq!(terrain.neighbors(0, 0, 10), vec![OrganismId(1), OrganismId(2)]);
    }

    #[test]
    fn test_free_adjacent_in_corner() {
        let mut terrain = Terrain::new(10, 10).unwrap();
        assert_eq!(terrain.free_adjacent(0, 0).len(), 3);
        terrain.add_organism(OrganismId(1), Species::Escargot, 1, 1).unwrap();
        let free = terrain.free_adjacent(0, 0);
        assert_eq!(free.len(), 2);
        assert!(!free.contains(&Position::new(1, 1)));
        assert_eq!(terrain.free_within(5, 5, 2).len(), 24);
    }

    #[test]
    fn test_unrepresentable_grid_is_rejected() {
        assert!(matches!(Terrain::new(-3, 4), Err(Error::Config(_))));
        assert!(matches!(Terrain::new(4, -1), Err(Error::Config(_))));
        assert_eq!(Terrain::new(0, 7).unwrap().capacity(), 0);
    }
}
