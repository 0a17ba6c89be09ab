/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Floor,
    Wall,
}

impl Tile {
    /// Does this tile block actors?
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Can an actor stand in this cell?
    pub fn is_passable(self) -> bool {
        !self.is_wall()
    }
}
