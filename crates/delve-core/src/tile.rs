//! The [`Tile`] type and its [`TileKind`] category.

use crate::geom::{Direction, Point};

/// Terrain category of a tile.
///
/// `Void` is carved-away rock: the undefined exterior of the map. It is an
/// explicit category, never inferred from a missing render handle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    Wall,
    #[default]
    Floor,
    Void,
    Water,
    Teleporter,
    Exit,
}

impl TileKind {
    /// Tiles a flood fill over the cave may cross: floors and the special
    /// floor tiles placed on them.
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Floor | Self::Teleporter | Self::Exit)
    }

    /// Solid rock or exterior: either counts as "closed" for cleanup rules.
    #[inline]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Wall | Self::Void)
    }

    /// Whether a sight ray stops at this tile (the tile itself is seen).
    #[inline]
    pub const fn blocks_sight(self) -> bool {
        self.is_closed()
    }

    /// Default walkability for a freshly categorized tile.
    #[inline]
    pub const fn walkable(self) -> bool {
        self.is_open()
    }

    /// Single-character glyph, as used by the ASCII map format.
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Floor => '.',
            Self::Void => ' ',
            Self::Water => '~',
            Self::Teleporter => '^',
            Self::Exit => '>',
        }
    }

    /// Inverse of [`glyph`](Self::glyph).
    pub const fn from_glyph(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Self::Wall),
            '.' => Some(Self::Floor),
            ' ' => Some(Self::Void),
            '~' => Some(Self::Water),
            '^' => Some(Self::Teleporter),
            '>' => Some(Self::Exit),
            _ => None,
        }
    }
}

/// How an external renderer should present a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shade {
    /// Never seen.
    Hidden,
    /// Seen before, not currently in view: draw dimmed.
    Remembered,
    /// Currently in view: full colour.
    Lit,
}

/// A single map cell.
///
/// Neighbour links are coordinates resolved through the owning
/// [`Grid`](crate::Grid), never references.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub pos: Point,
    pub kind: TileKind,
    pub occupied: bool,
    pub walkable: bool,
    pub visible: bool,
    pub visited: bool,
    /// A wall touching only walls or void in all four cardinal directions.
    pub is_edge: bool,
    /// On the outermost ring of the grid.
    pub is_map_edge: bool,
    /// Decorative vegetation overlay on a floor tile.
    pub grass: bool,
    /// Cardinal neighbours, indexed by [`Direction::index`].
    pub links: [Option<Point>; 4],
    /// The linked tile of a teleporter pair.
    pub partner: Option<Point>,
}

impl Tile {
    /// A fresh floor tile at `pos` with no links.
    pub fn new(pos: Point) -> Self {
        Self {
            pos,
            kind: TileKind::Floor,
            occupied: false,
            walkable: true,
            visible: false,
            visited: false,
            is_edge: false,
            is_map_edge: false,
            grass: false,
            links: [None; 4],
            partner: None,
        }
    }

    #[inline]
    pub fn link(&self, d: Direction) -> Option<Point> {
        self.links[d.index()]
    }

    /// Floor that nothing stands on: a valid spot for spawn, exit or a
    /// teleporter end.
    #[inline]
    pub fn open_for_placement(&self) -> bool {
        self.kind == TileKind::Floor && !self.occupied
    }

    pub fn shade(&self) -> Shade {
        if self.visible {
            Shade::Lit
        } else if self.visited {
            Shade::Remembered
        } else {
            Shade::Hidden
        }
    }
}
