use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::grid::ColorTag;

/// A falling piece: a shape from the catalog at a rotation state and anchor.
///
/// Pieces are immutable values. Movement and rotation return new `Piece`
/// instances; whether the result is legal is decided by
/// [`Grid::is_colliding`](super::grid::Grid::is_colliding).
///
/// # Example
///
/// ```
/// use tetrablast_engine::{Direction, Piece, PieceKind, PiecePosition};
///
/// let piece = Piece::new(PieceKind::T, PiecePosition::new(3, 0));
/// let moved = piece.shifted(Direction::Down);
/// assert_eq!(moved.position(), PiecePosition::new(3, 1));
/// assert_eq!(moved.rotated().rotation(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: usize,
    position: PiecePosition,
}

impl Piece {
    /// Creates a piece in its first rotation state.
    #[must_use]
    pub const fn new(kind: PieceKind, position: PiecePosition) -> Self {
        Self {
            kind,
            rotation: 0,
            position,
        }
    }

    /// Creates a piece at the spawn anchor of a grid with `cols` columns.
    ///
    /// The anchor is horizontally centered for a 4-wide bounding box and sits on
    /// row 0.
    #[must_use]
    pub fn spawn(kind: PieceKind, cols: usize) -> Self {
        Self::new(kind, PiecePosition::spawn(cols))
    }

    /// Returns a copy with the given rotation index, taken modulo the number of
    /// rotation states of the shape.
    #[must_use]
    pub fn with_rotation(self, rotation: usize) -> Self {
        Self {
            rotation: rotation % self.kind.shape().rotation_count(),
            ..self
        }
    }

    #[must_use]
    pub fn with_position(self, position: PiecePosition) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> usize {
        self.rotation
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn color(&self) -> ColorTag {
        self.kind.color()
    }

    #[must_use]
    pub fn rotation_state(&self) -> &'static RotationState {
        self.kind.shape().rotation_state(self.rotation)
    }

    /// Absolute `(x, y)` of every occupied cell. `y` may be negative while the
    /// piece is partially above the field.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let PiecePosition { x, y } = self.position;
        self.rotation_state()
            .occupied_cells()
            .map(move |(dx, dy)| (x + dx, y + dy))
    }

    #[must_use]
    pub fn shifted(&self, direction: Direction) -> Self {
        Self {
            position: self.position.shifted(direction),
            ..*self
        }
    }

    /// Returns the piece in its next rotation state (cyclic).
    #[must_use]
    pub fn rotated(&self) -> Self {
        self.with_rotation(self.rotation + 1)
    }
}

/// Anchor of a piece: the top-left corner of its rotation-state bounding box.
///
/// `x` grows rightward, `y` grows downward. Both are signed so a candidate
/// position may lie outside the grid; the collision detector rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiecePosition {
    pub x: i32,
    pub y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn spawn(cols: usize) -> Self {
        let x = i32::try_from(cols / 2).unwrap_or(i32::MAX).saturating_sub(2);
        Self::new(x.max(0), 0)
    }

    #[must_use]
    pub const fn shifted(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Direction of a translation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// The seven piece identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    O = 1,
    T = 2,
    S = 3,
    Z = 4,
    J = 5,
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    #[must_use]
    pub fn shape(self) -> &'static PieceShape {
        &PIECE_SHAPES[self as usize]
    }

    #[must_use]
    pub fn color(self) -> ColorTag {
        self.shape().color
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use tetrablast_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Static catalog entry: the ordered rotation states of one piece kind and
/// its color.
#[derive(Debug)]
pub struct PieceShape {
    kind: PieceKind,
    color: ColorTag,
    rotations: &'static [RotationState],
}

impl PieceShape {
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn color(&self) -> ColorTag {
        self.color
    }

    #[must_use]
    pub const fn rotation_count(&self) -> usize {
        self.rotations.len()
    }

    /// Returns the rotation state at `index` modulo [`Self::rotation_count`].
    #[must_use]
    pub const fn rotation_state(&self, index: usize) -> &RotationState {
        &self.rotations[index % self.rotations.len()]
    }

    pub fn rotation_states(&self) -> impl Iterator<Item = &RotationState> {
        self.rotations.iter()
    }
}

/// Largest bounding box of any shape in the catalog.
pub const MAX_SHAPE_SIZE: usize = 4;

/// One orientation of a shape: a square boolean matrix of `size × size`
/// cells relative to the piece anchor.
///
/// Row `dy` is stored as a bit mask where bit `dx` marks an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    size: usize,
    rows: [u8; MAX_SHAPE_SIZE],
}

impl RotationState {
    const fn new(size: usize, rows: [u8; MAX_SHAPE_SIZE]) -> Self {
        Self { size, rows }
    }

    /// Edge length of the square bounding box.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_occupied(&self, dx: usize, dy: usize) -> bool {
        dx < self.size && dy < self.size && (self.rows[dy] & (1 << dx)) != 0
    }

    /// Occupied `(dx, dy)` offsets in row-major order.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |dy| {
            (0..self.size)
                .filter(move |&dx| self.is_occupied(dx, dy))
                .map(move |dx| (dx as i32, dy as i32))
        })
    }
}

static PIECE_SHAPES: [PieceShape; PieceKind::LEN] = {
    const fn m(bits: [u8; 4]) -> u8 {
        bits[0] | (bits[1] << 1) | (bits[2] << 2) | (bits[3] << 3)
    }

    const EEEE: u8 = 0;
    const fn r2(a: [u8; 4], b: [u8; 4]) -> RotationState {
        RotationState::new(2, [m(a), m(b), EEEE, EEEE])
    }
    const fn r3(a: [u8; 4], b: [u8; 4], c: [u8; 4]) -> RotationState {
        RotationState::new(3, [m(a), m(b), m(c), EEEE])
    }
    const fn r4(a: [u8; 4], b: [u8; 4], c: [u8; 4], d: [u8; 4]) -> RotationState {
        RotationState::new(4, [m(a), m(b), m(c), m(d)])
    }

    [
        PieceShape {
            kind: PieceKind::I,
            color: ColorTag::Cyan,
            rotations: &[
                r4([0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]),
                r4([0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]),
            ],
        },
        PieceShape {
            kind: PieceKind::O,
            color: ColorTag::Yellow,
            rotations: &[r2([1, 1, 0, 0], [1, 1, 0, 0])],
        },
        PieceShape {
            kind: PieceKind::T,
            color: ColorTag::Purple,
            rotations: &[
                r3([0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]),
                r3([0, 1, 0, 0], [0, 1, 1, 0], [0, 1, 0, 0]),
                r3([0, 0, 0, 0], [1, 1, 1, 0], [0, 1, 0, 0]),
                r3([0, 1, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0]),
            ],
        },
        PieceShape {
            kind: PieceKind::S,
            color: ColorTag::Green,
            rotations: &[
                r3([0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]),
                r3([0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 1, 0]),
            ],
        },
        PieceShape {
            kind: PieceKind::Z,
            color: ColorTag::Red,
            rotations: &[
                r3([1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]),
                r3([0, 0, 1, 0], [0, 1, 1, 0], [0, 1, 0, 0]),
            ],
        },
        PieceShape {
            kind: PieceKind::J,
            color: ColorTag::Blue,
            rotations: &[
                r3([1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]),
                r3([0, 1, 1, 0], [0, 1, 0, 0], [0, 1, 0, 0]),
                r3([0, 0, 0, 0], [1, 1, 1, 0], [0, 0, 1, 0]),
                r3([0, 1, 0, 0], [0, 1, 0, 0], [1, 1, 0, 0]),
            ],
        },
        PieceShape {
            kind: PieceKind::L,
            color: ColorTag::Orange,
            rotations: &[
                r3([0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0]),
                r3([0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 1, 0]),
                r3([0, 0, 0, 0], [1, 1, 1, 0], [1, 0, 0, 0]),
                r3([1, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]),
            ],
        },
    ]
};
