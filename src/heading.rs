/// Movement heading of the snake on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Heading {
    Top,
    Bottom,
    Left,
    Right,
}

impl Heading {
    /// All headings in neighbor-table order.
    pub const ALL: [Heading; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// Returns the opposite heading.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Filters `requested` against `current`, rejecting immediate reversals.
#[must_use]
pub fn sanitize(current: Heading, requested: Heading) -> Heading {
    if requested == current.opposite() {
        current
    } else {
        requested
    }
}
