use std::fmt;
use thiserror::Error;

/// The three independently generated element sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopulationKind {
    Particles,
    Ornaments,
    Gifts,
}

impl fmt::Display for PopulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PopulationKind::Particles => "particles",
            PopulationKind::Ornaments => "ornaments",
            PopulationKind::Gifts => "gifts",
        };
        f.write_str(name)
    }
}

/// Configuration errors. All of them surface before the first frame.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("invalid layout parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("{0} population would be empty")]
    EmptyPopulation(PopulationKind),
    #[error("{population} buffer holds {transforms} transforms for {elements} elements")]
    BufferLengthMismatch {
        population: PopulationKind,
        elements: usize,
        transforms: usize,
    },
    #[error("expected {expected} buffer, got {found} buffer")]
    WrongPopulation {
        expected: PopulationKind,
        found: PopulationKind,
    },
}
