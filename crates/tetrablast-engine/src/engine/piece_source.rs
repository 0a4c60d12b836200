use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies the kind of each spawned piece.
///
/// The game state never owns a global random generator; the source is
/// injected so tests can drive spawns deterministically.
pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

impl<S> PieceSource for &mut S
where
    S: PieceSource + ?Sized,
{
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece generator. Serialized as a 32-character
/// lowercase hex string, and parsed from the same form.
///
/// # Example
///
/// ```
/// use tetrablast_engine::{PieceSeed, PieceSource as _, UniformPieceSource};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = UniformPieceSource::with_seed(seed);
/// let mut b = UniformPieceSource::with_seed(seed);
/// for _ in 0..16 {
///     assert_eq!(a.next_kind(), b.next_kind());
/// }
///
/// let parsed: PieceSeed = seed.to_string().parse()?;
/// assert_eq!(parsed, seed);
/// # Ok::<(), tetrablast_engine::ParsePieceSeedError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSeedError {
    #[display("invalid hex: expected 32 characters, got {_0}")]
    InvalidLength(#[error(not(source))] usize),
    #[display("invalid hex: {_0:?}")]
    InvalidDigit(#[error(not(source))] String),
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParsePieceSeedError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError::InvalidDigit(s.to_owned()));
        }
        let num = u128::from_str_radix(s, 16)
            .map_err(|_| ParsePieceSeedError::InvalidDigit(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Uniformly random piece kinds from a seeded PCG generator.
#[derive(Debug, Clone)]
pub struct UniformPieceSource {
    seed: PieceSeed,
    rng: Pcg32,
}

impl Default for UniformPieceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformPieceSource {
    /// Creates a source with a fresh random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            seed,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// The seed this source was created from.
    #[must_use]
    pub const fn seed(&self) -> PieceSeed {
        self.seed
    }
}

impl PieceSource for UniformPieceSource {
    fn next_kind(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// Cycles through a fixed list of kinds.
#[derive(Debug, Clone)]
pub struct SequencePieceSource {
    kinds: Vec<PieceKind>,
    next: usize,
}

impl SequencePieceSource {
    /// # Panics
    ///
    /// Panics if `kinds` is empty.
    #[must_use]
    pub fn new<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let kinds = kinds.into_iter().collect::<Vec<_>>();
        assert!(!kinds.is_empty(), "piece sequence must not be empty");
        Self { kinds, next: 0 }
    }
}

impl PieceSource for SequencePieceSource {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.next];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}
