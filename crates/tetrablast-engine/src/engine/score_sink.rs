use std::{convert::Infallible, fmt::Debug};

/// Receives the final score of a finished game.
///
/// [`GameSession`](super::GameSession) submits exactly once per game, when
/// the game becomes over. What a receipt means is up to the implementation.
pub trait ScoreSink {
    type Receipt: Debug;
    type Error: Debug;

    fn submit(&mut self, final_score: usize) -> Result<Self::Receipt, Self::Error>;
}

impl<K> ScoreSink for &mut K
where
    K: ScoreSink + ?Sized,
{
    type Receipt = K::Receipt;
    type Error = K::Error;

    fn submit(&mut self, final_score: usize) -> Result<Self::Receipt, Self::Error> {
        (**self).submit(final_score)
    }
}

/// Keeps submitted scores in memory. The receipt is the submission index.
impl ScoreSink for Vec<usize> {
    type Receipt = usize;
    type Error = Infallible;

    fn submit(&mut self, final_score: usize) -> Result<Self::Receipt, Self::Error> {
        self.push(final_score);
        Ok(self.len() - 1)
    }
}
