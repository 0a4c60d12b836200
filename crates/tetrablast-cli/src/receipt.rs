use std::convert::Infallible;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tetrablast_engine::ScoreSink;

/// Acknowledgement of a submitted final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReceipt {
    pub id: usize,
    pub score: usize,
    pub submitted_at: DateTime<Utc>,
}

/// In-process score sink: records a timestamped receipt per finished game.
///
/// Receipts are printed by the caller once the terminal is released.
#[derive(Debug, Default)]
pub struct ReceiptLog {
    receipts: Vec<ScoreReceipt>,
}

impl ReceiptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_receipts(self) -> Vec<ScoreReceipt> {
        self.receipts
    }
}

impl ScoreSink for ReceiptLog {
    type Receipt = ScoreReceipt;
    type Error = Infallible;

    fn submit(&mut self, final_score: usize) -> Result<Self::Receipt, Self::Error> {
        let receipt = ScoreReceipt {
            id: self.receipts.len(),
            score: final_score,
            submitted_at: Utc::now(),
        };
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipts_are_numbered() {
        let mut log = ReceiptLog::new();
        let first = log.submit(150).unwrap();
        let second = log.submit(0).unwrap();
        assert_eq!((first.id, first.score), (0, 150));
        assert_eq!((second.id, second.score), (1, 0));
        assert!(first.submitted_at <= second.submitted_at);
        assert_eq!(log.into_receipts(), vec![first, second]);
    }

    #[test]
    fn test_receipt_json_fields() {
        let mut log = ReceiptLog::new();
        let receipt = log.submit(42).unwrap();
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["score"], 42);
        assert!(json["submitted_at"].is_string());
    }
}
