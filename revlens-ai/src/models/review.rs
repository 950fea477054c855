//! Review records and batches

use revlens_common::SentimentLabel;
use serde::{Deserialize, Serialize};

/// One review row from the input table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// 0-based position in the input table
    pub row_index: usize,
    /// Cell text, coerced to string by the loader
    pub raw_text: String,
    /// `None` until the classifier adapter labels the record
    pub sentiment: Option<SentimentLabel>,
}

impl ReviewRecord {
    pub fn new(row_index: usize, raw_text: impl Into<String>) -> Self {
        Self {
            row_index,
            raw_text: raw_text.into(),
            sentiment: None,
        }
    }

    pub fn is_classified(&self) -> bool {
        self.sentiment.is_some()
    }

    pub fn has_label(&self, label: SentimentLabel) -> bool {
        self.sentiment == Some(label)
    }
}

/// Ordered review records; order equals input row order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewBatch {
    records: Vec<ReviewRecord>,
}

impl ReviewBatch {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        Self { records }
    }

    /// Build an unclassified batch from plain texts (row indices assigned in order)
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| ReviewRecord::new(i, text))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ReviewRecord] {
        &mut self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewRecord> {
        self.records.iter()
    }

    /// Texts of records carrying `label`, in row order
    pub fn texts_with_label(&self, label: SentimentLabel) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(move |r| r.has_label(label))
            .map(|r| r.raw_text.as_str())
    }

    pub fn unclassified_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_classified()).count()
    }
}

impl<'a> IntoIterator for &'a ReviewBatch {
    type Item = &'a ReviewRecord;
    type IntoIter = std::slice::Iter<'a, ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_texts_assigns_row_order() {
        let batch = ReviewBatch::from_texts(["a", "b", "c"]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records()[2].row_index, 2);
        assert_eq!(batch.records()[2].raw_text, "c");
        assert_eq!(batch.unclassified_count(), 3);
    }

    #[test]
    fn test_texts_with_label_keeps_order() {
        let mut batch = ReviewBatch::from_texts(["bad", "good", "worse"]);
        batch.records_mut()[0].sentiment = Some(SentimentLabel::Negative);
        batch.records_mut()[1].sentiment = Some(SentimentLabel::Positive);
        batch.records_mut()[2].sentiment = Some(SentimentLabel::Negative);

        let negatives: Vec<&str> = batch.texts_with_label(SentimentLabel::Negative).collect();
        assert_eq!(negatives, vec!["bad", "worse"]);
        assert_eq!(batch.unclassified_count(), 0);
    }
}
