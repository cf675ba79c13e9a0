use super::{RecognizedLine, RecognizedPage};
use crate::error::RecognitionError;

const COLUMNS: usize = 12;
const WORD_LEVEL: u32 = 5;

type LineKey = (u32, u32, u32, u32);

#[derive(Debug)]
struct LineAcc<'a> {
    key: LineKey,
    words: Vec<&'a str>,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
    conf_sum: f32,
    conf_count: u32,
}

impl<'a> LineAcc<'a> {
    const fn new(key: LineKey, left: u32, top: u32) -> Self {
        Self {
            key,
            words: Vec::new(),
            left,
            top,
            right: left,
            bottom: top,
            conf_sum: 0.0,
            conf_count: 0,
        }
    }

    fn push(&mut self, word: &'a str, left: u32, top: u32, width: u32, height: u32, conf: f32) {
        self.words.push(word);
        self.left = self.left.min(left);
        self.top = self.top.min(top);
        self.right = self.right.max(left.saturating_add(width));
        self.bottom = self.bottom.max(top.saturating_add(height));
        if conf >= 0.0 {
            self.conf_sum += conf;
            self.conf_count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> RecognizedLine {
        let confidence = if self.conf_count == 0 {
            0.0
        } else {
            (self.conf_sum / self.conf_count as f32 / 100.0).clamp(0.0, 1.0)
        };

        RecognizedLine {
            bbox: vec![
                [self.left, self.top],
                [self.right, self.top],
                [self.right, self.bottom],
                [self.left, self.bottom],
            ],
            text: self.words.join(" "),
            confidence,
        }
    }
}

/// Parses Tesseract's `tsv` output into lines.
///
/// Only word rows (level 5) with non-blank text count. Words sharing
/// `(page, block, paragraph, line)` form one line; rows are assumed to arrive
/// in reading order as Tesseract emits them.
///
/// # Errors
/// Returns [`RecognitionError::Engine`] when a word row has missing or non-numeric columns.
pub fn parse_tsv(raw: &str) -> Result<RecognizedPage, RecognitionError> {
    let mut lines = Vec::new();
    let mut current: Option<LineAcc<'_>> = None;

    for (idx, row) in raw.lines().enumerate() {
        let mut cols = row.splitn(COLUMNS, '\t');
        let Some(Ok(level)) = cols.next().map(str::parse::<u32>) else {
            // header or blank line
            continue;
        };
        if level != WORD_LEVEL {
            continue;
        }

        let cols: Vec<&str> = cols.collect();
        if cols.len() != COLUMNS - 1 {
            return Err(malformed(idx, "expected 12 columns"));
        }
        let text = cols[10].trim();
        if text.is_empty() {
            continue;
        }

        let num = |i: usize| cols[i].trim().parse::<u32>().map_err(|_| malformed(idx, "non-numeric field"));
        let key = (num(0)?, num(1)?, num(2)?, num(3)?);
        let (left, top, width, height) = (num(5)?, num(6)?, num(7)?, num(8)?);
        let conf = cols[9].trim().parse::<f32>().map_err(|_| malformed(idx, "non-numeric confidence"))?;

        let acc = match current.take() {
            Some(acc) if acc.key == key => acc,
            Some(done) => {
                lines.push(done.finish());
                LineAcc::new(key, left, top)
            },
            None => LineAcc::new(key, left, top),
        };
        let acc = current.insert(acc);
        acc.push(text, left, top, width, height, conf);
    }

    if let Some(acc) = current {
        lines.push(acc.finish());
    }

    Ok(RecognizedPage { lines })
}

fn malformed(row: usize, what: &'static str) -> RecognitionError {
    RecognitionError::Engine {
        message: format!("malformed TSV row {}: {what}", row + 1).into(),
        context: None,
    }
}
