//! JSON-lines frame source for replaying recorded detections.
//!
//! One record per line:
//!
//! ```text
//! {"dt": 0.033, "detections": [{"x": 55, "y": 55, "r": 10, "color": "solid"}]}
//! {"dt": 0.033, "detections": [[50, 50, 10], [120, 80, 11, "cue"]]}
//! {"dt": 0.033}
//! {"reset": true, "detections": []}
//! ```
//!
//! A record without `detections` is a frame where the table was not located.

use poolmind::Detection;
use serde::Deserialize;
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read frame source: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One recorded frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameRecord {
    /// Seconds since the previous frame.
    #[serde(default)]
    pub dt: Option<f32>,
    /// `None` when the table was not located in this frame.
    #[serde(default)]
    pub detections: Option<Vec<Detection>>,
    /// Reset the game before processing this frame.
    #[serde(default)]
    pub reset: bool,
}

/// Iterator over the records of a JSON-lines reader. Blank lines are skipped.
pub struct FrameSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> FrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Line number of the last record read (1-based).
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for FrameSource<R> {
    type Item = Result<FrameRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(SourceError::Io(e))),
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(text).map_err(|source| SourceError::Parse {
                line: self.line,
                source,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolmind::ColorClass;
    use std::io::Cursor;

    #[test]
    fn reads_records_and_skips_blank_lines() {
        let input = r#"{"dt": 0.04, "detections": [{"x": 55, "y": 55, "r": 10, "color": "solid"}]}

{"detections": [[50, 50, 10], [120, 80, 11, "cue"]]}
{"dt": 0.04}
{"reset": true, "detections": []}
"#;
        let records: Vec<FrameRecord> = FrameSource::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].dt, Some(0.04));
        let first = records[0].detections.as_ref().unwrap();
        assert_eq!(first[0].color, ColorClass::Solid);

        let second = records[1].detections.as_ref().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].color, ColorClass::Unknown);
        assert_eq!(second[1].color, ColorClass::Cue);
        assert_eq!(records[1].dt, None);

        assert!(records[2].detections.is_none());
        assert!(records[3].reset);
        assert_eq!(records[3].detections, Some(vec![]));
    }

    #[test]
    fn parse_error_reports_line() {
        let input = "{\"dt\": 0.04}\n\n{ nope\n";
        let mut source = FrameSource::new(Cursor::new(input));
        assert!(source.next().unwrap().is_ok());
        match source.next().unwrap() {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
