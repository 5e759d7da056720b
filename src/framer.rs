//! Line framing for the serial byte stream
//!
//! Serial chunks arrive at arbitrary boundaries; complete records are
//! newline-terminated. The framer carries the incomplete tail between calls
//! and never drops bytes.

/// Splits an incoming text stream into complete newline-terminated records.
#[derive(Debug, Default)]
pub struct LineFramer {
    carry: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every complete record it closes, terminator
    /// (and any trailing `\r`) stripped. A chunk with no terminator yields
    /// nothing and grows the carry buffer.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.carry.push_str(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.carry.find('\n') {
            let mut record: String = self.carry.drain(..=pos).collect();
            record.pop();
            if record.ends_with('\r') {
                record.pop();
            }
            records.push(record);
        }
        records
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending(&self) -> &str {
        &self.carry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_complete_lines() {
        let mut framer = LineFramer::new();
        assert_eq!(
            framer.feed("BPM:72,SpO2:98\nBPM:73,SpO2:97\n"),
            vec!["BPM:72,SpO2:98", "BPM:73,SpO2:97"]
        );
        assert_eq!(framer.pending(), "");
    }

    #[test]
    fn test_incomplete_tail_held_back() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed("BPM:72,SpO2:98\nBPM:7"), vec!["BPM:72,SpO2:98"]);
        assert_eq!(framer.pending(), "BPM:7");
        assert_eq!(framer.feed("3\n"), vec!["BPM:73"]);
    }

    #[test]
    fn test_no_terminator_yields_nothing() {
        let mut framer = LineFramer::new();
        assert!(framer.feed("BPM:72").is_empty());
        assert!(framer.feed(",SpO2:98").is_empty());
        assert_eq!(framer.feed("\n"), vec!["BPM:72,SpO2:98"]);
    }

    #[test]
    fn test_crlf_stripped() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed("BPM:72\r\nBPM:73\r\n"), vec!["BPM:72", "BPM:73"]);
    }

    #[test]
    fn test_empty_records_preserved() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed("\n\nBPM:72\n"), vec!["", "", "BPM:72"]);
    }

    #[test]
    fn test_reassembly_invariance() {
        let stream = "BPM:72,SpO2:98\nBEAT:1\r\nBPM:0\ngarbage\nBPM:75,SpO2:96\n";

        let mut whole = LineFramer::new();
        let expected = whole.feed(stream);

        for chunk_size in 1..stream.len() {
            let mut framer = LineFramer::new();
            let mut records = Vec::new();
            let bytes = stream.as_bytes();
            for chunk in bytes.chunks(chunk_size) {
                records.extend(framer.feed(std::str::from_utf8(chunk).unwrap()));
            }
            assert_eq!(records, expected, "chunk size {chunk_size}");
        }
    }
}
