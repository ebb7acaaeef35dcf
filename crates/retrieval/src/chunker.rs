//! Text chunking with configurable size and overlap.
//!
//! Splitting happens on a separator boundary first; separator-delimited
//! segments are then packed into chunks of at most `chunk_size`
//! characters, carrying `overlap` trailing characters of each closed
//! chunk into the next one so context survives chunk boundaries.
//! Segments longer than `chunk_size` fall back to a sliding-window
//! split. Pure and synchronous.

use crate::types::Chunk;

/// Default separator boundary.
const DEFAULT_SEPARATOR: &str = "\n";

/// Splits raw document text into bounded overlapping chunks.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
    separator: &'static str,
}

impl Chunker {
    /// Create a chunker. `overlap` must be smaller than `chunk_size`
    /// (enforced by `ServerConfig::validate`); a degenerate overlap is
    /// clamped here as a second line of defense.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Split each input text into chunks. Empty inputs yield zero
    /// chunks; no chunk is ever empty or longer than `chunk_size`.
    pub fn split(&self, texts: &[String]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = texts.iter().flat_map(|text| self.split_text(text)).collect();

        tracing::debug!(
            "Chunked {} texts into {} chunks (size: {}, overlap: {})",
            texts.len(),
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }

    fn split_text(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        // True once `current` holds text beyond the carried overlap;
        // a carried-tail-only chunk is never emitted.
        let mut has_new = false;

        for segment in text.split(self.separator) {
            if segment.trim().is_empty() {
                continue;
            }

            if segment.len() >= self.chunk_size {
                if has_new {
                    chunks.push(Chunk::new(std::mem::take(&mut current)));
                }
                self.split_window(segment, &mut chunks);
                current = chunks
                    .last()
                    .map(|c| tail(&c.text, self.overlap).to_string())
                    .unwrap_or_default();
                has_new = false;
                continue;
            }

            let sep_len = if current.is_empty() { 0 } else { self.separator.len() };
            if has_new && current.len() + sep_len + segment.len() > self.chunk_size {
                chunks.push(Chunk::new(current.clone()));

                // Carry trailing context, trimmed so the next chunk
                // still fits within chunk_size.
                let budget = self
                    .chunk_size
                    .saturating_sub(segment.len() + self.separator.len());
                current = tail(&current, self.overlap.min(budget)).to_string();
                has_new = false;
            }

            // A carried prefix may itself be too long for this segment;
            // trim it so the chunk never exceeds chunk_size.
            if !has_new && !current.is_empty() {
                let projected = current.len() + self.separator.len() + segment.len();
                if projected > self.chunk_size {
                    let budget = self
                        .chunk_size
                        .saturating_sub(segment.len() + self.separator.len());
                    current = tail(&current, budget).to_string();
                }
            }

            if !current.is_empty() {
                current.push_str(self.separator);
            }
            current.push_str(segment);
            has_new = true;
        }

        if has_new && !current.is_empty() {
            chunks.push(Chunk::new(current));
        }

        chunks
    }

    /// Sliding-window split for a single segment longer than
    /// `chunk_size`, stepping by `chunk_size - overlap` on UTF-8
    /// boundaries.
    fn split_window(&self, segment: &str, chunks: &mut Vec<Chunk>) {
        let step = self.chunk_size - self.overlap;
        let mut start = 0;
        let mut prev_end = 0;

        while start < segment.len() {
            let mut end = (start + self.chunk_size).min(segment.len());
            while end > start && !segment.is_char_boundary(end) {
                end -= 1;
            }

            // The remainder is already covered by the previous window.
            if end <= prev_end {
                break;
            }
            prev_end = end;

            chunks.push(Chunk::new(&segment[start..end]));

            let mut next_start = start + step;
            while next_start < segment.len() && !segment.is_char_boundary(next_start) {
                next_start += 1;
            }
            start = next_start;
        }
    }
}

/// UTF-8 safe trailing slice of at most `overlap` bytes.
fn tail(text: &str, overlap: usize) -> &str {
    if overlap == 0 {
        return "";
    }
    if text.len() <= overlap {
        return text;
    }
    let mut idx = text.len() - overlap;
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    &text[idx..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = Chunker::new(100, 20);
        assert!(chunker.split(&[]).is_empty());
        assert!(chunker.split(&["".to_string()]).is_empty());
        assert!(chunker.split(&["\n\n\n".to_string()]).is_empty());
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunker = Chunker::new(100, 20);
        let chunks = chunker.split(&["hello world".to_string()]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
    }

    #[test]
    fn test_chunks_never_exceed_maximum() {
        let chunker = Chunker::new(100, 20);
        let text = "lorem ipsum dolor sit amet ".repeat(200);
        let chunks = chunker.split(&[text]);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.len() <= 100, "chunk of {} bytes", chunk.text.len());
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn test_adjacent_window_chunks_share_overlap() {
        let chunker = Chunker::new(50, 10);
        // One long segment, no separators: pure sliding-window path.
        let text = "abcdefghij".repeat(20);
        let chunks = chunker.split(&[text]);

        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let trailing = tail(&pair[0].text, 10);
            assert!(
                pair[1].text.starts_with(trailing),
                "expected '{}' to start with '{}'",
                pair[1].text,
                trailing
            );
        }
    }

    #[test]
    fn test_separator_packed_chunks_carry_overlap() {
        let chunker = Chunker::new(40, 10);
        let lines: Vec<String> = (0..20).map(|i| format!("line-{:03}", i)).collect();
        let text = lines.join("\n");
        let chunks = chunker.split(&[text]);

        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let trailing = tail(&pair[0].text, 10);
            assert!(
                pair[1].text.starts_with(trailing),
                "expected '{}' to start with '{}'",
                pair[1].text,
                trailing
            );
        }
    }

    #[test]
    fn test_separator_boundary_preferred() {
        let chunker = Chunker::new(30, 5);
        let chunks = chunker.split(&["first line\nsecond line\nthird line".to_string()]);

        // Segments are packed whole; no chunk starts or ends mid-word.
        for chunk in &chunks {
            assert!(chunk.text.len() <= 30);
        }
        assert!(chunks[0].text.starts_with("first line"));
    }

    #[test]
    fn test_multiple_texts_chunked_independently() {
        let chunker = Chunker::new(100, 20);
        let chunks = chunker.split(&["alpha".to_string(), "beta".to_string()]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "alpha");
        assert_eq!(chunks[1].text, "beta");
    }

    #[test]
    fn test_utf8_boundaries_are_respected() {
        let chunker = Chunker::new(20, 5);
        let text = "héllo wörld ünïcode ".repeat(10);
        // Must not panic on multi-byte boundaries.
        let chunks = chunker.split(&[text]);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.len() <= 20);
        }
    }

    #[test]
    fn test_tail_respects_char_boundaries() {
        assert_eq!(tail("hello", 0), "");
        assert_eq!(tail("hello", 3), "llo");
        assert_eq!(tail("hé", 10), "hé");
        // 'é' is two bytes; a one-byte tail lands mid-char and moves up.
        assert_eq!(tail("hé", 1), "");
    }
}
