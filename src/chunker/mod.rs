//! Sliding-window document chunker.
//!
//! Splits raw text into overlapping fixed-size windows for embedding. The
//! sequence is lazy, finite, and deterministic: identical input parameters
//! always produce the identical ordered windows, which is what keeps chunk
//! ids reproducible across rebuilds.

use crate::errors::{KbError, Result};

/// Iterator over overlapping text windows.
///
/// Windows are `size` characters long, starting at offset 0 and advancing by
/// `size - overlap` characters each step. Windows that are empty after
/// trimming are skipped but still advance the position; only emitted windows
/// count toward `max_chunks`.
pub struct ChunkWindows<'a> {
    text: &'a str,
    /// Byte offset of each char boundary, plus the end of the text
    boundaries: Vec<usize>,
    size: usize,
    step: usize,
    max_chunks: usize,
    pos: usize,
    emitted: usize,
}

impl<'a> ChunkWindows<'a> {
    /// Create a new window iterator.
    ///
    /// `overlap` must be strictly smaller than `size`; anything else would
    /// loop forever, so it is rejected up front.
    pub fn new(text: &'a str, size: usize, overlap: usize, max_chunks: usize) -> Result<Self> {
        if size == 0 {
            return Err(KbError::Config("chunk size must be greater than zero".to_string()));
        }
        if overlap >= size {
            return Err(KbError::Config(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                overlap, size
            )));
        }

        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());

        Ok(Self {
            text,
            boundaries,
            size,
            step: size - overlap,
            max_chunks,
            pos: 0,
            emitted: 0,
        })
    }

    /// Total length of the source in characters
    fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Slice the window starting at char offset `pos`
    fn window_at(&self, pos: usize) -> &'a str {
        let start = self.boundaries[pos];
        let end = self.boundaries[(pos + self.size).min(self.char_len())];
        &self.text[start..end]
    }
}

impl<'a> Iterator for ChunkWindows<'a> {
    /// (start offset in chars, window text)
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.char_len() && self.emitted < self.max_chunks {
            let start = self.pos;
            let window = self.window_at(start);
            self.pos += self.step;

            if window.trim().is_empty() {
                continue;
            }

            self.emitted += 1;
            return Some((start, window));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_window_offsets_match_slide_arithmetic() {
        // 1000 chars, size 300, overlap 50 -> windows at 0, 250, 500, 750
        let text = "a".repeat(1000);
        let windows: Vec<_> = ChunkWindows::new(&text, 300, 50, 10).unwrap().collect();

        let offsets: Vec<usize> = windows.iter().map(|(start, _)| *start).collect();
        assert_eq!(offsets, vec![0, 250, 500, 750]);

        assert_eq!(windows[0].1.len(), 300);
        assert_eq!(windows[3].1.len(), 250); // final window is truncated
    }

    #[test]
    fn test_max_chunks_caps_emission() {
        let text = "b".repeat(10_000);
        let windows: Vec<_> = ChunkWindows::new(&text, 100, 10, 3).unwrap().collect();
        assert_eq!(windows.len(), 3);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(ChunkWindows::new("hello", 100, 100, 10).is_err());
        assert!(ChunkWindows::new("hello", 100, 150, 10).is_err());
        assert!(ChunkWindows::new("hello", 0, 0, 10).is_err());
    }

    #[test]
    fn test_whitespace_windows_skipped_but_advance() {
        // First 100 chars are whitespace, text follows
        let text = format!("{}{}", " ".repeat(100), "x".repeat(100));
        let windows: Vec<_> = ChunkWindows::new(&text, 100, 0, 10).unwrap().collect();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].0, 100);
        assert!(windows[0].1.chars().all(|c| c == 'x'));
    }

    #[test]
    fn test_skipped_windows_do_not_count_toward_cap() {
        // Three all-whitespace windows, then two real ones, cap of 2
        let text = format!("{}{}", " ".repeat(300), "y".repeat(200));
        let windows: Vec<_> = ChunkWindows::new(&text, 100, 0, 2).unwrap().collect();
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let windows: Vec<_> = ChunkWindows::new("", 100, 10, 10).unwrap().collect();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "日本語のテキスト".repeat(50);
        for (_, window) in ChunkWindows::new(&text, 30, 5, 20).unwrap() {
            assert!(!window.is_empty());
            assert!(window.chars().count() <= 30);
        }
    }

    #[quickcheck]
    fn prop_chunking_is_deterministic(text: String, size: usize, overlap: usize) -> bool {
        let size = size % 200 + 1;
        let overlap = overlap % size;

        let first: Vec<_> = ChunkWindows::new(&text, size, overlap, 50)
            .unwrap()
            .map(|(start, w)| (start, w.to_string()))
            .collect();
        let second: Vec<_> = ChunkWindows::new(&text, size, overlap, 50)
            .unwrap()
            .map(|(start, w)| (start, w.to_string()))
            .collect();

        first == second
    }

    #[quickcheck]
    fn prop_windows_cover_text_without_gaps(len: usize) -> bool {
        let len = len % 5000;
        let size = 300;
        let overlap = 50;
        let text = "z".repeat(len);

        let offsets: Vec<usize> = ChunkWindows::new(&text, size, overlap, usize::MAX)
            .unwrap()
            .map(|(start, _)| start)
            .collect();

        // Consecutive windows overlap: each starts before the previous ends
        offsets.windows(2).all(|pair| pair[1] == pair[0] + (size - overlap))
            && offsets.last().map_or(len == 0, |&last| last + size >= len)
    }
}
