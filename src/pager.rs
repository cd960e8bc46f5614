//! Paging backwards through a container's log, newest lines first.
//!
//! A cursor counts the trailing lines that were already shown. Each page is the
//! `page_size` lines just before that tail, re-split into fragments that fit
//! into a single chat message. Lines are never split across fragments.

use crate::types::LogCursor;

pub const EMPTY_LOG: &str = "(empty)";
pub const NO_MORE_LINES: &str = "(no more lines)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub fragments: Vec<String>,
    pub next_offset: usize,
    /// 1-based inclusive line range and total, absent on terminal pages.
    pub range: Option<(usize, usize, usize)>,
}

impl Page {
    pub fn is_terminal(&self) -> bool {
        self.range.is_none()
    }
}

pub fn paginate(raw: &str, cursor: &LogCursor, max_fragment_len: usize) -> Page {
    let lines: Vec<&str> = raw.lines().collect();
    let total = lines.len();

    if total == 0 {
        return terminal(EMPTY_LOG, cursor.offset);
    }
    if cursor.offset >= total {
        return terminal(NO_MORE_LINES, cursor.offset);
    }

    let end = total - cursor.offset;
    let start = end.saturating_sub(cursor.page_size);

    let header = format!(
        "📜 {}: lines {}-{} of {}",
        cursor.target,
        start + 1,
        end,
        total
    );

    let fragments = chunk_lines(
        std::iter::once(header.as_str()).chain(lines[start..end].iter().copied()),
        max_fragment_len,
    );

    Page {
        fragments,
        // Advances past the end on purpose: the next request lands on the terminal page.
        next_offset: cursor.offset + cursor.page_size,
        range: Some((start + 1, end, total)),
    }
}

fn terminal(text: &str, offset: usize) -> Page {
    Page {
        fragments: vec![text.to_string()],
        next_offset: offset,
        range: None,
    }
}

/// Greedily packs lines into newline-joined fragments of at most `max_len`
/// UTF-16 code units, the unit Telegram measures message length in.
///
/// A line longer than `max_len` becomes a fragment of its own.
pub fn chunk_lines<'a>(lines: impl IntoIterator<Item = &'a str>, max_len: usize) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in lines {
        let line_len = line.encode_utf16().count();

        current = match current.take() {
            Some((mut text, len)) if len + 1 + line_len <= max_len => {
                text.push('\n');
                text.push_str(line);
                Some((text, len + 1 + line_len))
            }
            Some((text, _)) => {
                fragments.push(text);
                Some((line.to_string(), line_len))
            }
            None => Some((line.to_string(), line_len)),
        };
    }

    if let Some((text, _)) = current {
        fragments.push(text);
    }
    fragments
}
