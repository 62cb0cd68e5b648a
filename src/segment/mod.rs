//! Splitting long text into transport-sized messages.
//!
//! Lengths are counted in UTF-16 code units, which is how Telegram measures
//! its message limit. Chunks are cut only between code points, so an emoji
//! outside the BMP counts as two and is never split.

use crate::app::Result;
use crate::delivery::Delivery;

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split `text` into chunks of at most `max_len` UTF-16 code units.
///
/// Text that already fits is returned as a single chunk. Otherwise whole
/// paragraphs are packed greedily, joined by a blank line, and any paragraph
/// longer than `max_len` is cut at `max_len` boundaries. Empty input yields
/// no chunks.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);

    if text.is_empty() {
        return Vec::new();
    }
    if text_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let separator_len = text_len(PARAGRAPH_SEPARATOR);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        let paragraph_len = text_len(paragraph);

        if current_len > 0 && current_len + separator_len + paragraph_len <= max_len {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
            current_len += separator_len + paragraph_len;
            continue;
        }

        if current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if paragraph_len == 0 {
            continue;
        }

        if paragraph_len <= max_len {
            current.push_str(paragraph);
            current_len = paragraph_len;
        } else {
            chunks.extend(hard_split(paragraph, max_len));
        }
    }

    if current_len > 0 {
        chunks.push(current);
    }

    chunks
}

/// Send `text` through `delivery` one chunk at a time, in order.
///
/// The first failed send aborts the rest and is returned to the caller.
pub async fn send_segmented(text: &str, max_len: usize, delivery: &dyn Delivery) -> Result<()> {
    for chunk in segment(text, max_len) {
        delivery.send(&chunk).await?;
    }
    Ok(())
}

/// A lone code point wider than `max_len` still gets a chunk of its own.
fn hard_split(paragraph: &str, max_len: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;

    for c in paragraph.chars() {
        let width = c.len_utf16();
        if piece_len > 0 && piece_len + width > max_len {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push(c);
        piece_len += width;
    }

    if piece_len > 0 {
        pieces.push(piece);
    }
    pieces
}

fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}
