/// Title/artist candidates derived from a raw user message.
///
/// The split is purely syntactic: the text is cut at the first hyphen and
/// both halves are trimmed. A hyphen with whitespace on both sides wins over
/// a bare one, so hyphenated titles survive `Title - Artist` input. Nothing
/// checks that either half names a real song or artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionQuery {
    /// The trimmed input as the user typed it.
    pub raw: String,
    pub title: String,
    /// Empty when the input had no hyphen.
    pub artist: String,
}

impl ResolutionQuery {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return None;
        }

        let (title, artist) = match separator_index(raw) {
            Some(idx) => (raw[..idx].trim(), raw[idx + 1..].trim()),
            None => (raw, ""),
        };

        Some(Self {
            raw: raw.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
        })
    }

    pub fn has_artist(&self) -> bool {
        !self.artist.is_empty()
    }

    /// Free-text queries for the search source, in the order they are tried.
    pub fn search_queries(&self) -> Vec<String> {
        if self.has_artist() {
            vec![
                format!("{} {}", self.title, self.artist),
                format!("{} {}", self.artist, self.title),
            ]
        } else {
            vec![self.title.clone()]
        }
    }
}

fn separator_index(text: &str) -> Option<usize> {
    let spaced = text.char_indices().find(|&(idx, c)| {
        c == '-'
            && text[..idx].chars().next_back().is_some_and(char::is_whitespace)
            && text[idx + 1..].chars().next().is_some_and(char::is_whitespace)
    });

    spaced.map(|(idx, _)| idx).or_else(|| text.find('-'))
}
