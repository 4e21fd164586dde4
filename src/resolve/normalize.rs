/// Matching projection of a string: lower-cased, curly quotes unified,
/// whitespace runs collapsed to one space and trimmed.
///
/// Every byte of the projection remembers the byte offset of the original
/// character it came from, so offsets found in the projection can be used to
/// slice the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    origins: Vec<usize>,
}

impl NormalizedText {
    pub fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut origins = Vec::with_capacity(original.len() + 1);
        let mut pending_space: Option<usize> = None;
        let mut consumed_end = 0;

        for (offset, ch) in original.char_indices() {
            if ch.is_whitespace() {
                if !text.is_empty() && pending_space.is_none() {
                    pending_space = Some(offset);
                }
                continue;
            }

            if let Some(space_offset) = pending_space.take() {
                push_mapped(&mut text, &mut origins, ' ', space_offset);
            }
            for folded in unify_quote(ch).to_lowercase() {
                push_mapped(&mut text, &mut origins, folded, offset);
            }
            consumed_end = offset + ch.len_utf8();
        }

        origins.push(consumed_end);
        Self { text, origins }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte offset in the original string for a byte offset of the projection.
    /// Offsets past the end map to the end of the last kept character.
    pub fn original_offset(&self, normalized_offset: usize) -> usize {
        let index = normalized_offset.min(self.origins.len() - 1);
        self.origins[index]
    }

    /// Byte offset of the first occurrence of `needle` at or after `from`.
    pub fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        self.text
            .get(from..)?
            .find(needle)
            .map(|position| position + from)
    }
}

pub fn normalize(input: &str) -> String {
    NormalizedText::new(input).text
}

fn unify_quote(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        other => other,
    }
}

fn push_mapped(text: &mut String, origins: &mut Vec<usize>, ch: char, origin: usize) {
    text.push(ch);
    origins.extend(std::iter::repeat_n(origin, ch.len_utf8()));
}
