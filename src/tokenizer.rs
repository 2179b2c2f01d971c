/// Counts the tokens a text occupies for a given generation model
pub trait TokenCounter {
    fn token_count(&self, text: &str, model_name: &str) -> usize;
}

/// Character-based token estimate
///
/// Roughly 4 characters per token for Latin script and 2 for CJK. The estimate
/// ignores `model_name`; plug in a real tokenizer where exact counts matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatingTokenCounter;

impl TokenCounter for EstimatingTokenCounter {
    fn token_count(&self, text: &str, _model_name: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        if text.is_ascii() {
            return text.len().div_ceil(4);
        }

        let mut chars: usize = 0;
        let mut cjk: usize = 0;
        for c in text.chars() {
            chars += 1;
            if is_cjk_char(c) {
                cjk += 1;
            }
        }

        cjk.div_ceil(2) + (chars - cjk).div_ceil(4)
    }
}

#[inline]
fn is_cjk_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code) // CJK Unified Ideographs
        || (0x3040..=0x309F).contains(&code) // Hiragana
        || (0x30A0..=0x30FF).contains(&code) // Katakana
        || (0xAC00..=0xD7AF).contains(&code) // Hangul
}
