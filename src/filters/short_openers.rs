use crate::models::UtteranceBlock;

/// True if the block opens with a trivially short utterance ("Ok", "So")
///
/// Characters are counted on the text as transcribed, surrounding whitespace included.
pub fn has_short_opener(block: &UtteranceBlock, max_chars: usize) -> bool {
    block
        .first_text()
        .is_some_and(|text| text.chars().count() <= max_chars)
}
