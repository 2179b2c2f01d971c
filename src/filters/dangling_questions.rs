use crate::models::UtteranceBlock;

/// True if the block ends on a question whose answer falls outside it
///
/// Only a literal trailing `?` counts; trailing whitespace is not skipped.
pub fn ends_with_question(block: &UtteranceBlock) -> bool {
    block.last_text().is_some_and(|text| text.ends_with('?'))
}
