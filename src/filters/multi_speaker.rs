use crate::models::UtteranceBlock;

/// Keep single-speaker blocks and blocks with an insignificant interruption
pub fn passes_speaker_filter(block: &UtteranceBlock, max_interruption_words: usize) -> bool {
    match block.distinct_speakers().len() {
        1 => true,
        2 => is_insignificant_interruption(block, max_interruption_words),
        _ => false,
    }
}

/// A two-speaker block bracketed by the same speaker, where the other speaker
/// only chimes in briefly
///
/// The least frequent speaker (by utterance count) may contribute at most
/// `max_words` words. When both speakers are equally frequent, the speaker who
/// does not open and close the block is treated as the interrupter.
pub fn is_insignificant_interruption(block: &UtteranceBlock, max_words: usize) -> bool {
    let speakers = block.distinct_speakers();
    if speakers.len() != 2 {
        return false;
    }

    let (Some(first), Some(last)) = (block.speakers.first(), block.speakers.last()) else {
        return false;
    };
    if first != last {
        return false;
    }

    let main = first.as_str();
    let Some(other) = speakers.into_iter().find(|s| *s != main) else {
        return false;
    };

    let main_count = block.utterance_count_for(main);
    let other_count = block.utterance_count_for(other);
    if main_count == 0 || other_count == 0 {
        return false;
    }

    let least = if main_count < other_count { main } else { other };
    block.word_count_for(least) <= max_words
}
