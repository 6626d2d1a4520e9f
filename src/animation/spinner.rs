/// Star glyphs cycled beside the status text while the deck shuffles
const SHIMMER_FRAMES: &[char] = &['✦', '✧', '⋆', '✧'];

pub fn shimmer_frame(tick_count: u64) -> char {
    let idx = (tick_count / 3) as usize % SHIMMER_FRAMES.len();
    SHIMMER_FRAMES[idx]
}

/// Moon phases for the pulsing "tap to confirm" hint
const MOON_FRAMES: &[&str] = &["○", "◔", "◑", "◕", "●", "◕", "◑", "◔"];

pub fn moon_frame(tick_count: u64) -> &'static str {
    let idx = (tick_count / 2) as usize % MOON_FRAMES.len();
    MOON_FRAMES[idx]
}
