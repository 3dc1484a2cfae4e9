// Coherence bookkeeping stores: TSRAM holds one state+tag word per block,
// DSRAM holds the block data. Both are owned and mutated by the per-core
// engine; this layer only defines the representation and the on-disk codec.

use crate::commons::{BLOCK_SIZE, NUM_OF_BLOCKS};

/// tag field persisted in the low 24 bits of a TSRAM word
pub const TSRAM_TAG_MASK: u32 = 0xFF_FFFF;
const STATE_SHIFT: u32 = 24;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CoherenceState {
    #[default]
    Invalid,
    Shared,
    Exclusive,
    Modified,
}

impl CoherenceState {
    pub fn from_bits(bits: u8) -> Option<CoherenceState> {
        match bits {
            0 => Some(CoherenceState::Invalid),
            1 => Some(CoherenceState::Shared),
            2 => Some(CoherenceState::Exclusive),
            3 => Some(CoherenceState::Modified),
            _ => None,
        }
    }
}

/// pack a raw state byte and a tag into one TSRAM word; tag bits above the
/// 24-bit field are truncated to the persisted address-mask width
pub fn pack(state: u8, tag: u32) -> u32 {
    ((state as u32) << STATE_SHIFT) | (tag & TSRAM_TAG_MASK)
}

/// inverse of [`pack`]
pub fn unpack(word: u32) -> (u8, u32) {
    ((word >> STATE_SHIFT) as u8, word & TSRAM_TAG_MASK)
}

/// per-block coherence metadata
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct TsramEntry {
    pub state: CoherenceState,
    pub tag: u32,
}

impl TsramEntry {
    pub fn encode(&self) -> u32 {
        pack(self.state as u8, self.tag)
    }

    /// `None` if the state byte is not a known coherence state
    pub fn decode(word: u32) -> Option<TsramEntry> {
        let (state, tag) = unpack(word);
        CoherenceState::from_bits(state).map(|state| TsramEntry { state, tag })
    }
}

pub type Tsram = [TsramEntry; NUM_OF_BLOCKS];

pub type DataBlock = [u32; BLOCK_SIZE];
pub type Dsram = [DataBlock; NUM_OF_BLOCKS];
