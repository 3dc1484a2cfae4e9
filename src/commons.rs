// system geometry

pub const NUM_CORES: usize = 4;

pub const OFFSET_WIDTH: u32 = 2;    // bits, word offset within a block
pub const SET_WIDTH: u32 = 6;       // bits, cache row index
pub const TAG_WIDTH: u32 = 12;      // bits

/// addresses are only meaningful below this mask; higher bits are dropped
pub const ADDR_MASK: u32 = (1 << (TAG_WIDTH + SET_WIDTH + OFFSET_WIDTH)) - 1;

pub const BLOCK_SIZE: usize = 1 << OFFSET_WIDTH;    // words per block
pub const NUM_OF_BLOCKS: usize = 1 << SET_WIDTH;    // blocks per cache

pub const MEM_FILE_SIZE: usize = 1024;              // words per core image
pub const MAIN_MEM_DEPTH: usize = 1 << 20;          // words of main memory

// addresses

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Addr(pub u32);

/// an address split into its cache-indexing fields
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CacheAddr {
    pub tag: u32,
    pub set: u32,
    pub offset: u32,
}

impl Addr {
    /// get the tag, set and offset of this address
    pub fn fields(&self) -> CacheAddr {
        let a = self.0 & ADDR_MASK;
        CacheAddr {
            tag: a >> (SET_WIDTH + OFFSET_WIDTH),
            set: (a >> OFFSET_WIDTH) & ((1 << SET_WIDTH) - 1),
            offset: a & ((1 << OFFSET_WIDTH) - 1),
        }
    }
}

// bus transactions

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BusCmd {
    #[default]
    NoCmd,
    /// shared read; passes through arbitration uninterpreted
    BusRd,
    /// exclusive read; passes through arbitration uninterpreted
    BusRdX,
    /// writeback of a modified block, triggered by a foreign access
    Flush,
    /// core finished executing, stop granting it turns
    Halt,
}

/// one transaction as observed on the bus
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BusReq {
    pub origid: u32,
    pub cmd: BusCmd,
    pub addr: Addr,
    pub data: u32,
}

impl BusReq {
    /// the quiescent bus value
    pub fn idle() -> Self {
        BusReq::default()
    }
}

/// bus-access right for the current cycle; recomputed every cycle
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BusGrant {
    pub core_id: u32,
    pub has_priority: bool,
}
