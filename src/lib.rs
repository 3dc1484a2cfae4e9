/*
    Shared-bus arbitration and cache-coherence bookkeeping for a small
    4-core simulator: per-cycle round-robin bus grants, snoop-triggered
    flush merging, and the TSRAM/DSRAM snapshot representation.
 */

pub mod bus;
pub mod cache;
pub mod cli;
pub mod commons;
pub mod mem;
