use log::warn;

use crate::commons::{BusCmd, BusGrant, BusReq, NUM_CORES};

// round-robin arbitration

/// rotating grant cursor over the core ids; call once per cycle
#[derive(Clone, Debug)]
pub struct RoundRobinArbiter {
    next: u32,
}

impl RoundRobinArbiter {
    pub fn new() -> Self {
        RoundRobinArbiter { next: 0 }
    }

    /// current grant target, then advance with wrap-around
    pub fn grant(&mut self) -> u32 {
        let curr = self.next;
        self.next = if curr == NUM_CORES as u32 - 1 { 0 } else { curr + 1 };
        curr
    }
}

impl Default for RoundRobinArbiter {
    fn default() -> Self {
        Self::new()
    }
}

// per-core engine seam

/// The per-core execution engine. Invoked synchronously, at most twice per
/// cycle for the granted core and once for every other core; side effects
/// must stay within the core's own state. `None` marks an unusable result
/// and is reported as a diagnostic by the arbitration loop.
pub trait CoreEngine {
    fn invoke(
        &mut self,
        core_id: u32,
        has_grant: bool,
        bus_req: BusReq,
        progress_clock: bool,
        clk: u64,
    ) -> Option<BusReq>;
}

// protocol-violation diagnostics

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Violation {
    /// the engine produced no usable result for this core
    InvalidResponse { core_id: u32 },
    /// a second core flushed in the same cycle; its flush is dropped
    DoubleFlush { core_id: u32 },
    /// a non-granted core flushed during the granted core's turn
    FlushDuringPriority { core_id: u32, gnt_core_id: u32 },
}

/// outcome of one bus cycle: the single winning transaction plus any
/// violations observed while polling
#[derive(Clone, Debug)]
pub struct CycleResult {
    pub req: BusReq,
    pub violations: Vec<Violation>,
}

/// Arbitrate one bus cycle. The granted core goes first on priority cycles
/// and its command wins unless a halt overrides it; on non-priority cycles
/// at most one snoop-triggered flush is merged. Halt anywhere ends polling
/// for the cycle. Violations are logged and returned, never fatal.
pub fn bus_cycle<E: CoreEngine>(
    engine: &mut E,
    mut bus_req: BusReq,
    grant: BusGrant,
    progress_clock: bool,
    clk: u64,
) -> CycleResult {
    let mut violations = Vec::new();

    if grant.has_priority {
        match engine.invoke(grant.core_id, true, bus_req, progress_clock, clk) {
            Some(req) => bus_req = req,
            None => {
                warn!("core #{} returned an invalid result", grant.core_id);
                violations.push(Violation::InvalidResponse { core_id: grant.core_id });
            }
        }
        // a halting core always wins, no further polling
        if bus_req.cmd == BusCmd::Halt {
            return CycleResult { req: bus_req, violations };
        }
    }

    let mut winner = bus_req;
    let mut core_issued_flush = false;

    for core_id in 0..NUM_CORES as u32 {
        if grant.has_priority && core_id == grant.core_id {
            continue;
        }
        let core_cmd = match engine.invoke(core_id, false, bus_req, progress_clock, clk) {
            Some(req) => req,
            None => {
                warn!("core #{core_id} returned an invalid result");
                violations.push(Violation::InvalidResponse { core_id });
                continue;
            }
        };
        if core_cmd.cmd == BusCmd::Halt {
            return CycleResult { req: core_cmd, violations };
        }
        if core_cmd.cmd == BusCmd::Flush {
            if !grant.has_priority {
                // cores with modified data flush when a foreign access snoops
                // their block; only one such writeback is legal per cycle
                if core_issued_flush {
                    warn!("core #{core_id} flushed in a cycle that already carries a flush");
                    violations.push(Violation::DoubleFlush { core_id });
                } else {
                    core_issued_flush = true;
                    winner = core_cmd;
                }
            } else {
                warn!(
                    "core #{} issued flush while core #{} issued a req on its turn",
                    core_id, grant.core_id
                );
                violations.push(Violation::FlushDuringPriority {
                    core_id,
                    gnt_core_id: grant.core_id,
                });
            }
        }
    }

    CycleResult { req: winner, violations }
}
