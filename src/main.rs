use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use log::{info, trace};

use cachesim_bus::bus::{bus_cycle, CoreEngine, RoundRobinArbiter};
use cachesim_bus::cache::{Dsram, Tsram, TsramEntry};
use cachesim_bus::cli::{check_input_files, Cli};
use cachesim_bus::commons::{
    Addr, BusCmd, BusGrant, BusReq, ADDR_MASK, BLOCK_SIZE, MAIN_MEM_DEPTH, MEM_FILE_SIZE,
    NUM_CORES, NUM_OF_BLOCKS,
};
use cachesim_bus::mem::{
    load_main_mem, load_mem_files, store_dsram_to_file, store_mem_to_file, store_tsram_to_file,
    SimError,
};

/// safety cap so a misbehaving engine cannot spin forever
const MAX_CYCLES: u64 = 10_000_000;

/// Stand-in for the real per-core execution engine: each core occupies its
/// granted turns for as many turns as its image holds instructions, then
/// halts. Keeps the driver shell runnable end to end; the real engine plugs
/// in behind [`CoreEngine`].
struct IdleEngine {
    remaining: [u64; NUM_CORES],
    halted: [bool; NUM_CORES],
    tsram: [Tsram; NUM_CORES],
    dsram: [Dsram; NUM_CORES],
}

impl IdleEngine {
    fn new(imems: &[[u32; MEM_FILE_SIZE]; NUM_CORES]) -> Self {
        let mut remaining = [0u64; NUM_CORES];
        for (r, image) in remaining.iter_mut().zip(imems) {
            // instruction count = position of the last non-zero word
            *r = image
                .iter()
                .rposition(|&w| w != 0)
                .map(|p| p as u64 + 1)
                .unwrap_or(0);
        }
        IdleEngine {
            remaining,
            halted: [false; NUM_CORES],
            tsram: [[TsramEntry::default(); NUM_OF_BLOCKS]; NUM_CORES],
            dsram: [[[0; BLOCK_SIZE]; NUM_OF_BLOCKS]; NUM_CORES],
        }
    }
}

impl CoreEngine for IdleEngine {
    fn invoke(
        &mut self,
        core_id: u32,
        has_grant: bool,
        _bus_req: BusReq,
        progress_clock: bool,
        _clk: u64,
    ) -> Option<BusReq> {
        let i = core_id as usize;
        let mut req = BusReq {
            origid: core_id,
            ..BusReq::idle()
        };
        if has_grant && progress_clock && !self.halted[i] {
            if self.remaining[i] == 0 {
                self.halted[i] = true;
                req.cmd = BusCmd::Halt;
            } else {
                self.remaining[i] -= 1;
            }
        }
        Some(req)
    }
}

fn run() -> Result<(), SimError> {
    let cli = Cli::parse();
    check_input_files(&cli.files)?;

    let imems = load_mem_files(&cli.files[..NUM_CORES])?;
    let mut main_mem = load_main_mem(&cli.files[NUM_CORES])?;
    main_mem.resize(MAIN_MEM_DEPTH, 0);

    let mut engine = IdleEngine::new(&imems);
    let mut arbiter = RoundRobinArbiter::new();
    let mut halted = [false; NUM_CORES];
    let mut bus_req = BusReq::idle();
    let mut pending_cycles = 0u32;
    let mut clk = 0u64;

    let t0 = Instant::now();
    while !halted.iter().all(|&h| h) && clk < MAX_CYCLES {
        let grant = BusGrant {
            core_id: arbiter.grant(),
            // a fresh grant carries priority only while the bus is quiescent
            has_priority: bus_req.cmd == BusCmd::NoCmd,
        };
        let result = bus_cycle(&mut engine, bus_req, grant, true, clk);

        match result.req.cmd {
            BusCmd::Halt => {
                info!("core #{} halted at cycle {}", result.req.origid, clk);
                halted[result.req.origid as usize] = true;
                bus_req = BusReq::idle();
                pending_cycles = 0;
            }
            BusCmd::Flush => {
                // memory absorbs the writeback in the same cycle
                let Addr(a) = result.req.addr;
                main_mem[(a & ADDR_MASK) as usize] = result.req.data;
                trace!("cycle {clk}: flush from core #{}", result.req.origid);
                bus_req = BusReq::idle();
                pending_cycles = 0;
            }
            BusCmd::BusRd | BusCmd::BusRdX => {
                // a read occupies the bus for one extra cycle before memory
                // answers and the bus frees up
                if pending_cycles >= 1 {
                    bus_req = BusReq::idle();
                    pending_cycles = 0;
                } else {
                    bus_req = result.req;
                    pending_cycles += 1;
                }
            }
            BusCmd::NoCmd => {
                bus_req = BusReq::idle();
                pending_cycles = 0;
            }
        }
        clk += 1;
    }
    info!("finished simulation in {clk} cycles ({:?})", t0.elapsed());

    store_mem_to_file(&cli.files[NUM_CORES + 1], &main_mem)?;
    for i in 0..NUM_CORES as u32 {
        store_dsram_to_file(i, &engine.dsram[i as usize])?;
        store_tsram_to_file(i, &engine.tsram[i as usize])?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let env = Env::default()
        .filter_or("SIM_LOG_LEVEL", "info")
        .write_style_or("SIM_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
