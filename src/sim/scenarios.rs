//! Built-in Scenarios.
//!
//! Named self-checks that drive the bus-functional model through a
//! [`Testbench`]. The CLI runs them by name and the integration tests reuse
//! them. Each scenario returns the BFM statistics of its run, or the error
//! that made it fail.

use tracing::{debug, info};

use crate::common::constants::BEAT_BYTES;
use crate::common::data::{Direction, Resp};
use crate::common::error::{ControlError, HarnessError, ProtocolViolation};
use crate::config::Config;
use crate::control::driver::ControlPlaneDriver;
use crate::control::regs::ErrorCode;
use crate::control::RegisterBlock;
use crate::sim::requester::{Completion, CompletionStatus, Job, Misbehaviour};
use crate::sim::testbench::Testbench;
use crate::soc::memory::controller::{FixedDelay, Stall};
use crate::soc::traits::ChannelState;
use crate::stats::BfmStats;

/// A named self-check.
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(&Config) -> Result<BfmStats, HarnessError>,
}

/// Every built-in scenario, in the order the CLI runs them.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "std_transfer",
        description: "write 64 bytes at 0x1000 and read them back",
        run: std_transfer,
    },
    Scenario {
        name: "burst16_last",
        description: "16-beat write burst with WLAST on beat 15 only",
        run: burst16_last,
    },
    Scenario {
        name: "address_hold_stable",
        description: "ARVALID held 3 ticks with a stable payload",
        run: address_hold_stable,
    },
    Scenario {
        name: "address_unstable",
        description: "AR payload changes while waiting for ready",
        run: address_unstable,
    },
    Scenario {
        name: "indefinite_stall",
        description: "forced AR stall is never granted",
        run: indefinite_stall,
    },
    Scenario {
        name: "register_invalid_access",
        description: "unmapped register offsets answer SLVERR",
        run: register_invalid_access,
    },
    Scenario {
        name: "watchdog_abort",
        description: "requester withdraws ARVALID after its watchdog expires",
        run: watchdog_abort,
    },
    Scenario {
        name: "forced_errors",
        description: "forced SLVERR on every read beat and on the write response",
        run: forced_errors,
    },
    Scenario {
        name: "reset_recovery",
        description: "reset mid-burst, then a clean transfer",
        run: reset_recovery,
    },
    Scenario {
        name: "random_delay_stress",
        description: "seeded random handshake delays on a 128-byte round trip",
        run: random_delay_stress,
    },
    Scenario {
        name: "back_to_back",
        description: "queued bursts with read/response back-pressure",
        run: back_to_back,
    },
    Scenario {
        name: "overlap_copy",
        description: "store-and-forward copy 0x8000 -> 0x8010 over an overlapping region",
        run: overlap_copy,
    },
    Scenario {
        name: "reverse_overlap_copy",
        description: "store-and-forward copy 0x8010 -> 0x8000 over an overlapping region",
        run: reverse_overlap_copy,
    },
    Scenario {
        name: "zero_delay_throughput",
        description: "4096-byte read and write bursts with no injected delay",
        run: zero_delay_throughput,
    },
];

/// Out-of-the-way region holding the source bytes of a copy as they were
/// before the transfer.
const COPY_REFERENCE: u64 = 0xF000;

/// Bytes initialised around an overlapping copy.
const COPY_REGION_BYTES: usize = 128;

/// Looks a scenario up by name.
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

/// Error code an engine would post for a finished job.
pub fn completion_code(completion: &Completion) -> ErrorCode {
    match (completion.status, completion.direction) {
        (CompletionStatus::TimedOut, Direction::Read) => ErrorCode::SrcTimeout,
        (CompletionStatus::TimedOut, Direction::Write) => ErrorCode::DstTimeout,
        (CompletionStatus::SlaveError, _) => ErrorCode::BusResponseError,
        _ => ErrorCode::None,
    }
}

/// Incrementing byte pattern starting at `seed`.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

fn ensure(cond: bool, msg: impl Into<String>) -> Result<(), HarnessError> {
    if cond {
        Ok(())
    } else {
        Err(HarnessError::ScenarioFailed(msg.into()))
    }
}

fn ensure_okay(completion: &Completion, what: &str) -> Result<(), HarnessError> {
    ensure(
        completion.is_okay(),
        format!("{} finished with {:?}", what, completion.status),
    )
}

/// Posts `code` on a fresh register block and reads it back through the
/// driver.
fn post_status(code: ErrorCode) -> Result<ErrorCode, HarnessError> {
    let mut block = RegisterBlock::new();
    block.complete(code);
    let mut driver = ControlPlaneDriver::new(block);
    let status = driver
        .wait_done(1)
        .map_err(|e| HarnessError::ScenarioFailed(e.to_string()))?;
    Ok(status.code.unwrap_or_default())
}

fn std_transfer(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    let data = pattern(64, 0);

    ensure_okay(&tb.write(0x1000, &data)?, "write")?;
    let read = tb.read(0x1000, data.len())?;
    ensure_okay(&read, "read")?;

    for line in tb.memory().hex_dump(0x1000, data.len()) {
        debug!("{}", line);
    }
    ensure(read.data == data, "read data differs from written data")?;
    Ok(tb.bfm().stats().clone())
}

fn burst16_last(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    let data = pattern(256, 0x40);
    tb.requester_mut().submit(Job::Write {
        addr: 0x3000,
        data: data.clone(),
        id: 1,
    })?;

    let mut beats = 0u32;
    let mut last_beats = Vec::new();
    let mut remaining = config.sim.max_ticks;
    while !tb.is_idle() {
        ensure(remaining > 0, "write burst did not finish")?;
        remaining -= 1;
        let bus = tb.step()?;
        if bus.w_handshake() {
            if bus.master.w.payload.last {
                last_beats.push(beats);
            }
            beats += 1;
        }
    }

    ensure(beats == 16, format!("{} beats accepted, expected 16", beats))?;
    ensure(
        last_beats == [15],
        format!("WLAST seen on beats {:?}", last_beats),
    )?;
    ensure(
        tb.bfm().monitor().write_bursts_verified() == 1,
        "monitor did not verify the burst",
    )?;
    ensure(tb.verify(0x3000, &data), "memory differs from written data")?;
    Ok(tb.bfm().stats().clone())
}

fn address_hold_stable(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.bfm_mut()
        .policy_mut()
        .set_delay_source(Box::new(FixedDelay::address(2)));
    tb.preload(0x1000, &pattern(16, 0x10));
    tb.requester_mut().submit(Job::Read {
        addr: 0x1000,
        len: 16,
        id: 2,
    })?;

    let mut held = 0u32;
    loop {
        let bus = tb.step()?;
        if bus.ar_handshake() {
            break;
        }
        if bus.master.ar.valid {
            held += 1;
        }
        ensure(held <= 8, "address handshake never granted")?;
    }
    ensure(held == 3, format!("ARVALID held {} ticks, expected 3", held))?;
    tb.run_until_idle()?;
    Ok(tb.bfm().stats().clone())
}

fn address_unstable(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.bfm_mut()
        .policy_mut()
        .set_delay_source(Box::new(FixedDelay::address(2)));
    tb.requester_mut().inject(Misbehaviour::UnstableAddress);

    match tb.read(0x1000, 16) {
        Err(HarnessError::Protocol(ProtocolViolation::UnstableAddress { .. })) => {
            info!("monitor flagged the unstable address as expected");
            Ok(tb.bfm().stats().clone())
        }
        Err(e) => Err(e),
        Ok(_) => Err(HarnessError::ScenarioFailed(
            "unstable address was not detected".into(),
        )),
    }
}

fn indefinite_stall(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.bfm_mut().policy_mut().set_stall(Stall::Indefinite);
    tb.requester_mut().submit(Job::Read {
        addr: 0x1000,
        len: 64,
        id: 0,
    })?;
    tb.run_for(config.sim.watchdog_ticks)?;

    ensure(
        tb.bfm().read_state() == ChannelState::AwaitingAddressHandshake,
        "read handler left the address phase",
    )?;
    ensure(
        tb.bfm().stats().read_bursts == 0,
        "address handshake was granted",
    )?;
    ensure(!tb.requester().is_idle(), "requester finished unexpectedly")?;
    Ok(tb.bfm().stats().clone())
}

fn register_invalid_access(_config: &Config) -> Result<BfmStats, HarnessError> {
    let mut driver = ControlPlaneDriver::new(RegisterBlock::new());
    let fail = |e: ControlError| HarnessError::ScenarioFailed(e.to_string());

    driver.read_reg(0x4).map_err(fail)?;
    driver.expect_read_error(0x20).map_err(fail)?;
    driver.expect_write_error(0x24, 0xDEAD_BEEF).map_err(fail)?;
    Ok(BfmStats::default())
}

fn watchdog_abort(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.bfm_mut().policy_mut().set_stall(Stall::Indefinite);
    tb.requester_mut()
        .set_watchdog(Some(config.sim.watchdog_ticks));

    let completion = tb.read(0x1000, 64)?;
    ensure(
        completion.status == CompletionStatus::TimedOut,
        format!("read finished with {:?}", completion.status),
    )?;
    ensure(tb.bfm().is_idle(), "read handler did not return to Idle")?;
    ensure(
        tb.bfm().stats().requester_aborts == 1,
        "abort was not recorded",
    )?;

    let code = post_status(completion_code(&completion))?;
    ensure(
        code == ErrorCode::SrcTimeout,
        format!("status reports {}", code),
    )?;

    tb.bfm_mut().policy_mut().clear_faults();
    tb.requester_mut().set_watchdog(None);
    tb.preload(0x1000, &pattern(16, 0x77));
    let retry = tb.read(0x1000, 16)?;
    ensure_okay(&retry, "read after abort")?;
    Ok(tb.bfm().stats().clone())
}

fn forced_errors(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);

    tb.bfm_mut().policy_mut().set_force_read_error(true);
    let read = tb.read(0xD000, 64)?;
    ensure(
        read.responses.len() == 4 && read.responses.iter().all(|r| *r == Resp::SlvErr),
        format!("read responses {:?}", read.responses),
    )?;
    ensure(
        post_status(completion_code(&read))? == ErrorCode::BusResponseError,
        "read error not reported as a bus response error",
    )?;
    tb.bfm_mut().policy_mut().clear_faults();

    tb.bfm_mut().policy_mut().set_force_write_error(true);
    let write = tb.write(0xE100, &pattern(64, 0))?;
    ensure(
        write.responses == [Resp::SlvErr],
        format!("write responses {:?}", write.responses),
    )?;
    tb.bfm_mut().policy_mut().clear_faults();

    ensure_okay(&tb.write(0xE200, &pattern(16, 0))?, "write after clear")?;
    Ok(tb.bfm().stats().clone())
}

fn reset_recovery(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    let data = pattern(256, 0x80);
    tb.requester_mut().submit(Job::Write {
        addr: 0xA000,
        data: data.clone(),
        id: 3,
    })?;

    let mut remaining = config.sim.max_ticks;
    while tb.bfm().write_handler().beats_accepted().unwrap_or(0) < 4 {
        ensure(remaining > 0, "write burst never reached beat 4")?;
        remaining -= 1;
        tb.step()?;
    }
    tb.pulse_reset(5)?;

    ensure(tb.bfm().is_idle(), "handlers not Idle after reset")?;
    ensure(
        tb.bfm().driven().is_quiet(),
        "BFM still drives lines after reset",
    )?;
    let abandoned = tb.requester_mut().take_completions();
    ensure(
        abandoned.len() == 1 && abandoned[0].status == CompletionStatus::Abandoned,
        format!("completions after reset: {:?}", abandoned),
    )?;
    ensure(
        tb.verify(0xA000, &data[..64]),
        "bytes written before reset were lost",
    )?;

    let fresh = vec![0xCC; 16];
    ensure_okay(&tb.write(0xB000, &fresh)?, "post-reset write")?;
    let read = tb.read(0xB000, 16)?;
    ensure(read.data == fresh, "post-reset read mismatch")?;
    Ok(tb.bfm().stats().clone())
}

fn random_delay_stress(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.bfm_mut().policy_mut().set_random_delays(true);
    let data = pattern(128, 0x33);

    ensure_okay(&tb.write(0x6000, &data)?, "stress write")?;
    let read = tb.read(0x6000, data.len())?;
    ensure_okay(&read, "stress read")?;
    ensure(read.data == data, "stress read mismatch")?;
    Ok(tb.bfm().stats().clone())
}

fn back_to_back(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.requester_mut().ready_every(3);
    let first = pattern(128, 0);
    let second = pattern(128, 0x80);

    let jobs = [
        Job::Write {
            addr: 0x4000,
            data: first.clone(),
            id: 0,
        },
        Job::Write {
            addr: 0x4080,
            data: second.clone(),
            id: 1,
        },
        Job::Read {
            addr: 0x4000,
            len: 256,
            id: 2,
        },
    ];
    for job in jobs {
        tb.requester_mut().submit(job)?;
    }
    tb.run_until_idle()?;

    let completions = tb.requester_mut().take_completions();
    ensure(completions.len() == 3, "missing completions")?;
    for c in &completions {
        ensure_okay(c, "queued job")?;
    }
    let expected: Vec<u8> = first.into_iter().chain(second).collect();
    ensure(completions[2].data == expected, "back-to-back read mismatch")?;
    Ok(tb.bfm().stats().clone())
}

/// Copies `len` bytes from `src` to `dst` as one read burst followed by one
/// write burst of the bytes read, then checks the destination byte by byte
/// against the source as it was before the copy.
fn check_copy(
    config: &Config,
    src: u64,
    dst: u64,
    len: usize,
) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    let region = src.min(dst);
    let initial = pattern(COPY_REGION_BYTES, 0);
    tb.preload(region, &initial);
    let original = tb.memory().read_bytes(src, len);
    tb.preload(COPY_REFERENCE, &original);

    let read = tb.read(src, len)?;
    ensure_okay(&read, "copy read")?;
    ensure_okay(&tb.write(dst, &read.data)?, "copy write")?;

    let mismatches = tb.memory().compare(COPY_REFERENCE, dst, len);
    if let Some(first) = mismatches.first() {
        for line in tb.memory().hex_dump(region, COPY_REGION_BYTES) {
            debug!("{}", line);
        }
        return Err(HarnessError::ScenarioFailed(format!(
            "{} bytes differ after copy {:#x} -> {:#x}; first at +{}: expected {:#04x}, got {:#04x}",
            mismatches.len(),
            src,
            dst,
            first.offset,
            first.expected,
            first.actual
        )));
    }

    // Bytes of the region outside the destination are untouched.
    for (i, expected) in initial.iter().enumerate() {
        let addr = region + i as u64;
        if (dst..dst + len as u64).contains(&addr) {
            continue;
        }
        let actual = tb.memory().read_byte(addr);
        ensure(
            actual == *expected,
            format!("byte at {:#x} changed to {:#04x}", addr, actual),
        )?;
    }
    Ok(tb.bfm().stats().clone())
}

fn overlap_copy(config: &Config) -> Result<BfmStats, HarnessError> {
    check_copy(config, 0x8000, 0x8010, 64)
}

fn reverse_overlap_copy(config: &Config) -> Result<BfmStats, HarnessError> {
    check_copy(config, 0x8010, 0x8000, 64)
}

fn zero_delay_throughput(config: &Config) -> Result<BfmStats, HarnessError> {
    let mut tb = Testbench::new(config);
    tb.bfm_mut().policy_mut().set_random_delays(false);
    let data = pattern(4096, 0x21);
    let beats = (data.len() / BEAT_BYTES) as u64;
    tb.preload(0x1000, &data);

    // AR handshake, then one R beat per tick.
    let start = tb.time();
    ensure_okay(&tb.read(0x1000, data.len())?, "throughput read")?;
    let read_ticks = tb.time() - start;
    ensure(
        read_ticks == beats + 2,
        format!("{} read beats took {} ticks, expected {}", beats, read_ticks, beats + 2),
    )?;

    // AW handshake, two ticks per W beat, then the B handshake.
    let start = tb.time();
    ensure_okay(&tb.write(0x2000, &data)?, "throughput write")?;
    let write_ticks = tb.time() - start;
    ensure(
        write_ticks == 2 * beats + 3,
        format!(
            "{} write beats took {} ticks, expected {}",
            beats,
            write_ticks,
            2 * beats + 3
        ),
    )?;

    ensure(
        tb.bfm().stats().delay_ticks == 0,
        "delay ticks recorded with injection disabled",
    )?;
    info!(read_ticks, write_ticks, "zero-delay burst timing");
    Ok(tb.bfm().stats().clone())
}
