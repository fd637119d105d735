//! Integration tests for the write channel handler.

use axi_dma_bfm::common::{Resp, STRB_ALL};
use axi_dma_bfm::soc::channels::WriteChannelHandler;
use axi_dma_bfm::soc::memory::controller::{FixedDelay, TimingPolicy};
use axi_dma_bfm::soc::memory::SparseMemory;
use axi_dma_bfm::soc::signals::{
    AddrChannel, AddrPayload, SignalBus, WriteData, WriteDataChannel,
};
use axi_dma_bfm::soc::traits::{ChannelHandler, ChannelState, HandlerContext};
use axi_dma_bfm::stats::BfmStats;

/// Resources a handler borrows each tick.
#[derive(Default)]
struct Fixture {
    memory: SparseMemory,
    policy: TimingPolicy,
    stats: BfmStats,
}

impl Fixture {
    fn ctx(&mut self) -> HandlerContext<'_> {
        HandlerContext {
            memory: &mut self.memory,
            policy: &mut self.policy,
            stats: &mut self.stats,
        }
    }
}

fn aw_request(addr: u64, beats: u32, id: u8) -> SignalBus {
    let mut bus = SignalBus::default();
    bus.master.aw = AddrChannel {
        valid: true,
        payload: AddrPayload::new(addr, beats, id),
    };
    bus
}

fn beat(first: u8, strb: u16, last: bool) -> WriteDataChannel {
    let bytes: Vec<u8> = (first..first + 16).collect();
    WriteDataChannel {
        valid: true,
        payload: WriteData {
            data: u128::from_le_bytes(bytes.try_into().unwrap()),
            strb,
            last,
        },
    }
}

/// Drives AW through its handshake and leaves the handler waiting for data.
fn accept_address(handler: &mut WriteChannelHandler, fx: &mut Fixture, bus: &mut SignalBus) {
    let (state, drive) = handler.advance(bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::AwaitingAddressHandshake);
    assert!(drive.aw_ready);
    let (state, _) = handler.advance(bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::InDataPhase);
    bus.master.aw.valid = false;
}

/// Tests a two-beat burst including a partial strobe on the last beat.
#[test]
fn test_write_two_beat_burst() {
    let mut fx = Fixture::default();
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x2000, 2, 7);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, false);
    let (_, drive) = handler.advance(&bus, &mut fx.ctx());
    assert!(drive.w_ready);
    assert_eq!(fx.memory.populated(), 0);

    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::InDataPhase);
    assert!(!drive.w_ready);
    assert_eq!(handler.beats_accepted(), Some(1));

    bus.master.w = beat(16, 0x00FF, true);
    handler.advance(&bus, &mut fx.ctx());
    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::AwaitingResponseHandshake);
    assert!(drive.b.valid);
    assert_eq!(drive.b.resp, Resp::Okay);
    assert_eq!(drive.b.id, 7);

    bus.master.w.valid = false;
    bus.master.b_ready = true;
    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert!(!drive.b.valid);

    let expected: Vec<u8> = (0..24).chain([0u8; 8]).collect();
    assert_eq!(fx.memory.read_bytes(0x2000, 32), expected);
    assert_eq!(fx.stats.write_bursts, 1);
    assert_eq!(fx.stats.write_beats, 2);
    assert_eq!(fx.stats.bytes_written, 24);
}

/// Tests that only strobed lanes are stored.
#[test]
fn test_write_sparse_strobe() {
    let mut fx = Fixture::default();
    fx.memory.write_bytes(0x3000, &[0xEE; 16]);
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x3000, 1, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0x10, 0b1010, true);
    handler.advance(&bus, &mut fx.ctx());
    handler.advance(&bus, &mut fx.ctx());

    let stored = fx.memory.read_bytes(0x3000, 4);
    assert_eq!(stored, vec![0xEE, 0x11, 0xEE, 0x13]);
    assert_eq!(fx.stats.bytes_written, 2);
}

/// Tests that the write response is held until BREADY.
#[test]
fn test_write_response_held_until_ready() {
    let mut fx = Fixture::default();
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x2000, 1, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, true);
    handler.advance(&bus, &mut fx.ctx());
    handler.advance(&bus, &mut fx.ctx());
    bus.master.w.valid = false;

    for _ in 0..4 {
        let (state, drive) = handler.advance(&bus, &mut fx.ctx());
        assert_eq!(state, ChannelState::AwaitingResponseHandshake);
        assert!(drive.b.valid);
    }
}

/// Tests that a forced write error yields SLVERR on the response.
#[test]
fn test_write_forced_error_response() {
    let mut fx = Fixture::default();
    fx.policy.set_force_write_error(true);
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x2000, 1, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, true);
    handler.advance(&bus, &mut fx.ctx());
    let (_, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(drive.b.resp, Resp::SlvErr);

    bus.master.b_ready = true;
    handler.advance(&bus, &mut fx.ctx());
    assert_eq!(fx.stats.error_responses, 1);
}

/// Tests that a fixed address delay withholds AWREADY for that many ticks.
#[test]
fn test_write_address_delay() {
    let mut fx = Fixture::default();
    fx.policy.set_delay_source(Box::new(FixedDelay::address(2)));
    let mut handler = WriteChannelHandler::new();
    let bus = aw_request(0x2000, 1, 0);

    let mut grants = Vec::new();
    for _ in 0..3 {
        let (_, drive) = handler.advance(&bus, &mut fx.ctx());
        grants.push(drive.aw_ready);
    }
    assert_eq!(grants, vec![false, false, true]);
    assert_eq!(fx.stats.delay_ticks, 2);
}

/// Tests that reset during the data phase keeps already-stored beats.
#[test]
fn test_write_reset_mid_burst() {
    let mut fx = Fixture::default();
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x4000, 4, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, false);
    handler.advance(&bus, &mut fx.ctx());
    handler.advance(&bus, &mut fx.ctx());
    assert_eq!(handler.beats_accepted(), Some(1));

    bus.reset = true;
    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert!(!drive.aw_ready && !drive.w_ready && !drive.b.valid);
    assert_eq!(fx.stats.abandoned_bursts, 1);

    let expected: Vec<u8> = (0..16).collect();
    assert_eq!(fx.memory.read_bytes(0x4000, 16), expected);
    assert_eq!(fx.memory.read_bytes(0x4010, 16), vec![0; 16]);
}

/// Tests that AWVALID withdrawn before the grant returns the handler to Idle.
#[test]
fn test_write_address_withdrawn() {
    let mut fx = Fixture::default();
    fx.policy.set_delay_source(Box::new(FixedDelay::address(5)));
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x2000, 1, 0);

    handler.advance(&bus, &mut fx.ctx());
    bus.master.aw.valid = false;
    let (state, _) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert_eq!(fx.stats.write_bursts, 0);
}

fn reset_bus() -> SignalBus {
    SignalBus {
        reset: true,
        ..SignalBus::default()
    }
}

/// Tests that reset while BVALID is driven abandons the response.
#[test]
fn test_write_reset_during_response_valid() {
    let mut fx = Fixture::default();
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x2000, 1, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, true);
    handler.advance(&bus, &mut fx.ctx());
    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::AwaitingResponseHandshake);
    assert!(drive.b.valid);

    let (state, drive) = handler.advance(&reset_bus(), &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert_eq!(drive, Default::default());
    assert_eq!(fx.stats.abandoned_bursts, 1);

    let (state, drive) = handler.advance(&SignalBus::default(), &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert!(!drive.b.valid);
    let expected: Vec<u8> = (0..16).collect();
    assert_eq!(fx.memory.read_bytes(0x2000, 16), expected);
}

/// Tests that reset while the response is delayed never drives BVALID.
#[test]
fn test_write_reset_during_response_hold() {
    let mut fx = Fixture::default();
    fx.policy.set_delay_source(Box::new(FixedDelay {
        address: 0,
        data: 0,
        response: 3,
    }));
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x2000, 1, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, true);
    handler.advance(&bus, &mut fx.ctx());
    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::AwaitingResponseHandshake);
    assert!(!drive.b.valid);

    let (state, drive) = handler.advance(&reset_bus(), &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert_eq!(drive, Default::default());
    assert_eq!(fx.stats.abandoned_bursts, 1);

    for _ in 0..5 {
        let (state, drive) = handler.advance(&SignalBus::default(), &mut fx.ctx());
        assert_eq!(state, ChannelState::Idle);
        assert!(!drive.b.valid);
    }
}

/// Tests that reset on the tick AWREADY is driven captures no burst.
#[test]
fn test_write_reset_on_address_grant() {
    let mut fx = Fixture::default();
    let mut handler = WriteChannelHandler::new();
    let bus = aw_request(0x2000, 2, 0);

    let (_, drive) = handler.advance(&bus, &mut fx.ctx());
    assert!(drive.aw_ready);

    let (state, drive) = handler.advance(&reset_bus(), &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert_eq!(drive, Default::default());
    assert!(handler.current_burst().is_none());
    assert_eq!(fx.stats.write_bursts, 0);
    assert_eq!(fx.stats.abandoned_bursts, 0);
}

/// Tests that reset while a write beat is being delayed discards it.
#[test]
fn test_write_reset_during_data_hold() {
    let mut fx = Fixture::default();
    fx.policy.set_delay_source(Box::new(FixedDelay {
        address: 0,
        data: 3,
        response: 0,
    }));
    let mut handler = WriteChannelHandler::new();
    let mut bus = aw_request(0x5000, 2, 0);
    accept_address(&mut handler, &mut fx, &mut bus);

    bus.master.w = beat(0, STRB_ALL, false);
    let (state, drive) = handler.advance(&bus, &mut fx.ctx());
    assert_eq!(state, ChannelState::InDataPhase);
    assert!(!drive.w_ready);

    let (state, drive) = handler.advance(&reset_bus(), &mut fx.ctx());
    assert_eq!(state, ChannelState::Idle);
    assert_eq!(drive, Default::default());
    assert_eq!(fx.stats.abandoned_bursts, 1);
    assert_eq!(fx.stats.write_beats, 0);
    assert_eq!(fx.memory.populated(), 0);
}
