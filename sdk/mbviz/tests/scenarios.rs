use mbviz::consts::{BAR_MAX, DECAY_PERIOD};
use mbviz::meter::{pack, scale, unpack};
use mbviz::sim::{RecordingOutput, ScriptedInput, SimController, TickCounter};
use mbviz::{bring_up, DeviceIds, InitPolicy, LoopState, Role, Visualizer};

const IDS: DeviceIds = DeviceIds { status: 10, volume: 11, gfx: 12 };

fn quiet_ticks(state: &mut LoopState, n: u32) {
    for _ in 0..n {
        state.step(0);
    }
}

#[test]
fn loud_sample_pins_bar_and_peak() {
    let mut state = LoopState::new();
    let frame = state.step(32_000);

    assert_eq!(scale(32_000), 400);
    assert_eq!(frame.bar_height, 400);
    assert_eq!(frame.peak_height, 400);
    assert_eq!(state.gravity_counter, 0);
    assert_eq!(frame.packed, 0x0190_0190);
}

#[test]
fn peak_holds_for_decay_period_then_drops() {
    let mut state = LoopState::with_peak(400);

    quiet_ticks(&mut state, 500);
    assert_eq!(state.peak_height, 400);

    state.step(0);
    assert_eq!(state.peak_height, 399);
    assert_eq!(state.gravity_counter, 0);
}

#[test]
fn release_rate_is_one_unit_per_period() {
    for (start, k) in [(400, 1), (400, 7), (5, 3), (3, 5), (0, 2)] {
        let mut state = LoopState::with_peak(start);
        quiet_ticks(&mut state, (DECAY_PERIOD + 1) * k);
        assert_eq!(state.peak_height, start.saturating_sub(k), "start={start} k={k}");
    }
}

#[test]
fn silence_from_zero_stays_at_zero() {
    let mut state = LoopState::new();
    for _ in 0..10_000 {
        let frame = state.step(0);
        assert_eq!(frame.peak_height, 0);
        assert_eq!(frame.packed, 0);
    }
}

#[test]
fn peak_and_bar_stay_in_range_for_noisy_input() {
    // xorshift, so the sequence is reproducible
    let mut seed: u32 = 0x1234_5678;
    let mut state = LoopState::new();
    for _ in 0..20_000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;

        let previous_peak = state.peak_height;
        let frame = state.step(seed >> (seed & 0x1F));

        assert!(frame.bar_height <= BAR_MAX);
        assert!(frame.peak_height <= BAR_MAX);
        if frame.bar_height > previous_peak {
            assert_eq!(frame.peak_height, frame.bar_height);
            assert_eq!(state.gravity_counter, 0);
        } else {
            assert!(previous_peak - frame.peak_height <= 1);
        }
        assert_eq!(unpack(frame.packed), (frame.peak_height, frame.bar_height));
    }
}

#[test]
fn pack_round_trips_every_height() {
    for peak in 0..=BAR_MAX {
        for bar in 0..=BAR_MAX {
            assert_eq!(unpack(pack(peak, bar)), (peak, bar));
        }
    }
}

#[test]
fn simulated_board_end_to_end() {
    let mut controller = SimController::with_devices(&[IDS.status, IDS.volume, IDS.gfx]);
    let mut peripherals = bring_up(&mut controller, IDS, InitPolicy::Strict).unwrap();
    assert_eq!(peripherals.read_status(), 0);

    if let Some(volume) = peripherals.binding(Role::Volume).as_live() {
        assert_eq!(volume.direction(), Some(0xFFFF_FFFF));
    }

    let mut viz = peripherals.into_visualizer();
    let mut pacer = TickCounter::default();
    let frame = viz.run_for(&mut pacer, 3).unwrap();

    assert_eq!(frame.packed, 0);
    assert_eq!(pacer.ticks(), 3);
    let gfx = viz.gfx().as_live().unwrap();
    assert_eq!(gfx.direction(), Some(0));
    assert_eq!(gfx.last_write(), Some(0));
}

#[test]
fn missing_gfx_is_fatal_only_under_strict() {
    let mut controller = SimController::with_devices(&[IDS.status, IDS.volume]);
    let err = bring_up(&mut controller, IDS, InitPolicy::Strict).unwrap_err();
    assert_eq!(err.role, Role::Gfx);
    assert_eq!(err.to_string(), "Gfx GPIO init failed: no GPIO device with id 12");

    let mut controller = SimController::with_devices(&[IDS.status, IDS.volume]);
    let peripherals = bring_up(&mut controller, IDS, InitPolicy::BestEffort).unwrap();
    assert!(!peripherals.gfx.is_live());
}

#[test]
fn scripted_trace_through_the_loop() {
    let input = ScriptedInput::<8>::from_slice(&[0, 1600, 3200, 800, 0]);
    let mut viz = Visualizer::new(input, RecordingOutput::<8>::new());
    viz.run_for(&mut TickCounter::default(), 5);

    let words: Vec<(u32, u32)> = viz.gfx().history().map(unpack).collect();
    assert_eq!(words, [(0, 0), (200, 200), (400, 400), (400, 100), (400, 0)]);
    assert_eq!(viz.state().gravity_counter, 2);
}
