// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_clock() -> Clock {
    let mut clock = Clock::empty();
    clock.insert(PartitionId::from("p0"), Offset::new(73));
    clock
}

#[test]
fn master_state_round_trips_every_variant() {
    for state in [
        MasterState::Unavailable,
        MasterState::Initialization,
        MasterState::SpoutsRewind { clock: sample_clock() },
        MasterState::SpoutsPaused,
        MasterState::Flowing { next_snapshot: None },
        MasterState::Flowing { next_snapshot: Some(sample_clock()) },
    ] {
        let bytes = encode_master_state(&state);
        assert_eq!(decode_master_state(&bytes).unwrap(), state);
    }
}

#[test]
fn processor_state_round_trips_every_variant() {
    for state in [
        ProcessorState::UnspecifiedState,
        ProcessorState::SpoutRunning,
        ProcessorState::SpoutPaused { partition: PartitionId::from("p0"), offset: Offset::new(73) },
        ProcessorState::BoltRunning,
        ProcessorState::BoltLoaded { clock: sample_clock() },
        ProcessorState::BoltSaved { clock: sample_clock() },
        ProcessorState::SinkRunning,
        ProcessorState::NegotiatorRunning,
    ] {
        let bytes = encode_processor_state(&state);
        assert_eq!(decode_processor_state(&bytes).unwrap(), state);
    }
}

#[test]
fn decode_rejects_unknown_tag() {
    let bytes = [255u8, 0, 0, 0, 0];
    assert_eq!(decode_master_state(&bytes), Err(WireDecodeError::UnknownTag(255)));
}

#[test]
fn decode_rejects_truncated_frame() {
    let bytes = [WireTag::Flowing as u8, 0, 0];
    assert!(matches!(decode_master_state(&bytes), Err(WireDecodeError::Truncated { .. })));
}

#[test]
fn decode_master_state_rejects_processor_state_tag() {
    let encoded = encode_processor_state(&ProcessorState::BoltRunning);
    assert!(matches!(
        decode_master_state(&encoded),
        Err(WireDecodeError::UnknownTag(_))
    ));
}
