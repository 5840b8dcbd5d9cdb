use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use pifsync_joybus::{JoybusChannel, JoybusChannels, JoybusCommand, idle_channels};
use pifsync_netplay::{
    FrameClock, JoybusInterceptor, NetplayError, PeerLink, PlayerNumber, SyncState,
};
use proptest::prelude::*;

fn command_strategy() -> impl Strategy<Value = JoybusCommand> {
    prop_oneof![
        Just(JoybusCommand::Status),
        Just(JoybusCommand::ControllerRead),
        Just(JoybusCommand::PakRead),
        Just(JoybusCommand::PakWrite),
        Just(JoybusCommand::EepromRead),
        Just(JoybusCommand::EepromWrite),
        Just(JoybusCommand::Reset),
        any::<u8>().prop_map(JoybusCommand::from_byte),
    ]
}

fn housekeeping_strategy() -> impl Strategy<Value = JoybusCommand> {
    prop_oneof![
        Just(JoybusCommand::Status),
        Just(JoybusCommand::Reset),
        Just(JoybusCommand::PakRead),
        Just(JoybusCommand::PakWrite),
    ]
}

/// One poll: a command per channel plus the bytes already in each reply.
fn poll_strategy(
    channel0: impl Strategy<Value = JoybusCommand>,
) -> impl Strategy<Value = JoybusChannels> {
    (
        channel0,
        prop::collection::vec(command_strategy(), 5),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 33), 6),
    )
        .prop_map(|(first, rest, payloads)| {
            let mut channels = idle_channels();
            for (index, channel) in channels.iter_mut().enumerate() {
                let command = if index == 0 { first } else { rest[index - 1] };
                *channel = JoybusChannel::request(command, 33).with_rx(&payloads[index]);
            }
            channels
        })
}

struct Rig {
    clock: FrameClock,
    calls: Arc<AtomicUsize>,
    interceptor: JoybusInterceptor,
}

fn rig(players: usize) -> Rig {
    let state = Arc::new(SyncState::new());
    let link = Arc::new(PeerLink::new());
    link.engage(PlayerNumber::new(1).unwrap());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let client = move |local: u32| -> Result<Vec<u32>, NetplayError> {
        let n = counter.fetch_add(1, Ordering::SeqCst) as u32;
        Ok((0..players as u32).map(|p| local ^ (p << 28) ^ n).collect())
    };
    Rig {
        clock: FrameClock::new(Arc::clone(&state)),
        calls,
        interceptor: JoybusInterceptor::new(state, link, Box::new(client)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn one_exchange_per_tick(
        ticks in prop::collection::vec(prop::collection::vec(poll_strategy(command_strategy()), 1..8), 1..6),
    ) {
        let mut rig = rig(4);
        let mut expected = 0;
        for (frame, polls) in ticks.into_iter().enumerate() {
            rig.clock.on_tick(frame as u32);
            let has_trigger = polls
                .iter()
                .any(|p| p[0].command() == Some(JoybusCommand::ControllerRead));
            for mut poll in polls {
                rig.interceptor.poll(&mut poll);
            }
            if has_trigger {
                expected += 1;
            }
            prop_assert_eq!(rig.calls.load(Ordering::SeqCst), expected);
        }
    }

    #[test]
    fn housekeeping_never_exchanges(
        polls in prop::collection::vec(poll_strategy(housekeeping_strategy()), 1..16),
    ) {
        let mut rig = rig(2);
        rig.clock.on_tick(1);
        for mut poll in polls {
            rig.interceptor.poll(&mut poll);
        }
        prop_assert_eq!(rig.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn replay_within_a_tick_is_byte_identical(
        trigger in poll_strategy(Just(JoybusCommand::ControllerRead)),
        poll in poll_strategy(command_strategy()),
        players in 1usize..=8,
    ) {
        let mut rig = rig(players);
        rig.clock.on_tick(3);
        let mut trigger = trigger;
        rig.interceptor.poll(&mut trigger);

        let mut first = poll.clone();
        let mut second = poll;
        rig.interceptor.poll(&mut first);
        rig.interceptor.poll(&mut second);
        prop_assert_eq!(first, second);
        prop_assert_eq!(rig.calls.load(Ordering::SeqCst), 1);
    }
}
