use crate::{
    AtomicSnowflakeGenerator, Epoch, Error, IdGenStatus, LockSnowflakeGenerator, MonotonicClock,
    SnowflakeGenerator, SnowflakeId, SystemClock, TimeSource,
};
use alloc::rc::Rc;
use alloc::sync::Arc;
use core::cell::Cell;
use std::collections::HashSet;
use std::sync::Mutex;
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Replays `values` one per read, repeating the last one forever.
struct ScriptedTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl ScriptedTime {
    fn new(values: &[u64]) -> Self {
        Self {
            values: values.to_vec(),
            index: Cell::new(0),
        }
    }
}

impl TimeSource for ScriptedTime {
    fn current_millis(&self) -> u64 {
        let i = self.index.get();
        self.index.set(i + 1);
        self.values[i.min(self.values.len() - 1)]
    }
}

/// A clock the test steps by hand.
#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

/// Reports `start` for the first `reads` samples, then `start + 1`.
struct AdvanceAfter {
    start: u64,
    reads: u64,
    seen: Cell<u64>,
}

impl TimeSource for AdvanceAfter {
    fn current_millis(&self) -> u64 {
        let seen = self.seen.get();
        self.seen.set(seen + 1);
        if seen < self.reads {
            self.start
        } else {
            self.start + 1
        }
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

const SEQUENCE_SLOTS: u64 = SnowflakeId::max_sequence() + 1;

fn run_id_sequence_increments_within_same_tick<G>()
where
    G: SnowflakeGenerator<MockTime>,
{
    let generator = G::with_epoch(0, Epoch::UNIX, MockTime { millis: 42 }).unwrap();
    let id1 = generator.try_poll_id().unwrap().unwrap_ready();
    let id2 = generator.try_poll_id().unwrap().unwrap_ready();
    let id3 = generator.try_poll_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_scripted_scenario<G>()
where
    G: SnowflakeGenerator<Arc<ScriptedTime>>,
{
    let time = Arc::new(ScriptedTime::new(&[1000, 1000, 1001]));
    let generator = G::with_epoch(5, Epoch::UNIX, Arc::clone(&time)).unwrap();

    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();
    let id3 = generator.next_id().unwrap();

    assert_eq!((id1.timestamp(), id1.sequence()), (1000, 0));
    assert_eq!((id2.timestamp(), id2.sequence()), (1000, 1));
    assert_eq!((id3.timestamp(), id3.sequence()), (1001, 0));
    for id in [id1, id2, id3] {
        assert_eq!(id.machine_id(), 5);
        assert_eq!(generator.extract_machine_id(id), 5);
    }
    assert_eq!(id1.to_raw(), (1000 << 22) | (5 << 12));
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_returns_pending_when_sequence_exhausted<G>()
where
    G: SnowflakeGenerator<MockTime>,
{
    let generator = G::with_epoch(0, Epoch::UNIX, MockTime { millis: 7 }).unwrap();
    for _ in 0..SEQUENCE_SLOTS {
        generator.try_poll_id().unwrap().unwrap_ready();
    }
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);
    // Still pending, nothing was consumed.
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);
}

fn run_generator_handles_rollover<G>()
where
    G: SnowflakeGenerator<SharedMockStepTime>,
{
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![42, 43],
            index: Cell::new(0),
        }),
    };
    let generator = G::with_epoch(1, Epoch::UNIX, shared_time.clone()).unwrap();

    for i in 0..SEQUENCE_SLOTS {
        let id = generator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);

    shared_time.clock.index.set(1);

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

fn run_next_id_waits_for_next_millisecond<G>()
where
    G: SnowflakeGenerator<Arc<AdvanceAfter>>,
{
    // A handful of extra reads at the exhausted millisecond force the
    // blocking loop to spin before the clock advances.
    let time = Arc::new(AdvanceAfter {
        start: 500,
        reads: SEQUENCE_SLOTS + 4,
        seen: Cell::new(0),
    });
    let generator = G::with_epoch(9, Epoch::UNIX, Arc::clone(&time)).unwrap();

    let mut last = None;
    for _ in 0..SEQUENCE_SLOTS {
        let id = generator.next_id().unwrap();
        assert_eq!(id.timestamp(), 500);
        last = Some(id);
    }

    let id = generator.next_id().unwrap();
    assert_eq!(id.timestamp(), 501);
    assert_eq!(id.sequence(), 0);
    assert!(Some(id) > last);
    assert_eq!(time.seen.get(), SEQUENCE_SLOTS + 5);
}

fn run_clock_regression_is_an_error<G>()
where
    G: SnowflakeGenerator<Arc<ScriptedTime>>,
{
    let time = Arc::new(ScriptedTime::new(&[100, 97, 100]));
    let generator = G::with_epoch(2, Epoch::UNIX, Arc::clone(&time)).unwrap();

    let first = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((first.timestamp(), first.sequence()), (100, 0));

    assert_eq!(
        generator.try_poll_id(),
        Err(Error::ClockMovedBackwards {
            last: 100,
            now: 97,
            behind_by: 3,
        })
    );

    // The failed call did not touch the state: same millisecond, next slot.
    let next = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((next.timestamp(), next.sequence()), (100, 1));
}

fn run_clock_before_epoch_is_an_error<G>()
where
    G: SnowflakeGenerator<Arc<ScriptedTime>>,
{
    let epoch = Epoch::from_millis(1_000);
    let time = Arc::new(ScriptedTime::new(&[999, 1_000]));
    let generator = G::with_epoch(0, epoch, Arc::clone(&time)).unwrap();

    assert_eq!(
        generator.try_poll_id(),
        Err(Error::ClockBeforeEpoch {
            now: 999,
            epoch: 1_000
        })
    );

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((id.timestamp(), id.sequence()), (0, 0));
    assert_eq!(generator.extract_timestamp(id), 1_000);
}

fn run_timestamp_overflow_is_an_error<G>()
where
    G: SnowflakeGenerator<Arc<ScriptedTime>>,
{
    let max = SnowflakeId::max_timestamp();
    let time = Arc::new(ScriptedTime::new(&[max, max + 1]));
    let generator = G::with_epoch(0, Epoch::UNIX, Arc::clone(&time)).unwrap();

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), max);
    assert!(id.is_valid());

    assert_eq!(
        generator.try_poll_id(),
        Err(Error::TimestampOverflow {
            timestamp: max + 1,
            max
        })
    );
}

fn run_machine_id_is_validated<G>()
where
    G: SnowflakeGenerator<MockTime>,
{
    for bad in [-1, 1024, i64::MIN, i64::MAX] {
        let err = G::new(bad, MockTime { millis: 0 }).err();
        assert_eq!(
            err,
            Some(Error::InvalidMachineId {
                machine_id: bad,
                max: 1023
            })
        );
    }
    for good in [0, 1023] {
        let generator = G::new(good, MockTime { millis: 0 }).unwrap();
        assert_eq!(i64::from(generator.machine_id().get()), good);
        assert_eq!(generator.epoch(), Epoch::default());
    }
}

fn run_epoch_is_validated<G>()
where
    G: SnowflakeGenerator<MockTime>,
{
    for bad in [Epoch::from_millis(Epoch::MAX.as_millis() + 1), Epoch::from_millis(u64::MAX)] {
        let err = G::with_epoch(0, bad, MockTime { millis: 0 }).err();
        assert_eq!(
            err,
            Some(Error::InvalidEpoch {
                epoch: bad.as_millis(),
                max: Epoch::MAX.as_millis()
            })
        );
    }

    // The latest accepted epoch still decodes the largest timestamp exactly.
    let generator = G::with_epoch(0, Epoch::MAX, MockTime { millis: 0 }).unwrap();
    let id = SnowflakeId::from_components(SnowflakeId::max_timestamp(), 0, 0);
    assert_eq!(generator.extract_timestamp(id), u64::MAX);
    #[cfg(feature = "chrono")]
    assert_eq!(generator.extract_datetime(id), None);
}

fn run_round_trip_against_system_clock<G>()
where
    G: SnowflakeGenerator<SystemClock>,
{
    let generator = G::with_epoch(1023, Epoch::TWITTER, SystemClock).unwrap();
    for _ in 0..1_000 {
        let start = SystemClock.current_millis();
        let id = generator.next_id().unwrap();
        let end = SystemClock.current_millis();

        let ts = generator.extract_timestamp(id);
        assert!(start <= ts && ts <= end, "{start} <= {ts} <= {end}");
        assert_eq!(generator.extract_machine_id(id), 1023);
        assert!(u64::from(generator.extract_sequence(id)) <= SnowflakeId::max_sequence());
        assert!(id.is_valid());
    }
}

fn run_generator_monotonic<G>()
where
    G: SnowflakeGenerator<MonotonicClock>,
{
    const TOTAL_IDS: usize = 4096 * 64;

    let generator = G::new(1, MonotonicClock::default()).unwrap();
    let mut last = generator.next_id().unwrap();

    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        assert!(id > last, "{id:?} <= {last:?}");
        assert_eq!(id.machine_id(), 1);
        if id.timestamp() == last.timestamp() {
            assert_eq!(id.sequence(), last.sequence() + 1);
        } else {
            assert_eq!(id.sequence(), 0);
        }
        last = id;
    }
}

fn run_generator_unique_threaded<G>()
where
    G: SnowflakeGenerator<MonotonicClock> + Send + Sync,
{
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = Arc::new(G::new(0, MonotonicClock::default()).unwrap());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut previous = None;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id().unwrap();
                    // Calls from one thread complete in order.
                    assert!(Some(id) > previous);
                    previous = Some(id);
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn lock_generator_sequence_test() {
    run_id_sequence_increments_within_same_tick::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_sequence_test() {
    run_id_sequence_increments_within_same_tick::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_scripted_scenario() {
    run_scripted_scenario::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_scripted_scenario() {
    run_scripted_scenario::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_pending_test() {
    run_generator_returns_pending_when_sequence_exhausted::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_pending_test() {
    run_generator_returns_pending_when_sequence_exhausted::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_rollover_test() {
    run_generator_handles_rollover::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_rollover_test() {
    run_generator_handles_rollover::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_blocks_until_next_millisecond() {
    run_next_id_waits_for_next_millisecond::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_blocks_until_next_millisecond() {
    run_next_id_waits_for_next_millisecond::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_clock_regression() {
    run_clock_regression_is_an_error::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_clock_regression() {
    run_clock_regression_is_an_error::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_clock_before_epoch() {
    run_clock_before_epoch_is_an_error::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_clock_before_epoch() {
    run_clock_before_epoch_is_an_error::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_timestamp_overflow() {
    run_timestamp_overflow_is_an_error::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_timestamp_overflow() {
    run_timestamp_overflow_is_an_error::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_machine_id_validation() {
    run_machine_id_is_validated::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_machine_id_validation() {
    run_machine_id_is_validated::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_epoch_validation() {
    run_epoch_is_validated::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_epoch_validation() {
    run_epoch_is_validated::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_round_trip() {
    run_round_trip_against_system_clock::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_round_trip() {
    run_round_trip_against_system_clock::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_monotonic_clock_sequence_increments() {
    run_generator_monotonic::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_monotonic_clock_sequence_increments() {
    run_generator_monotonic::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_threaded_unique() {
    run_generator_unique_threaded::<LockSnowflakeGenerator<_>>();
}

#[test]
fn atomic_generator_threaded_unique() {
    run_generator_unique_threaded::<AtomicSnowflakeGenerator<_>>();
}

#[test]
fn lock_generator_clones_share_state() {
    let time = MockTime { millis: 10 };
    let a = LockSnowflakeGenerator::with_epoch(4, Epoch::UNIX, Arc::new(time)).unwrap();
    let b = a.clone();
    let id1 = a.next_id().unwrap();
    let id2 = b.next_id().unwrap();
    assert_eq!((id1.sequence(), id2.sequence()), (0, 1));
}
