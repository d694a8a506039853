/*!
# Brozli: Stream Properties.

Whole-pipeline properties over generated inputs: runs are deterministic,
emitted streams account for every byte, and the rolling distance cache
always matches a forward replay of the command list.
*/

use brozli::{
	BlockState,
	BruteForceMatcher,
	Command,
	create_backward_references,
	DistanceCache,
	EncodeParams,
	Quality,
};
use proptest::prelude::*;



/// # Cache Slot Per Short Code.
///
/// Frozen format data, restated here so the replay below cannot drift with
/// the crate's own tables.
const CACHE_INDEX: [usize; 16] = [0, 1, 2, 3, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1];

/// # Cache Offset Per Short Code.
const CACHE_OFFSET: [i64; 16] = [0, 0, 0, 0, -1, 1, -2, 2, -3, 3, -1, 1, -2, 2, -3, 3];



/// # Run One Block.
fn run(data: &[u8], quality: u8) -> (Vec<Command>, BlockState) {
	let params = EncodeParams::new(Quality::new(quality), 16);
	let mut matcher = BruteForceMatcher::new();
	let mut state = BlockState::new();
	let mut commands = Vec::new();
	let count = create_backward_references(
		params,
		data.len(),
		0,
		data,
		usize::MAX,
		&mut matcher,
		&mut state,
		&mut commands,
	).expect("reference selection failed");
	assert_eq!(count, commands.len());
	(commands, state)
}

/// # Replay a Command Stream.
///
/// Recover each command's distance from its code and the rolling cache,
/// checking stream invariants along the way. Returns the final cache.
fn replay(commands: &[Command], initial: DistanceCache, num_bytes: usize)
-> DistanceCache {
	let max_backward = (1_usize << 16) - 16;
	let mut cache = initial;
	let mut pos = 0;
	for cmd in commands {
		pos += cmd.insert_len();
		assert!(cmd.copy_len() >= 2, "degenerate copy: {cmd:?}");

		let code = cmd.dist_code();
		let distance =
			if code < 16 {
				let arr = cache.as_array();
				let d = arr[CACHE_INDEX[code]] + CACHE_OFFSET[code];
				assert!(d > 0, "derived distance underflow: {cmd:?}");
				d as usize
			}
			else { code - 15 };

		// Brute-force matching never reaches the dictionary, so every
		// distance must fit the window and the data behind us.
		assert!(distance <= max_backward, "distance out of window: {cmd:?}");
		assert!(distance <= pos, "distance past origin: {cmd:?}");
		assert_eq!(cmd.len_code(), cmd.copy_len());

		if code > 0 { cache.push_front(distance as i64); }
		pos += cmd.copy_len();
	}
	assert!(pos <= num_bytes, "stream overruns block");
	cache
}

/// # Test-Side Cache Push.
///
/// A minimal stand-in for the crate's internal shift so the replay stays
/// independent.
trait PushFront { fn push_front(&mut self, d: i64); }

impl PushFront for DistanceCache {
	fn push_front(&mut self, d: i64) {
		let arr = self.as_array();
		*self = Self::from_array([d, arr[0], arr[1], arr[2]]);
	}
}



proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn t_deterministic(
		data in proptest::collection::vec(0_u8..8, 0..300),
		quality in 0_u8..=11,
	) {
		let (commands_a, state_a) = run(&data, quality);
		let (commands_b, state_b) = run(&data, quality);
		prop_assert_eq!(commands_a, commands_b);
		prop_assert_eq!(state_a, state_b);
	}

	#[test]
	fn t_stream_accounting(
		data in proptest::collection::vec(0_u8..8, 0..300),
		quality in 0_u8..=11,
	) {
		let (commands, state) = run(&data, quality);

		// Every byte lands in exactly one insert run, copy, or the
		// trailing literal carry.
		let covered = commands.iter()
			.map(|c| c.insert_len() + c.copy_len())
			.sum::<usize>();
		prop_assert_eq!(covered + state.last_insert_len, data.len());

		// Literal accounting only counts committed insert runs.
		let inserts = commands.iter().map(Command::insert_len).sum::<usize>();
		prop_assert_eq!(state.num_literals, inserts);
	}

	#[test]
	fn t_cache_replay(
		data in proptest::collection::vec(0_u8..8, 0..300),
		quality in 0_u8..=11,
	) {
		let (commands, state) = run(&data, quality);
		let replayed = replay(&commands, DistanceCache::new(), data.len());
		prop_assert_eq!(replayed, state.dist_cache);
	}
}
