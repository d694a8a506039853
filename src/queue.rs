/*!
# Brozli: Start-Position Queue.

The relaxation loop fans out from only a handful of recent, promising
command start positions. This module holds that bounded collection: up to
eight entries, ordered by how far each deviates from a literal-only
trajectory.
*/

use crate::command::DistanceCache;



/// # Queue Capacity.
const CAPACITY: usize = 8;



#[derive(Debug, Clone, Copy)]
/// # Start-Position Entry.
///
/// A candidate command start: the position itself, the distance cache as it
/// would stand there, and the position's cost excess over pure literals.
pub(crate) struct PosData {
	/// # Stream Position.
	pub(crate) pos: usize,

	/// # Distance Cache Snapshot.
	pub(crate) distance_cache: DistanceCache,

	/// # Cost Excess Over Literals.
	pub(crate) costdiff: f32,
}

impl PosData {
	/// # Placeholder Entry.
	const EMPTY: Self = Self {
		pos: 0,
		distance_cache: DistanceCache::new(),
		costdiff: 0.0,
	};
}



#[derive(Debug, Clone, Copy)]
/// # Start-Position Queue.
///
/// A ring of the eight smallest-`costdiff` start positions seen since the
/// last reset. Insertion lands at a slot derived from a monotonic push
/// counter; a single adjacent-swap sweep then restores ascending order,
/// which suffices because at most one new element arrives at a time.
pub(crate) struct StartPosQueue {
	q: [PosData; CAPACITY],
	idx: usize,
}

impl StartPosQueue {
	/// # New.
	pub(crate) const fn new() -> Self {
		Self {
			q: [PosData::EMPTY; CAPACITY],
			idx: 0,
		}
	}

	/// # Clear.
	pub(crate) const fn clear(&mut self) { self.idx = 0; }

	/// # Length.
	pub(crate) const fn len(&self) -> usize {
		if self.idx < CAPACITY { self.idx }
		else { CAPACITY }
	}

	/// # Push.
	pub(crate) fn push(&mut self, posdata: PosData) {
		let mut offset = !self.idx & (CAPACITY - 1);
		self.idx += 1;
		let len = self.len();
		self.q[offset] = posdata;

		// In a list of len items, at most len - 1 adjacent comparisons are
		// needed to restore order. The sweep always runs all of them even
		// once the element has settled.
		for _ in 1..len {
			let a = offset & (CAPACITY - 1);
			let b = (offset + 1) & (CAPACITY - 1);
			if self.q[a].costdiff > self.q[b].costdiff {
				self.q.swap(a, b);
			}
			offset += 1;
		}
	}

	/// # K-th Best.
	///
	/// Return the entry with the `k`-th smallest `costdiff`; zero is best.
	pub(crate) const fn at(&self, k: usize) -> &PosData {
		&self.q[k.wrapping_sub(self.idx) & (CAPACITY - 1)]
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Shorthand Entry.
	fn entry(pos: usize, costdiff: f32) -> PosData {
		PosData { pos, distance_cache: DistanceCache::new(), costdiff }
	}

	#[test]
	fn t_queue_order() {
		let mut queue = StartPosQueue::new();
		assert_eq!(queue.len(), 0);

		for (pos, costdiff) in [(1, -0.5), (2, -2.0), (3, -1.0), (4, -3.0)] {
			queue.push(entry(pos, costdiff));
		}
		assert_eq!(queue.len(), 4);

		// Ascending costdiff, best first.
		assert_eq!(queue.at(0).pos, 4);
		assert_eq!(queue.at(1).pos, 2);
		assert_eq!(queue.at(2).pos, 3);
		assert_eq!(queue.at(3).pos, 1);
		for k in 1..queue.len() {
			assert!(queue.at(k - 1).costdiff <= queue.at(k).costdiff);
		}
	}

	#[test]
	fn t_queue_capacity() {
		let mut queue = StartPosQueue::new();
		for pos in 0..20 {
			queue.push(entry(pos, -(pos as f32)));
			assert!(queue.len() <= 8);
			for k in 1..queue.len() {
				assert!(queue.at(k - 1).costdiff <= queue.at(k).costdiff);
			}
		}
		assert_eq!(queue.len(), 8);

		// The most recent pushes carried the smallest costdiffs, so the best
		// entry is the latest.
		assert_eq!(queue.at(0).pos, 19);
	}

	#[test]
	fn t_queue_clear() {
		let mut queue = StartPosQueue::new();
		queue.push(entry(1, -1.0));
		queue.push(entry(2, -2.0));
		assert_eq!(queue.len(), 2);

		queue.clear();
		assert_eq!(queue.len(), 0);

		queue.push(entry(3, -3.0));
		assert_eq!(queue.len(), 1);
		assert_eq!(queue.at(0).pos, 3);
	}
}
