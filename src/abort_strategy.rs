use crate::numeric::*;

/// Enum with possible abort strategies.
/// These strategies specify when the refinement iterations of a single attempt are stopped before
/// `max_iter` is reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
    /// Never stop early: every attempt runs all of its `max_iter` iterations.
    FullIterations,
    /// Stop after the first iteration in which no sample changed its cluster, compared to the
    /// previous iteration. At this point the centroids have reached a fixed point.
    NoReassignment,
	/// This strategy aborts the calculation directly after an iteration produced no improvement where `improvement > threshold`
	/// for the first time.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
    NoImprovement { threshold: T },
}
impl<T: Primitive> Default for AbortStrategy<T> {
    fn default() -> Self { AbortStrategy::NoReassignment }
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::FullIterations => Box::new(FullIterationsLogic),
			AbortStrategy::NoReassignment => Box::new(NoReassignmentLogic),
			AbortStrategy::NoImprovement{threshold} => Box::new(NoImprovementLogic {
				threshold,
				prev_error: T::infinity()
			})
		}
	}
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Function that has to be called once an iteration of the calculation ended.
	/// ## Arguments
	/// - **error**: The new error (distsum), after an iteration
	/// - **reassigned**: Amount of samples that changed their cluster in this iteration
	/// ## Returns
	/// - **true** if the calculation should continue
	/// - **false** if the calculation should abort
	fn next(&mut self, error: T, reassigned: usize) -> bool;
}


pub(crate) struct FullIterationsLogic;
impl<T: Primitive> AbortStrategyLogic<T> for FullIterationsLogic {
	fn next(&mut self, _: T, _: usize) -> bool { true }
}


pub(crate) struct NoReassignmentLogic;
impl<T: Primitive> AbortStrategyLogic<T> for NoReassignmentLogic {
	fn next(&mut self, _: T, reassigned: usize) -> bool { reassigned > 0 }
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_error: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
	fn next(&mut self, error: T, _: usize) -> bool {
		let improvement = self.prev_error - error;
		self.prev_error = error;
		improvement > self.threshold
	}
}
