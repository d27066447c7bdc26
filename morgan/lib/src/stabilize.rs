//! The termination policy of the refinement loop.
//!
//! Morgan-style refinement doesn't always settle on a partition where the number of classes stops
//! changing: it can plateau for a few iterations and then split again, or even oscillate.  So
//! instead of stopping the first time the number of classes doesn't change, we wait for a few
//! consecutive iterations without improvement, and bound the total number of iterations.

/// Number of refinement iterations allowed per node of the graph
pub const ITERATIONS_PER_NODE: usize = 4;

/// Which class is inspected when deciding whether refinement has stabilised.  If that class has
/// more than one member, the refinement is given more iterations to split it before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StabilityCheck {
    /// Inspect the class with the numerically largest [`Code`](crate::Code).  This is the
    /// long-standing behaviour, and is kept so that rankings stay compatible.  Note that codes
    /// don't order classes in any meaningful way.
    #[default]
    LargestCode,
    /// Inspect the class with the most members (i.e. check whether _any_ class is shared)
    MostPopulousClass,
}

/// The state carried between iterations of the refinement loop
#[derive(Debug, Clone)]
pub(crate) struct Stabilizer {
    /// How many consecutive iterations have not changed the number of classes
    stab: u8,
    tries_left: usize,
    /// Number of classes after the last iteration (or the initial encoding)
    class_count: usize,
    /// Set once the single extra attempt has been granted
    extended: bool,
}

/// What the refinement loop should do after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Continue,
    /// The partition has stabilised
    Stop,
    /// The iteration budget ran out on a step which lost classes, so one more iteration is
    /// granted
    ExtraAttempt,
    /// The iteration budget ran out before the partition stabilised
    Exhausted,
}

impl Stabilizer {
    pub fn new(max_iterations: usize, initial_class_count: usize) -> Self {
        Self {
            stab: 0,
            tries_left: max_iterations,
            class_count: initial_class_count,
            extended: false,
        }
    }

    /// Update the state with the result of one iteration.  `top_class_is_shared` is `true` if
    /// the class picked out by the [`StabilityCheck`] has more than one member.
    pub fn observe(&mut self, class_count: usize, top_class_is_shared: bool) -> Verdict {
        let old_class_count = std::mem::replace(&mut self.class_count, class_count);

        if class_count == old_class_count {
            let stable = if top_class_is_shared {
                self.stab == 3
            } else {
                self.stab >= 2
            };
            if stable {
                return Verdict::Stop;
            }
            self.stab += 1;
        } else {
            self.stab = 0;
        }

        self.tries_left = self.tries_left.saturating_sub(1);
        if self.tries_left > 0 {
            return Verdict::Continue;
        }
        if class_count < old_class_count && !self.extended {
            self.extended = true;
            self.tries_left = 1;
            Verdict::ExtraAttempt
        } else {
            Verdict::Exhausted
        }
    }
}
