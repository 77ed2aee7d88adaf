use ordered_float::OrderedFloat;

/// The type used for the simulation clock.
///
/// Builtin floats do not implement [`Ord`], so they cannot key the binary heap behind an [`EventTimeline`]. Wrapping
/// the clock in [`OrderedFloat`] provides a total order over every `f64`; the engine only ever produces finite,
/// nonnegative timestamps, so the treatment of NaN never comes into play.
///
/// [`EventTimeline`]: crate::timeline::EventTimeline
pub type SimTime = OrderedFloat<f64>;

/// Wrap a raw timestamp as a [`SimTime`].
pub(crate) fn sim_time(time: f64) -> SimTime {
    OrderedFloat(time)
}
