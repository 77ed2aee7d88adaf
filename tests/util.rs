/// Check whether two floats differ by at most `$tolerance` relative to the expected value.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($expected:expr, $actual:expr, $tolerance:expr, $msg:expr) => {{
        let expected: f64 = $expected;
        let actual: f64 = $actual;
        let relative_diff = ((actual - expected) / expected).abs();
        assert!(
            relative_diff <= $tolerance,
            "{}: expected {} but got {} (relative difference {})",
            $msg,
            expected,
            actual,
            relative_diff
        );
    }};
}
