//! Direct fuzz target for the counter via the __internal module.
//!
//! # Safety Properties Tested
//! - `clean` never panics, even on `i64::MIN` and `i64::MAX`
//! - cleaned values stay in range and cleaning is idempotent
//! - advancing near the limit resets instead of overflowing

#![no_main]

use arbitrary::Arbitrary;
use jugger_stones::__internal::Counter;
use jugger_stones::telemetry::InvariantChecker;
use jugger_stones::{ModeDescriptor, Stones};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct CounterInput {
    /// Mode selector, negative for infinity
    size: i64,
    reverse: bool,
    raw: i64,
    steps: u8,
}

fuzz_target!(|input: CounterInput| {
    let mode = if input.size < 0 {
        ModeDescriptor::unbounded()
    } else {
        ModeDescriptor::bounded(input.size, input.reverse)
    };
    let range = mode.range();

    let cleaned = range.clean(Stones::new(input.raw));
    assert!(range.contains(cleaned));
    assert_eq!(range.clean(cleaned), cleaned);

    let mut counter = Counter::new(range);
    counter.set(Stones::new(input.raw));
    for _ in 0..input.steps {
        counter.advance(mode.direction());
        counter.settle_boundary();
        counter.canonicalize();
        assert!(counter.check_invariants().is_ok());
    }
});
