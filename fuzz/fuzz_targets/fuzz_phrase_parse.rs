#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scrollcheck::fuzz_api::parse_after_marker;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    rest: &'a str,
    keyword: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if let Some(phrase) = parse_after_marker(input.rest, input.keyword) {
        assert!((1..=12).contains(&phrase.month));
        assert!((1..=31).contains(&phrase.day));
    }
});
