//! Proptest strategies for command lines and registrations.

use proptest::prelude::*;

pub use proptest;

/// Valid root label
pub fn arb_label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Permission node such as `lectern.admin.set`
pub fn arb_permission() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(|segments| segments.join("."))
}

/// Whitespace-separated tokens of printable ASCII, including quotes and
/// slashes
pub fn arb_command_line() -> impl Strategy<Value = String> {
    prop::collection::vec("[!-~]{1,8}", 0..6).prop_map(|tokens| tokens.join(" "))
}

/// Arbitrary text, including unicode and stray whitespace
pub fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_command_line(),
        any::<String>(),
        (arb_command_line(), "[ \t]{0,3}").prop_map(|(line, pad)| format!("{pad}/{line}{pad}")),
    ]
}

/// Integer token, in or out of the `i32` range
pub fn arb_integer_token() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|n| n.to_string()),
        any::<i64>().prop_map(|n| n.to_string()),
        "[0-9a-z+-]{1,6}",
    ]
}
