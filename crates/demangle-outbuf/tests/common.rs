#![allow(missing_docs, dead_code)]

use demangle_outbuf::OutputBuffer;

/// Fragments in the order a printer emits them for
/// `std::map<int, std::basic_string<char> >::find(int const&) const`.
pub const FRAGMENTS: &[&str] = &[
    "std::map<",
    "int",
    ", ",
    "std::basic_string<",
    "char",
    "> ",
    ">::find(",
    "int const&",
    ") const",
];

pub fn text(ob: &OutputBuffer) -> String {
    String::from_utf8_lossy(ob.as_bytes()).into_owned()
}
