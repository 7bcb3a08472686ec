//! Values that can be written into an [`OutputBuffer`] with
//! [`OutputBuffer::print`].

use bstr::BStr;

use crate::output_buffer::OutputBuffer;

/// Something with a textual form that can be appended to an [`OutputBuffer`].
///
/// Implemented for text (`&str`, `&[u8]`, `&BStr`, `char`) and for the
/// integer types printers need. Signed integers print through
/// [`OutputBuffer::push_i64`], unsigned ones through
/// [`OutputBuffer::push_u64`]. `u8` is left out on purpose since it is
/// ambiguous between a byte and a number; use [`OutputBuffer::push_byte`] or
/// widen it first.
///
/// Tree nodes can implement it too:
///
/// ```rust
/// use demangle_outbuf::{OutputBuffer, Printable};
///
/// struct Ident(&'static str);
///
/// impl Printable for &Ident {
///     fn print_to(self, out: &mut OutputBuffer) {
///         out.push_str(self.0);
///     }
/// }
///
/// let mut ob = OutputBuffer::new();
/// ob.print(&Ident("foo")).print("::").print(&Ident("bar"));
/// assert_eq!(ob.as_bytes(), b"foo::bar");
/// ```
pub trait Printable {
    /// Append `self` to `out`.
    fn print_to(self, out: &mut OutputBuffer);
}

impl Printable for &str {
    fn print_to(self, out: &mut OutputBuffer) {
        out.push_str(self);
    }
}

impl Printable for &[u8] {
    fn print_to(self, out: &mut OutputBuffer) {
        out.push_bytes(self);
    }
}

impl<const N: usize> Printable for &[u8; N] {
    fn print_to(self, out: &mut OutputBuffer) {
        out.push_bytes(self);
    }
}

impl Printable for &BStr {
    fn print_to(self, out: &mut OutputBuffer) {
        out.push_bytes(self);
    }
}

impl Printable for char {
    fn print_to(self, out: &mut OutputBuffer) {
        out.push_char(self);
    }
}

macro_rules! impl_printable_int {
    ($via:ident: $($ty:ty),*) => {
        $(
            impl Printable for $ty {
                #[allow(
                    clippy::cast_lossless,
                    clippy::cast_possible_truncation,
                    clippy::cast_possible_wrap,
                    clippy::unnecessary_cast
                )]
                fn print_to(self, out: &mut OutputBuffer) {
                    out.$via(self as _);
                }
            }
        )*
    };
}

impl_printable_int!(push_i64: i8, i16, i32, i64, isize);
impl_printable_int!(push_u64: u16, u32, u64, usize);
