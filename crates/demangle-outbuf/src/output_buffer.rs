//! The growable byte buffer that printers render into.
//!
//! [`OutputBuffer`] owns one contiguous block and a write position. Nodes of a
//! demangled tree write fragments into it in traversal order; occasionally a
//! printer rewinds the position to backtrack, or has to put text in front of
//! what it already wrote (a late-discovered return type or qualifier), which
//! is what [`OutputBuffer::prepend`] and [`OutputBuffer::insert`] are for.
//!
//! # Growth
//!
//! Capacity is tracked explicitly and grows by a fixed policy: when `n` more
//! bytes do not fit, the new capacity is the larger of twice the old capacity
//! and `len + n + GROWTH_SLACK`. Allocation failure during growth is not
//! reported: the process aborts through [`handle_alloc_error`]. Printers run
//! inside crash handlers where unwinding is not an option, so this is the only
//! way growth can fail.
//!
//! Every byte of the owned block is initialized, so rewinding and re-advancing
//! the position never exposes uninitialized memory.

use alloc::{alloc::handle_alloc_error, boxed::Box, vec::Vec};
use core::{alloc::Layout, fmt};

use bstr::BStr;

use crate::{
    error::InitError, init::initialize_output_buffer, options::BufferOptions, printable::Printable,
};

/// Extra bytes requested on top of the immediate need whenever the buffer
/// grows. The first allocation therefore stays just under 1 KiB.
pub const GROWTH_SLACK: usize = 1024 - 32;

/// Value of [`OutputBuffer::pack_index`] and [`OutputBuffer::pack_max`] while
/// no pack expansion is being printed.
pub const PACK_UNSET: u32 = u32::MAX;

/// 20 digits for `u64::MAX` plus a sign.
const INT_SCRATCH_LEN: usize = 21;

/// Stream that tree nodes write their textual representation into.
///
/// Besides the bytes, the buffer carries a little printer state that travels
/// with the output: the pack expansion counters and the `>` escaping depth.
/// These are plain public fields; pair them with
/// [`ScopedRestore`](crate::ScopedRestore) to change them for the duration of
/// a nested print.
///
/// ```rust
/// use demangle_outbuf::OutputBuffer;
///
/// let mut ob = OutputBuffer::new();
/// ob.print("foo");
/// ob.prepend("bar");
/// ob.print(-42_i64);
/// ob.insert(3, "X");
/// assert_eq!(ob.as_bytes(), b"barXfoo-42");
/// ```
pub struct OutputBuffer {
    // `data.len()` is the capacity; `[0, position)` is the written content.
    data: Vec<u8>,
    position: usize,

    /// If a pack expansion is being printed, the offset into the pack of the
    /// element currently printed. [`PACK_UNSET`] otherwise.
    pub pack_index: u32,
    /// If a pack expansion is being printed, the number of elements in the
    /// pack. [`PACK_UNSET`] otherwise.
    pub pack_max: u32,
    /// When zero, template arguments are being printed and a literal `>` has
    /// to be parenthesized. A counter, so that opening a parenthesis simply
    /// increments it.
    pub gt_is_gt: u32,
}

impl OutputBuffer {
    /// Creates an empty buffer without allocating. The first write allocates.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Allocates a buffer of `options.initial_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::Allocation`] if the initial block cannot be
    /// allocated.
    pub fn with_options(options: &BufferOptions) -> Result<Self, InitError> {
        initialize_output_buffer(None, options.initial_size)
    }

    /// Wraps a caller-supplied block. Its length becomes the capacity and the
    /// write position starts at zero.
    #[must_use]
    pub fn from_block(block: Box<[u8]>) -> Self {
        Self::from_vec(block.into_vec())
    }

    pub(crate) const fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            pack_index: PACK_UNSET,
            pack_max: PACK_UNSET,
            gt_is_gt: 1,
        }
    }

    /// Replaces the backing block and rewinds to position zero, returning the
    /// previous block. The printer state fields are left untouched.
    pub fn reset(&mut self, block: Box<[u8]>) -> Box<[u8]> {
        self.position = 0;
        core::mem::replace(&mut self.data, block.into_vec()).into_boxed_slice()
    }

    /// Gives the block back to the caller together with the number of bytes
    /// written. The block's length is the (possibly grown) capacity, so it can
    /// be handed to [`OutputBuffer::from_block`] again.
    #[must_use]
    pub fn into_parts(self) -> (Box<[u8]>, usize) {
        (self.data.into_boxed_slice(), self.position)
    }

    /// Ensure there are at least `n` more positions in the buffer.
    fn grow(&mut self, n: usize) {
        let capacity = self.data.len();
        let Some(need) = self.position.checked_add(n) else {
            grow_failed(usize::MAX);
        };
        if need <= capacity {
            return;
        }

        let new_capacity = need
            .saturating_add(GROWTH_SLACK)
            .max(capacity.saturating_mul(2));
        if self.data.try_reserve_exact(new_capacity - capacity).is_err() {
            grow_failed(new_capacity);
        }
        self.data.resize(new_capacity, 0);
        trace_event!(
            old_capacity = capacity,
            new_capacity,
            position = self.position,
            "grew output buffer"
        );
    }

    /// Appends `bytes` at the current position.
    pub fn push_bytes(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        let bytes = bytes.as_ref();
        let size = bytes.len();
        if size != 0 {
            self.grow(size);
            self.data[self.position..self.position + size].copy_from_slice(bytes);
            self.position += size;
        }
        self
    }

    /// Appends a string.
    pub fn push_str(&mut self, s: &str) -> &mut Self {
        self.push_bytes(s)
    }

    /// Appends a single byte.
    pub fn push_byte(&mut self, byte: u8) -> &mut Self {
        self.grow(1);
        self.data[self.position] = byte;
        self.position += 1;
        self
    }

    /// Appends the UTF-8 encoding of `ch`.
    pub fn push_char(&mut self, ch: char) -> &mut Self {
        let mut utf8 = [0; 4];
        self.push_bytes(ch.encode_utf8(&mut utf8))
    }

    /// Appends the decimal representation of `n`.
    pub fn push_u64(&mut self, n: u64) -> &mut Self {
        self.write_unsigned(n, false)
    }

    /// Appends the decimal representation of `n`, with a leading `-` when
    /// negative. `i64::MIN` is printed correctly.
    pub fn push_i64(&mut self, n: i64) -> &mut Self {
        self.write_unsigned(n.unsigned_abs(), n < 0)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "a single decimal digit always fits in a byte"
    )]
    fn write_unsigned(&mut self, mut n: u64, negative: bool) -> &mut Self {
        let mut scratch = [0u8; INT_SCRATCH_LEN];
        let mut start = INT_SCRATCH_LEN;

        // Output at least one character.
        loop {
            start -= 1;
            scratch[start] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }

        if negative {
            start -= 1;
            scratch[start] = b'-';
        }

        self.push_bytes(&scratch[start..])
    }

    /// Appends anything [`Printable`], returning `self` for chaining.
    ///
    /// ```rust
    /// use demangle_outbuf::OutputBuffer;
    ///
    /// let mut ob = OutputBuffer::new();
    /// ob.print("int[").print(16_u32).print(']');
    /// assert_eq!(ob.as_bytes(), b"int[16]");
    /// ```
    pub fn print<P: Printable>(&mut self, value: P) -> &mut Self {
        value.print_to(self);
        self
    }

    /// Puts `bytes` in front of everything written so far.
    ///
    /// Shifts the whole content, so the cost is proportional to
    /// [`OutputBuffer::len`].
    pub fn prepend(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        let bytes = bytes.as_ref();
        let size = bytes.len();
        if size != 0 {
            self.grow(size);
            self.data.copy_within(..self.position, size);
            self.data[..size].copy_from_slice(bytes);
            self.position += size;
        }
        self
    }

    /// Inserts `bytes` at `pos`, shifting `[pos, len)` to the right.
    ///
    /// `pos` must not exceed [`OutputBuffer::len`]. This is checked in debug
    /// builds; release builds clamp it to the current length.
    pub fn insert(&mut self, pos: usize, bytes: impl AsRef<[u8]>) -> &mut Self {
        debug_assert!(
            pos <= self.position,
            "insert position {pos} is past the end ({})",
            self.position
        );
        let pos = pos.min(self.position);
        let bytes = bytes.as_ref();
        let size = bytes.len();
        if size == 0 {
            return self;
        }

        self.grow(size);
        self.data.copy_within(pos..self.position, pos + size);
        self.data[pos..pos + size].copy_from_slice(bytes);
        self.position += size;
        self
    }

    /// Current write position, equal to the number of bytes written.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the write position, typically back to a value previously
    /// returned by [`OutputBuffer::position`]. Bytes past the new position
    /// are dropped from the output until overwritten.
    ///
    /// Moving forward does not clear anything. Positions past the capacity
    /// are rejected in debug builds and clamped in release builds.
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(
            pos <= self.data.len(),
            "position {pos} is past the capacity ({})",
            self.data.len()
        );
        self.position = pos.min(self.data.len());
    }

    /// Appends `open` and increments [`OutputBuffer::gt_is_gt`].
    pub fn open_bracket(&mut self, open: u8) -> &mut Self {
        self.gt_is_gt = self.gt_is_gt.wrapping_add(1);
        self.push_byte(open)
    }

    /// Decrements [`OutputBuffer::gt_is_gt`] and appends `close`.
    pub fn close_bracket(&mut self, close: u8) -> &mut Self {
        self.gt_is_gt = self.gt_is_gt.wrapping_sub(1);
        self.push_byte(close)
    }

    /// [`OutputBuffer::open_bracket`] with `(`.
    pub fn print_open(&mut self) -> &mut Self {
        self.open_bracket(b'(')
    }

    /// [`OutputBuffer::close_bracket`] with `)`.
    pub fn print_close(&mut self) -> &mut Self {
        self.close_bracket(b')')
    }

    /// Whether a `>` written now would be read as the end of a template
    /// argument list.
    #[must_use]
    pub fn is_gt_inside_template_args(&self) -> bool {
        self.gt_is_gt == 0
    }

    /// The last byte written, or `b'\0'` when empty.
    #[must_use]
    pub fn back(&self) -> u8 {
        self.last_byte().unwrap_or(b'\0')
    }

    /// The last byte written, if any.
    #[must_use]
    pub fn last_byte(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.position
    }

    /// Size of the owned block.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The written content.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.position]
    }

    /// The written content as a byte string.
    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        BStr::new(self.as_bytes())
    }
}

#[cold]
#[inline(never)]
fn grow_failed(size: usize) -> ! {
    warn_event!(size, "cannot grow output buffer, aborting");
    let layout = Layout::from_size_align(size, 1).unwrap_or(Layout::new::<u8>());
    handle_alloc_error(layout)
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("content", &self.as_bstr())
            .field("capacity", &self.capacity())
            .field("pack_index", &self.pack_index)
            .field("pack_max", &self.pack_max)
            .field("gt_is_gt", &self.gt_is_gt)
            .finish()
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push_char(c);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString, vec, vec::Vec};
    use core::fmt::Write as _;

    use rstest::rstest;

    use super::{GROWTH_SLACK, OutputBuffer, PACK_UNSET};

    #[test]
    fn new_buffer_is_empty_and_unallocated() {
        let ob = OutputBuffer::new();
        assert!(ob.is_empty());
        assert_eq!(ob.len(), 0);
        assert_eq!(ob.capacity(), 0);
        assert_eq!(ob.back(), b'\0');
        assert_eq!(ob.last_byte(), None);
        assert_eq!(ob.pack_index, PACK_UNSET);
        assert_eq!(ob.pack_max, PACK_UNSET);
        assert_eq!(ob.gt_is_gt, 1);
        assert!(!ob.is_gt_inside_template_args());
    }

    #[test]
    fn first_growth_uses_slack() {
        let mut ob = OutputBuffer::new();
        ob.push_byte(b'a');
        assert_eq!(ob.capacity(), 1 + GROWTH_SLACK);
    }

    #[test]
    fn growth_doubles_when_doubling_is_larger() {
        let mut ob = OutputBuffer::from_block(vec![0; 4000].into_boxed_slice());
        ob.push_bytes([b'x'; 4000]);
        assert_eq!(ob.capacity(), 4000);

        ob.push_byte(b'y');
        assert_eq!(ob.capacity(), 8000);
        assert_eq!(ob.len(), 4001);
    }

    #[test]
    fn growth_uses_need_when_it_exceeds_double() {
        let mut ob = OutputBuffer::from_block(vec![0; 10].into_boxed_slice());
        ob.push_str("0123456789");
        ob.push_bytes([b'z'; 100]);
        assert_eq!(ob.capacity(), 110 + GROWTH_SLACK);
    }

    #[test]
    fn growth_is_not_triggered_while_content_fits() {
        let mut ob = OutputBuffer::from_block(vec![0; 8].into_boxed_slice());
        ob.push_str("abcdefgh");
        assert_eq!(ob.capacity(), 8);
        assert_eq!(ob.as_bytes(), b"abcdefgh");
    }

    #[test]
    fn growth_preserves_written_bytes() {
        let mut ob = OutputBuffer::from_block(vec![0; 3].into_boxed_slice());
        ob.push_str("abc");
        ob.push_str("def");
        assert_eq!(ob.as_bytes(), b"abcdef");
        assert!(ob.len() <= ob.capacity());
    }

    #[test]
    fn prepend_shifts_existing_content() {
        let mut ob = OutputBuffer::new();
        ob.push_str("foo").prepend("bar");
        assert_eq!(ob.as_bytes(), b"barfoo");
        ob.prepend("");
        assert_eq!(ob.as_bytes(), b"barfoo");
    }

    #[test]
    fn prepend_into_empty_buffer() {
        let mut ob = OutputBuffer::new();
        ob.prepend("x");
        assert_eq!(ob.as_bytes(), b"x");
    }

    #[rstest]
    #[case(0, b"XYabc")]
    #[case(1, b"aXYbc")]
    #[case(3, b"abcXY")]
    fn insert_places_bytes_at_position(#[case] pos: usize, #[case] expected: &[u8]) {
        let mut ob = OutputBuffer::new();
        ob.push_str("abc").insert(pos, "XY");
        assert_eq!(ob.as_bytes(), expected);
    }

    #[test]
    fn empty_insert_is_a_no_op() {
        let mut ob = OutputBuffer::new();
        ob.insert(0, "");
        assert_eq!(ob.capacity(), 0);
        ob.push_str("ab").insert(1, b"");
        assert_eq!(ob.as_bytes(), b"ab");
    }

    #[test]
    fn insert_across_growth_boundary() {
        let mut ob = OutputBuffer::from_block(vec![0; 4].into_boxed_slice());
        ob.push_str("abcd").insert(2, "----");
        assert_eq!(ob.as_bytes(), b"ab----cd");
    }

    #[rstest]
    #[case(0, "0")]
    #[case(7, "7")]
    #[case(-1, "-1")]
    #[case(-42, "-42")]
    #[case(1_000_000, "1000000")]
    #[case(i64::MAX, "9223372036854775807")]
    #[case(i64::MIN, "-9223372036854775808")]
    fn signed_integers(#[case] n: i64, #[case] expected: &str) {
        let mut ob = OutputBuffer::new();
        ob.push_i64(n);
        assert_eq!(ob.as_bytes(), expected.as_bytes());
    }

    #[rstest]
    #[case(0, "0")]
    #[case(10, "10")]
    #[case(u64::MAX, "18446744073709551615")]
    fn unsigned_integers(#[case] n: u64, #[case] expected: &str) {
        let mut ob = OutputBuffer::new();
        ob.push_u64(n);
        assert_eq!(ob.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn rewind_discards_tail() {
        let mut ob = OutputBuffer::new();
        ob.push_str("int");
        let mark = ob.position();
        ob.push_str(" const&");
        ob.set_position(mark);
        assert_eq!(ob.as_bytes(), b"int");
        ob.push_str("*");
        assert_eq!(ob.as_bytes(), b"int*");
    }

    #[test]
    fn bracket_depth_tracks_nesting() {
        let mut ob = OutputBuffer::new();
        ob.open_bracket(b'<');
        assert_eq!(ob.gt_is_gt, 2);
        ob.close_bracket(b'>');
        assert_eq!(ob.gt_is_gt, 1);
        assert!(!ob.is_gt_inside_template_args());

        ob.gt_is_gt = 0;
        assert!(ob.is_gt_inside_template_args());
        ob.print_open();
        assert!(!ob.is_gt_inside_template_args());
        ob.push_byte(b'>');
        ob.print_close();
        assert!(ob.is_gt_inside_template_args());
        assert_eq!(ob.as_bytes(), b"<>(>)");
    }

    #[test]
    fn close_without_open_enters_template_args() {
        let mut ob = OutputBuffer::new();
        ob.close_bracket(b'>');
        assert!(ob.is_gt_inside_template_args());
        ob.open_bracket(b'<');
        assert!(!ob.is_gt_inside_template_args());
    }

    #[test]
    fn back_returns_last_byte() {
        let mut ob = OutputBuffer::new();
        ob.push_str("ab");
        assert_eq!(ob.back(), b'b');
        ob.set_position(0);
        assert_eq!(ob.back(), b'\0');
    }

    #[test]
    fn fmt_write_appends() {
        let mut ob = OutputBuffer::new();
        write!(ob, "{}::{}", "ns", 3).unwrap();
        ob.write_char('é').unwrap();
        assert_eq!(ob.as_bstr(), "ns::3é");
    }

    #[test]
    fn print_chains_printables() {
        let mut ob = OutputBuffer::new();
        ob.print("f(").print(-3_i32).print(", ").print(4_usize).print(')');
        assert_eq!(ob.as_bytes(), b"f(-3, 4)");
    }

    #[test]
    fn into_parts_returns_grown_block() {
        let mut ob = OutputBuffer::from_block(vec![0; 2].into_boxed_slice());
        ob.push_str("hello");
        let (block, len) = ob.into_parts();
        assert_eq!(len, 5);
        assert_eq!(block.len(), 5 + GROWTH_SLACK);
        assert_eq!(&block[..len], b"hello");

        let reused = OutputBuffer::from_block(block);
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), 5 + GROWTH_SLACK);
    }

    #[test]
    fn reset_keeps_printer_state() {
        let mut ob = OutputBuffer::new();
        ob.push_str("old");
        ob.pack_index = 2;
        ob.gt_is_gt = 0;

        let previous = ob.reset(vec![0; 16].into_boxed_slice());
        assert_eq!(&previous[..3], b"old");
        assert!(ob.is_empty());
        assert_eq!(ob.capacity(), 16);
        assert_eq!(ob.pack_index, 2);
        assert_eq!(ob.gt_is_gt, 0);
    }

    #[test]
    fn debug_renders_content_as_bytes_string() {
        let mut ob = OutputBuffer::new();
        ob.push_str("a\"b");
        let rendered = format!("{ob:?}");
        assert!(rendered.starts_with("OutputBuffer { content: \"a\\\"b\""));
        assert!(rendered.contains("gt_is_gt: 1"));
    }

    #[test]
    fn as_bstr_displays_content() {
        let mut ob = OutputBuffer::new();
        ob.push_bytes(b"std::vector<int>");
        let content: Vec<u8> = ob.as_bstr().to_string().into_bytes();
        assert_eq!(content, b"std::vector<int>");
    }
}
