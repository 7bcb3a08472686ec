//! Output buffer and scoped state guard for symbol demangler printers.
//!
//! A demangler parses a mangled name into a tree and then prints that tree.
//! The printing half writes into an [`OutputBuffer`]: an owned, growable block
//! of bytes with append, prepend, positional insert and rewind, plus the bits
//! of printer state (pack expansion counters, `>` escaping depth) that have
//! to travel along with the text. [`ScopedRestore`] changes such state for the
//! extent of a nested print and puts it back on every way out of the scope.
//!
//! Growing the buffer never fails from the caller's point of view; if the
//! allocator gives up the process aborts. Only the initial allocation made by
//! [`initialize_output_buffer`] reports failure as an [`InitError`].
//!
//! ```rust
//! use demangle_outbuf::{OutputBuffer, ScopedRestore};
//!
//! let mut ob = OutputBuffer::new();
//! ob.push_str("vector");
//! {
//!     let mut ob = ScopedRestore::replace(&mut ob, |ob| &mut ob.gt_is_gt, 0);
//!     ob.push_byte(b'<');
//!     if ob.is_gt_inside_template_args() {
//!         ob.print_open().print("1>2").print_close();
//!     }
//!     ob.push_byte(b'>');
//! }
//! assert_eq!(ob.as_bytes(), b"vector<(1>2)>");
//! assert_eq!(ob.gt_is_gt, 1);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod trace;

mod error;
mod init;
mod options;
mod output_buffer;
mod printable;
mod restore;


pub use error::InitError;
pub use init::initialize_output_buffer;
pub use options::BufferOptions;
pub use output_buffer::{GROWTH_SLACK, OutputBuffer, PACK_UNSET};
pub use printable::Printable;
pub use restore::ScopedRestore;
