use alloc::{boxed::Box, vec::Vec};

use crate::{error::InitError, output_buffer::OutputBuffer};

/// Sets up an [`OutputBuffer`] for a print.
///
/// When `block` is `Some`, the buffer writes into it and its length is the
/// starting capacity. Otherwise a zeroed block of `init_size` bytes is
/// allocated. Either way the buffer starts at position zero.
///
/// Unlike growth, which aborts, a failed allocation here is reported to the
/// caller.
///
/// # Errors
///
/// Returns [`InitError::Allocation`] if `block` is `None` and `init_size`
/// bytes cannot be allocated.
///
/// ```rust
/// use demangle_outbuf::initialize_output_buffer;
///
/// let ob = initialize_output_buffer(None, 64).unwrap();
/// assert_eq!((ob.len(), ob.capacity()), (0, 64));
///
/// let ob = initialize_output_buffer(Some(vec![b'x'; 8].into_boxed_slice()), 64).unwrap();
/// assert_eq!((ob.len(), ob.capacity()), (0, 8));
/// ```
pub fn initialize_output_buffer(
    block: Option<Box<[u8]>>,
    init_size: usize,
) -> Result<OutputBuffer, InitError> {
    match block {
        Some(block) => Ok(OutputBuffer::from_block(block)),
        None => allocate(init_size).map(OutputBuffer::from_vec),
    }
}

fn allocate(size: usize) -> Result<Vec<u8>, InitError> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|source| InitError::Allocation { size, source })?;
    data.resize(size, 0);
    trace_event!(size, "allocated output buffer");
    Ok(data)
}
