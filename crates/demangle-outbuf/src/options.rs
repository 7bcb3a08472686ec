/// Configuration for buffers allocated by this crate.
///
/// # Examples
///
/// ```rust
/// use demangle_outbuf::{BufferOptions, OutputBuffer};
///
/// let ob = OutputBuffer::with_options(&BufferOptions {
///     initial_size: 256,
/// })
/// .unwrap();
/// assert_eq!(ob.capacity(), 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferOptions {
    /// Size in bytes of the block allocated up front.
    ///
    /// # Default
    ///
    /// `1024`, the size the first growth of an empty buffer lands close to.
    pub initial_size: usize,
}

impl BufferOptions {
    /// Default for [`BufferOptions::initial_size`].
    pub const DEFAULT_INITIAL_SIZE: usize = 1024;
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            initial_size: Self::DEFAULT_INITIAL_SIZE,
        }
    }
}
