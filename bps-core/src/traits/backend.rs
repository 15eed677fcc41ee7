//! Byte source trait for patch and source inputs
//!
//! The engine never opens files itself. Anything that can hand out its
//! whole content as one slice can feed the parser and the interpreter.

/// A fully readable, memory-resident byte source
///
/// Implementations may be in-memory buffers, memory-mapped files or files
/// read up front. No partial or streaming reads are required.
pub trait ByteSource {
    /// The whole content
    fn as_bytes(&self) -> &[u8];

    /// Total length in bytes
    fn size(&self) -> usize {
        self.as_bytes().len()
    }
}

impl ByteSource for [u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn as_bytes(&self) -> &[u8] {
        (**self).as_bytes()
    }
}

#[cfg(feature = "alloc")]
impl ByteSource for alloc::vec::Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

#[cfg(feature = "alloc")]
impl ByteSource for alloc::boxed::Box<[u8]> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}
