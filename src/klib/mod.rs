//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do Kernel.

pub mod list;
pub mod test_framework;

/// Alinha um endereço para baixo.
#[inline]
pub const fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}
