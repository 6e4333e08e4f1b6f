//! Local APIC: End of Interrupt.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use volatile::VolatilePtr;

/// Endereço físico padrão do LAPIC (identity map assumido).
pub const LAPIC_DEFAULT_BASE: usize = 0xFEE0_0000;

const REG_EOI: usize = 0x0B0;

static LAPIC_BASE: AtomicUsize = AtomicUsize::new(LAPIC_DEFAULT_BASE);

/// Define o endereço virtual onde o LAPIC foi mapeado.
///
/// # Safety
/// `base` precisa apontar para o MMIO do LAPIC em todos os núcleos.
pub unsafe fn set_base(base: usize) {
    LAPIC_BASE.store(base, Ordering::Release);
}

/// Sinaliza End of Interrupt para o LAPIC do núcleo atual.
///
/// # Safety
/// Só dentro de um handler de interrupção externa.
#[inline]
pub unsafe fn eoi() {
    let addr = LAPIC_BASE.load(Ordering::Acquire) + REG_EOI;
    if let Some(ptr) = NonNull::new(addr as *mut u32) {
        VolatilePtr::new(ptr).write(0);
    }
}
