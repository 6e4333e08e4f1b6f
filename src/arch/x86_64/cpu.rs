//! Implementação x86_64 das operações de CPU (HAL).
//!
//! Usa Assembly inline para controle de interrupções e identificação do núcleo.
//!
//! # Segurança
//! Assume long mode (64-bit) e nível de privilégio de kernel (Ring 0).

use core::arch::asm;

use crate::arch::traits::CpuOps;
use crate::sys::CoreId;

pub struct Cpu;

impl CpuOps for Cpu {
    /// Retorna o ID do núcleo atual (Initial APIC ID, CPUID folha 1).
    fn current_id() -> CoreId {
        // O LLVM reserva RBX, então preservamos manualmente.
        let ebx: u32;
        unsafe {
            asm!(
                "push rbx",
                "cpuid",
                "mov {0:e}, ebx",
                "pop rbx",
                out(reg) ebx,
                inout("eax") 1u32 => _,
                out("ecx") _,
                out("edx") _,
                options(nomem, preserves_flags),
            );
        }
        CoreId(ebx >> 24)
    }

    #[inline]
    fn halt() {
        unsafe {
            asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }

    /// STI só libera interrupções após a instrução seguinte, então nenhuma
    /// IRQ pode chegar entre o STI e o HLT.
    #[inline]
    fn enable_and_halt() {
        unsafe {
            asm!("sti", "hlt", options(nomem, nostack));
        }
    }

    #[inline]
    fn relax() {
        unsafe {
            asm!("pause", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    unsafe fn disable_interrupts() {
        asm!("cli", options(nomem, nostack));
    }

    #[inline]
    unsafe fn enable_interrupts() {
        asm!("sti", options(nomem, nostack));
    }

    /// Lê RFLAGS.IF (bit 9).
    #[inline]
    fn are_interrupts_enabled() -> bool {
        let rflags: u64;
        unsafe {
            asm!("pushfq; pop {}", out(reg) rflags, options(nomem, preserves_flags));
        }
        (rflags & (1 << 9)) != 0
    }
}
