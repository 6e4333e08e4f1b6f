//! Desabilitação de interrupções com escopo.
//!
//! `InterruptDisabler` salva o estado da flag de interrupção do núcleo atual,
//! desabilita interrupções e restaura o estado *salvo* no drop. Escopos
//! aninhados funcionam: só o mais externo volta a habilitar.

use core::marker::PhantomData;

use crate::arch::{Cpu, CpuOps};

/// Guard que mantém interrupções desabilitadas no núcleo atual.
///
/// Não é `Send`: o estado salvo pertence ao núcleo onde foi criado.
pub struct InterruptDisabler {
    were_enabled: bool,
    _not_send: PhantomData<*const ()>,
}

impl InterruptDisabler {
    #[inline]
    pub fn new() -> Self {
        let were_enabled = Cpu::are_interrupts_enabled();
        unsafe { Cpu::disable_interrupts() };
        Self {
            were_enabled,
            _not_send: PhantomData,
        }
    }

    /// Estado da flag quando o guard foi criado.
    #[inline]
    pub fn were_enabled(&self) -> bool {
        self.were_enabled
    }
}

impl Default for InterruptDisabler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InterruptDisabler {
    #[inline]
    fn drop(&mut self) {
        if self.were_enabled {
            unsafe { Cpu::enable_interrupts() };
        }
    }
}

/// Executa `f` com interrupções desabilitadas, restaurando o estado anterior
/// na saída (inclusive por unwinding).
#[inline]
pub fn with_interrupts_disabled<R>(f: impl FnOnce() -> R) -> R {
    let _guard = InterruptDisabler::new();
    f()
}
