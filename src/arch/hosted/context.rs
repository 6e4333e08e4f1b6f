//! Troca de contexto emulada.
//!
//! "Restaurar" um contexto é abrir o `Gate` da thread dona dele; "salvar" é
//! ficar bloqueado no próprio `Gate` até alguém abri-lo de novo. Em qualquer
//! instante exatamente uma thread por núcleo está fora do seu gate.
//!
//! Uma tarefa encerrada (`jump`) desenrola a pilha da sua thread com o
//! payload `Retired` até a closure criada em `prepare`, e a thread termina.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use std::sync::{Condvar, Mutex, PoisonError};

use super::cpu::{self, Cpu};
use crate::arch::traits::{ContextOps, CpuOps, TaskStart};
use crate::sys::{CoreId, Errno, KResult};

/// Estado capturado por uma interrupção simulada.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub ip: usize,
    pub sp: usize,
    pub vector: u8,
}

struct Gate {
    core: Mutex<Option<CoreId>>,
    cv: Condvar,
}

impl Gate {
    fn new() -> Self {
        Self {
            core: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    fn open(&self, core: CoreId) {
        let mut slot = self.core.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(slot.is_none(), "contexto restaurado duas vezes");
        *slot = Some(core);
        self.cv.notify_one();
    }

    fn pass(&self) -> CoreId {
        let mut slot = self.core.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(core) = slot.take() {
                return core;
            }
            slot = self.cv.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Payload do desenrolar que aposenta a thread de uma tarefa encerrada.
struct Retired;

/// `true` se `payload` é o desenrolar de uma tarefa encerrada, que quem
/// captura pânicos no caminho deve propagar.
pub fn is_retirement(payload: &(dyn Any + Send)) -> bool {
    payload.is::<Retired>()
}

pub struct Context {
    gate: Arc<Gate>,
}

impl ContextOps for Context {
    fn empty() -> Self {
        Self {
            gate: Arc::new(Gate::new()),
        }
    }

    fn prepare(start: TaskStart) -> KResult<Self> {
        let gate = Arc::new(Gate::new());
        let own = gate.clone();

        std::thread::Builder::new()
            .name("ember-task".into())
            .spawn(move || {
                let core = own.pass();
                drop(own);
                cpu::bind_core(core);
                // Tarefa nova começa com interrupções desabilitadas
                unsafe { Cpu::disable_interrupts() };
                let run = std::panic::catch_unwind(move || (start.func)(start.arg));
                if let Err(payload) = run {
                    if !is_retirement(&*payload) {
                        std::panic::resume_unwind(payload);
                    }
                }
            })
            .map_err(|_| Errno::ENOMEM)?;

        Ok(Self { gate })
    }

    unsafe fn switch(prev: *mut Self, next: *const Self, core: CoreId) {
        let own = (*prev).gate.clone();
        (*next).gate.open(core);
        let resumed_on = own.pass();
        cpu::bind_core(resumed_on);
    }

    unsafe fn jump(next: *const Self, core: CoreId) -> ! {
        (*next).gate.open(core);
        retire()
    }
}

/// A thread de uma tarefa encerrada nunca mais é retomada: sai da pilha.
#[cfg(panic = "unwind")]
fn retire() -> ! {
    std::panic::resume_unwind(Box::new(Retired))
}

#[cfg(not(panic = "unwind"))]
fn retire() -> ! {
    loop {
        std::thread::park();
    }
}
