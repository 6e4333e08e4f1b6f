//! CPU emulada: estado por thread do host.

use alloc::boxed::Box;
use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use crate::arch::traits::CpuOps;
use crate::sys::CoreId;

/// Tempo máximo de um `halt` emulado. Não há timer real para acordar o
/// núcleo, então o idle loop volta a olhar a fila periodicamente.
const HALT_SLICE: Duration = Duration::from_micros(200);

type PendingIrq = Box<dyn FnOnce()>;

std::thread_local! {
    static CORE: Cell<u32> = const { Cell::new(0) };
    static IRQ_ENABLED: Cell<bool> = const { Cell::new(true) };
    static PENDING: RefCell<VecDeque<PendingIrq>> = RefCell::new(VecDeque::new());
}

pub struct Cpu;

impl CpuOps for Cpu {
    #[inline]
    fn current_id() -> CoreId {
        CoreId(CORE.with(Cell::get))
    }

    fn halt() {
        std::thread::park_timeout(HALT_SLICE);
    }

    fn enable_and_halt() {
        unsafe { Self::enable_interrupts() };
        Self::halt();
    }

    #[inline]
    fn relax() {
        core::hint::spin_loop();
        std::thread::yield_now();
    }

    #[inline]
    unsafe fn disable_interrupts() {
        IRQ_ENABLED.with(|f| f.set(false));
    }

    unsafe fn enable_interrupts() {
        IRQ_ENABLED.with(|f| f.set(true));
        // Entregar o que ficou pendente enquanto estava mascarado
        while let Some(handler) = PENDING.with(|p| p.borrow_mut().pop_front()) {
            deliver(handler);
        }
    }

    #[inline]
    fn are_interrupts_enabled() -> bool {
        IRQ_ENABLED.with(Cell::get)
    }
}

/// Simula a chegada de uma interrupção no núcleo da thread atual.
///
/// Com interrupções habilitadas o handler roda imediatamente (com a flag
/// desligada, como um interrupt gate faria); caso contrário fica pendente.
pub fn raise_irq<F>(handler: F)
where
    F: FnOnce() + 'static,
{
    if Cpu::are_interrupts_enabled() {
        deliver(Box::new(handler));
    } else {
        PENDING.with(|p| p.borrow_mut().push_back(Box::new(handler)));
    }
}

/// Quantas IRQs simuladas aguardam interrupções serem habilitadas.
pub fn pending_irqs() -> usize {
    PENDING.with(|p| p.borrow().len())
}

fn deliver(handler: PendingIrq) {
    IRQ_ENABLED.with(|f| f.set(false));
    handler();
    IRQ_ENABLED.with(|f| f.set(true));
}

/// Marca a thread atual como executando no núcleo `core`.
///
/// Quem simula SMP chama isto na thread que fará `Scheduler::start` de cada
/// núcleo secundário.
pub fn bind_core(core: CoreId) {
    CORE.with(|c| c.set(core.0));
}
