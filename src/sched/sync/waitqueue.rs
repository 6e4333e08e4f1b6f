//! Wait Queue
//!
//! Tarefas dormem até um predicado sobre o estado `T` da fila ficar
//! verdadeiro. O estado mora *dentro* do lock da fila: quem muda o estado
//! (`notify_*`) e quem testa o predicado (`wait`) serializam no mesmo lock,
//! então um wakeup entre o teste e o bloqueio não se perde.
//!
//! Ordem de lock: fila → scheduler.

use crate::arch::{Cpu, CpuOps};
use crate::klib::list::IndexList;
use crate::sched::core::Scheduler;
use crate::sched::task::arena::WaitLinks;
use crate::sync::{InterruptDisabler, Spinlock};
use crate::sys::{Errno, KResult, Tid};

struct Inner<T> {
    state: T,
    waiters: IndexList<Tid>,
}

pub struct WaitQueue<T> {
    inner: Spinlock<Inner<T>>,
}

impl<T> WaitQueue<T> {
    pub const fn new(state: T) -> Self {
        Self {
            inner: Spinlock::new(Inner {
                state,
                waiters: IndexList::new(),
            }),
        }
    }

    /// Lê o estado sem esperar.
    pub fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock().state)
    }

    /// Tarefas registradas como esperando.
    pub fn waiter_count(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Bloqueia a tarefa atual até `predicate(&state)` ser verdadeiro.
    ///
    /// Retorna `Ok(())` com o predicado satisfeito ou `Err(EINTR)` se a
    /// tarefa foi interrompida (`Scheduler::interrupt`) antes disso. Se o
    /// predicado já vale na entrada, retorna sem bloquear.
    ///
    /// O predicado roda com os locks da fila e do scheduler seguros: deve
    /// apenas inspecionar o estado.
    ///
    /// # Panics
    /// - Interrupções desabilitadas na entrada (spinlock seguro, handler).
    /// - Precisaria bloquear mas não há tarefa corrente no núcleo.
    pub fn wait<F>(&self, sched: &Scheduler, mut predicate: F) -> KResult<()>
    where
        F: FnMut(&T) -> bool,
    {
        assert!(
            Cpu::are_interrupts_enabled(),
            "WaitQueue::wait com interrupções desabilitadas"
        );
        let _irq = InterruptDisabler::new();

        loop {
            let mut inner = self.inner.lock();
            let mut s = sched.lock_state();
            let core = sched.this_core();
            let current = s.current_on(core);

            // Acordada por interrupt() ou sem notify: ainda registrada aqui
            if let Some(tid) = current {
                inner.waiters.remove(&mut WaitLinks(&mut s.tasks), tid);
            }

            if predicate(&inner.state) {
                return Ok(());
            }

            let tid = match current {
                Some(tid) => tid,
                None => panic!("WaitQueue::wait sem tarefa corrente no núcleo {}", core.0),
            };

            if s.take_interrupt(tid) {
                crate::ktrace!("(WaitQ) Espera interrompida, tid:", tid.as_u64());
                return Err(Errno::INTERRUPTED);
            }

            inner.waiters.push_back(&mut WaitLinks(&mut s.tasks), tid);
            // A partir daqui quem notifica já enxerga a tarefa na fila; ela só
            // pode ser acordada depois que o lock do scheduler for liberado,
            // ou seja, depois de sair da CPU.
            drop(inner);
            sched.block_current(s, core);
        }
    }

    /// Aplica `mutate` ao estado e acorda todas as tarefas em espera.
    /// Retorna quantas passaram de Blocked para Runnable.
    ///
    /// Pode ser chamada de handler de interrupção.
    pub fn notify_all<F>(&self, sched: &Scheduler, mutate: F) -> usize
    where
        F: FnOnce(&mut T),
    {
        let mut inner = self.inner.lock();
        mutate(&mut inner.state);

        let mut s = sched.lock_state();
        let mut woken = 0;
        while let Some(tid) = inner.waiters.pop_front(&mut WaitLinks(&mut s.tasks)) {
            if s.wake(tid) {
                woken += 1;
            }
        }

        if woken > 0 {
            crate::ktrace!("(WaitQ) notify_all acordou:", woken);
        }
        woken
    }

    /// Como `notify_all`, mas acorda no máximo a primeira tarefa em espera.
    pub fn notify_one<F>(&self, sched: &Scheduler, mutate: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut inner = self.inner.lock();
        mutate(&mut inner.state);

        let mut s = sched.lock_state();
        while let Some(tid) = inner.waiters.pop_front(&mut WaitLinks(&mut s.tasks)) {
            if s.wake(tid) {
                return true;
            }
        }
        false
    }
}

impl<T: Default> Default for WaitQueue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
