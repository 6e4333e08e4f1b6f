//! Status de término de uma tarefa.
//!
//! Compartilhado (`Arc`) entre a tarefa e quem quer esperar por ela.
//! Transição única: "rodando" → "terminou" com um código de saída.

use crate::sched::sync::WaitQueue;
use crate::sched::core::Scheduler;
use crate::sys::KResult;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ExitState {
    exited: bool,
    code: i32,
}

pub struct TaskStatus {
    queue: WaitQueue<ExitState>,
}

impl TaskStatus {
    pub const fn new() -> Self {
        Self {
            queue: WaitQueue::new(ExitState {
                exited: false,
                code: 0,
            }),
        }
    }

    /// Marca como terminada e acorda todos os que esperam.
    /// Chamadas repetidas não mudam o código já registrado.
    pub fn set_exited(&self, sched: &Scheduler, code: i32) -> usize {
        self.queue.notify_all(sched, |st| {
            if !st.exited {
                st.exited = true;
                st.code = code;
            }
        })
    }

    /// Bloqueia até a tarefa terminar. Retorna na hora se já terminou.
    pub fn wait_until_exited(&self, sched: &Scheduler) -> KResult<()> {
        self.queue.wait(sched, |st| st.exited)
    }

    pub fn has_exited(&self) -> bool {
        self.queue.with_state(|st| st.exited)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.queue.with_state(|st| st.exited.then_some(st.code))
    }

    pub fn waiter_count(&self) -> usize {
        self.queue.waiter_count()
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::new()
    }
}
