//! Estado de escalonamento por núcleo.

use alloc::boxed::Box;

use super::runqueue::RunQueue;
use crate::arch::{Context, ContextOps};
use crate::sys::Tid;

/// Estatísticas de um núcleo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreStats {
    /// Ticks de timer recebidos
    pub ticks: u64,
    /// Trocas de contexto realizadas (inclui entrar/sair do idle)
    pub context_switches: u64,
    /// Preempções por quantum expirado
    pub preemptions: u64,
    /// Vezes que o idle loop parou a CPU por falta de trabalho
    pub idle_entries: u64,
}

pub(crate) struct CoreState {
    pub(crate) run_queue: RunQueue,
    /// Tarefa executando neste núcleo (`None`: idle loop)
    pub(crate) current: Option<Tid>,
    /// Contexto do idle loop (a pilha de boot do núcleo)
    pub(crate) idle: Box<Context>,
    pub(crate) online: bool,
    pub(crate) need_resched: bool,
    pub(crate) stats: CoreStats,
}

impl CoreState {
    pub(crate) fn new() -> Self {
        Self {
            run_queue: RunQueue::new(),
            current: None,
            idle: Box::new(Context::empty()),
            online: false,
            need_resched: false,
            stats: CoreStats::default(),
        }
    }

    pub(crate) fn idle_ptr(&mut self) -> *mut Context {
        &mut *self.idle
    }
}
