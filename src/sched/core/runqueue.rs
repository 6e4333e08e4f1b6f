//! Fila de execução (Run Queue) de um núcleo.
//!
//! FIFO estrita: tarefas são despachadas na ordem em que foram enfileiradas.
//! Os elos moram nas próprias tarefas (`Task::rq_link`), então enfileirar e
//! desenfileirar nunca alocam.

use alloc::vec::Vec;

use crate::klib::list::IndexList;
use crate::sched::task::arena::{RunLinks, TaskArena};
use crate::sys::Tid;

#[derive(Debug, Default)]
pub struct RunQueue {
    list: IndexList<Tid>,
}

impl RunQueue {
    pub const fn new() -> Self {
        Self {
            list: IndexList::new(),
        }
    }

    /// Enfileira no fim.
    ///
    /// # Panics
    /// Se a tarefa já estiver em uma fila de execução.
    pub fn push(&mut self, tasks: &mut TaskArena, tid: Tid) {
        self.list.push_back(&mut RunLinks(tasks), tid);
    }

    /// Próxima tarefa (cabeça da fila).
    pub fn pop(&mut self, tasks: &mut TaskArena) -> Option<Tid> {
        self.list.pop_front(&mut RunLinks(tasks))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Ordem atual da fila (cópia).
    pub fn snapshot(&self, tasks: &mut TaskArena) -> Vec<Tid> {
        self.list.iter(&RunLinks(tasks)).collect()
    }
}
