//! Arena de tarefas.
//!
//! Slots reutilizáveis com contador de geração: um `Tid` antigo nunca
//! encontra a tarefa que passou a ocupar o mesmo slot.

use alloc::vec::Vec;

use super::entity::Task;
use crate::klib::list::{Link, LinkStore};
use crate::sys::Tid;

struct Slot {
    generation: u32,
    task: Option<Task>,
}

#[derive(Default)]
pub struct TaskArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl TaskArena {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Insere uma tarefa construída a partir do `Tid` reservado.
    pub fn insert(&mut self, build: impl FnOnce(Tid) -> Task) -> Tid {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    task: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        let tid = Tid::new(index, slot.generation);
        slot.task = Some(build(tid));
        self.live += 1;
        tid
    }

    pub fn get(&self, tid: Tid) -> Option<&Task> {
        self.slots
            .get(tid.index())
            .filter(|s| s.generation == tid.generation())
            .and_then(|s| s.task.as_ref())
    }

    pub fn get_mut(&mut self, tid: Tid) -> Option<&mut Task> {
        self.slots
            .get_mut(tid.index())
            .filter(|s| s.generation == tid.generation())
            .and_then(|s| s.task.as_mut())
    }

    /// Remove a tarefa e invalida o `Tid`.
    pub fn remove(&mut self, tid: Tid) -> Option<Task> {
        let slot = self.slots.get_mut(tid.index())?;
        if slot.generation != tid.generation() {
            return None;
        }
        let task = slot.task.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(tid.index() as u32);
        self.live -= 1;
        Some(task)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Tarefa que a fila garante existir.
    ///
    /// # Panics
    /// Se `tid` for inválido: uma fila apontando para tarefa removida é
    /// corrupção de estado.
    pub(crate) fn expect_mut(&mut self, tid: Tid) -> &mut Task {
        match self.get_mut(tid) {
            Some(t) => t,
            None => panic!("TaskArena: tid {} em fila mas inexistente", tid),
        }
    }

    pub(crate) fn expect(&self, tid: Tid) -> &Task {
        match self.get(tid) {
            Some(t) => t,
            None => panic!("TaskArena: tid {} em fila mas inexistente", tid),
        }
    }
}

/// Adaptador: elos da fila de execução.
pub struct RunLinks<'a>(pub &'a mut TaskArena);

/// Adaptador: elos de wait queue.
pub struct WaitLinks<'a>(pub &'a mut TaskArena);

impl LinkStore<Tid> for RunLinks<'_> {
    fn link(&self, key: Tid) -> &Link<Tid> {
        &self.0.expect(key).rq_link
    }
    fn link_mut(&mut self, key: Tid) -> &mut Link<Tid> {
        &mut self.0.expect_mut(key).rq_link
    }
}

impl LinkStore<Tid> for WaitLinks<'_> {
    fn link(&self, key: Tid) -> &Link<Tid> {
        &self.0.expect(key).wait_link
    }
    fn link_mut(&mut self, key: Tid) -> &mut Link<Tid> {
        &mut self.0.expect_mut(key).wait_link
    }
}
