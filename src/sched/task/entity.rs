//! Task Control Block
//!
//! Tudo que o scheduler sabe sobre uma tarefa. Vive dentro da `TaskArena` e
//! é sempre acessado com o lock do scheduler seguro.

use alloc::boxed::Box;
use alloc::sync::Arc;

use bitflags::bitflags;

use super::accounting::Accounting;
use super::state::TaskState;
use super::status::TaskStatus;
use crate::arch::{Context, TrapFrame};
use crate::klib::list::Link;
use crate::sched::config::TASK_NAME_LEN;
use crate::sys::{CoreId, Tid};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TaskFlags: u32 {
        /// `interrupt()` pediu o cancelamento da próxima espera
        const INTERRUPT_PENDING = 1 << 0;
    }
}

pub struct Task {
    pub(crate) tid: Tid,
    name: [u8; TASK_NAME_LEN],
    name_len: usize,

    pub(crate) state: TaskState,
    pub(crate) flags: TaskFlags,

    /// Núcleo cuja fila de execução recebe a tarefa
    pub(crate) core: CoreId,

    /// Endereço estável: o Assembly de troca guarda ponteiros para cá
    pub(crate) context: Box<Context>,

    /// Elo na fila de execução do núcleo
    pub(crate) rq_link: Link<Tid>,
    /// Elo na wait queue onde está bloqueada
    pub(crate) wait_link: Link<Tid>,

    pub(crate) status: Arc<TaskStatus>,
    pub(crate) accounting: Accounting,
    pub(crate) exit_code: Option<i32>,

    /// Estado capturado na última preempção
    pub(crate) trap_frame: Option<TrapFrame>,
}

impl Task {
    pub(crate) fn new(tid: Tid, name: &str, core: CoreId, context: Context, status: Arc<TaskStatus>) -> Self {
        let mut buf = [0u8; TASK_NAME_LEN];
        // Cortar em fronteira de caractere
        let mut len = name.len().min(TASK_NAME_LEN);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);

        Self {
            tid,
            name: buf,
            name_len: len,
            state: TaskState::Runnable,
            flags: TaskFlags::empty(),
            core,
            context: Box::new(context),
            rq_link: Link::new(),
            wait_link: Link::new(),
            status,
            accounting: Accounting::new(),
            exit_code: None,
            trap_frame: None,
        }
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    pub fn name(&self) -> &str {
        core::str::from_utf8(&self.name[..self.name_len]).unwrap_or("?")
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn context_ptr(&mut self) -> *mut Context {
        &mut *self.context
    }
}

/// Cópia do estado visível de uma tarefa.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub tid: Tid,
    pub name: alloc::string::String,
    pub state: TaskState,
    pub core: CoreId,
    pub accounting: Accounting,
    pub exit_code: Option<i32>,
    pub interrupt_pending: bool,
    pub last_trap: Option<TrapFrame>,
}

impl From<&Task> for TaskInfo {
    fn from(t: &Task) -> Self {
        Self {
            tid: t.tid,
            name: t.name().into(),
            state: t.state,
            core: t.core,
            accounting: t.accounting,
            exit_code: t.exit_code,
            interrupt_pending: t.flags.contains(TaskFlags::INTERRUPT_PENDING),
            last_trap: t.trap_frame,
        }
    }
}
