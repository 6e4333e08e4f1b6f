//! Ponto de entrada de tarefas novas.
//!
//! O contexto inicial de toda tarefa aponta para `task_entry` com um
//! `Launch` em caixa como argumento. A primeira coisa a fazer é liberar o
//! lock do scheduler herdado de quem fez a troca.

use alloc::boxed::Box;

use super::scheduler::Scheduler;

pub(crate) struct Launch {
    pub(crate) sched: &'static Scheduler,
    pub(crate) body: Box<dyn FnOnce() + Send>,
}

pub(crate) extern "C-unwind" fn task_entry(arg: usize) -> ! {
    let launch = unsafe { Box::from_raw(arg as *mut Launch) };
    let Launch { sched, body } = *launch;

    unsafe { sched.finish_switch() };

    let code = run_body(body);
    sched.exit_current(code)
}

#[cfg(target_os = "none")]
fn run_body(body: Box<dyn FnOnce() + Send>) -> i32 {
    body();
    0
}

/// Em hosted um pânico na tarefa vira término com código -1. Um
/// `exit_current` de dentro do corpo desenrola até aqui e segue adiante.
#[cfg(not(target_os = "none"))]
fn run_body(body: Box<dyn FnOnce() + Send>) -> i32 {
    use crate::arch::platform::context::is_retirement;

    match std::panic::catch_unwind(core::panic::AssertUnwindSafe(body)) {
        Ok(()) => 0,
        Err(payload) if is_retirement(&*payload) => std::panic::resume_unwind(payload),
        Err(_) => {
            crate::kerror!("(Sched) Pânico dentro de tarefa");
            -1
        }
    }
}
