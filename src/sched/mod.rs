//! # Multitasking & Scheduler Subsystem
//!
//! Transforma cada núcleo em uma abstração capaz de executar várias tarefas
//! de kernel "simultaneamente".
//!
//! ## Arquitetura: Cooperative + Preemptive
//! 1. **Preemptivo:** o timer chama `Scheduler::on_timer_interrupt`; quando
//!    o quantum da tarefa acaba ela vai para o fim da fila.
//! 2. **Cooperativo:** `yield_now()` e `WaitQueue::wait()` cedem a CPU.
//!
//! ## Estrutura
//! - `config`: quantum, frequência do timer, número de núcleos.
//! - `task`: TCB, estados, contabilidade, `TaskStatus`, arena com `Tid`.
//! - `core`: `Scheduler`, fila FIFO por núcleo, idle loop, trampolim.
//! - `sync`: `WaitQueue<T>`.
//!
//! Tarefas não migram entre núcleos: cada uma fica na fila do núcleo em que
//! foi criada.

pub mod config;
pub mod core;
pub mod sync;
pub mod task;

pub use self::config::SchedConfig;
pub use self::core::{CoreStats, Scheduler};
pub use self::sync::WaitQueue;
pub use self::task::{TaskInfo, TaskState, TaskStatus};

#[cfg(test)]
mod test;
