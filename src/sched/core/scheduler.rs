//! Scheduler
//!
//! Round-robin preemptivo com uma fila de execução por núcleo.
//!
//! # Lock handoff
//!
//! O lock do scheduler fica seguro *durante* a troca de contexto: quem sai
//! esquece o guard (`mem::forget`) e quem entra libera com `force_unlock`.
//! Assim nenhum outro núcleo enxerga uma tarefa marcada como pronta cujo
//! contexto ainda não terminou de ser salvo.
//!
//! Ordem de lock global: estado de wait queue → scheduler.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use super::cpu::{CoreState, CoreStats};
use super::entry::{task_entry, Launch};
use crate::arch::{Context, ContextOps, Cpu, CpuOps, TaskStart, TrapFrame};
use crate::sched::config::SchedConfig;
use crate::sched::task::{Task, TaskArena, TaskFlags, TaskInfo, TaskState, TaskStatus};
use crate::sync::{InterruptDisabler, Spinlock, SpinlockGuard};
use crate::sys::{CoreId, Errno, KResult, Tid};

/// Estado protegido pelo lock do scheduler.
pub(crate) struct SchedState {
    pub(crate) tasks: TaskArena,
    cores: Vec<CoreState>,
    quantum: u64,
}

impl SchedState {
    pub(crate) fn current_on(&self, core: CoreId) -> Option<Tid> {
        self.cores[core.as_usize()].current
    }

    fn is_current_anywhere(&self, tid: Tid) -> bool {
        self.cores.iter().any(|c| c.current == Some(tid))
    }

    /// Consome um pedido de interrupção pendente.
    pub(crate) fn take_interrupt(&mut self, tid: Tid) -> bool {
        let task = self.tasks.expect_mut(tid);
        let pending = task.flags.contains(TaskFlags::INTERRUPT_PENDING);
        task.flags.remove(TaskFlags::INTERRUPT_PENDING);
        pending
    }

    /// Blocked → Runnable, no fim da fila do seu núcleo.
    /// Retorna `false` (sem efeito) se a tarefa não estava bloqueada.
    pub(crate) fn wake(&mut self, tid: Tid) -> bool {
        let Some(task) = self.tasks.get_mut(tid) else {
            return false;
        };
        if task.state != TaskState::Blocked {
            return false;
        }
        task.state = TaskState::Runnable;
        self.enqueue(tid);
        crate::ktrace!("(Sched) Wakeup, tid:", tid.as_u64());
        true
    }

    fn enqueue(&mut self, tid: Tid) {
        let core = self.tasks.expect(tid).core.as_usize();
        self.cores[core].run_queue.push(&mut self.tasks, tid);
        crate::ktrace!("(Sched) Enqueue, tid:", tid.as_u64());
    }

    /// Tira a cabeça da fila do núcleo e a marca como Running.
    fn pick_next(&mut self, core: CoreId) -> Option<Tid> {
        let c = core.as_usize();
        let tid = self.cores[c].run_queue.pop(&mut self.tasks)?;
        // Pedido de preempção era da tarefa anterior
        self.cores[c].need_resched = false;
        let now = self.cores[c].stats.ticks;
        let quantum = self.quantum;

        let task = self.tasks.expect_mut(tid);
        debug_assert_eq!(task.state, TaskState::Runnable);
        task.state = TaskState::Running;
        task.core = core;
        task.accounting.start_exec(now, quantum);
        Some(tid)
    }

    /// Tira a tarefa corrente da CPU lógica, deixando-a em `state`.
    fn deschedule(&mut self, tid: Tid, state: TaskState, voluntary: bool) {
        let task = self.tasks.expect_mut(tid);
        task.state = state;
        task.accounting.account_switch(voluntary);
        if state == TaskState::Runnable {
            self.enqueue(tid);
        }
    }

    fn least_loaded_core(&self) -> CoreId {
        let index = self
            .cores
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.run_queue.len() + c.current.is_some() as usize)
            .map_or(0, |(i, _)| i);
        CoreId(index as u32)
    }
}

pub struct Scheduler {
    state: Spinlock<SchedState>,
    config: SchedConfig,
}

impl Scheduler {
    pub fn new(config: SchedConfig) -> KResult<Self> {
        config.validate()?;

        let cores = (0..config.cores).map(|_| CoreState::new()).collect();
        crate::kinfo!("(Sched) Núcleos configurados:", config.cores);
        crate::kinfo!("(Sched) Quantum (ticks):", config.quantum_ticks);

        Ok(Self {
            state: Spinlock::new(SchedState {
                tasks: TaskArena::new(),
                cores,
                quantum: config.quantum_ticks,
            }),
            config,
        })
    }

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    pub(crate) fn lock_state(&self) -> SpinlockGuard<'_, SchedState> {
        self.state.lock()
    }

    /// Núcleo do chamador.
    ///
    /// # Panics
    /// Se o núcleo não faz parte da configuração.
    pub(crate) fn this_core(&self) -> CoreId {
        let core = Cpu::current_id();
        assert!(
            core.as_usize() < self.config.cores,
            "núcleo {} fora da configuração do scheduler",
            core.0
        );
        core
    }

    fn check_core(&self, core: CoreId) -> KResult<usize> {
        if core.as_usize() < self.config.cores {
            Ok(core.as_usize())
        } else {
            Err(Errno::EINVAL)
        }
    }

    // -------------------------------------------------------------------------
    // Criação
    // -------------------------------------------------------------------------

    /// Cria uma tarefa Runnable que executará `body`, sem enfileirá-la.
    /// O núcleo é o menos carregado no momento.
    pub fn create<F>(&'static self, name: &str, body: F) -> KResult<Tid>
    where
        F: FnOnce() + Send + 'static,
    {
        self.create_task(name, None, Box::new(body))
    }

    /// Cria uma tarefa presa ao núcleo `core`.
    pub fn create_on<F>(&'static self, core: CoreId, name: &str, body: F) -> KResult<Tid>
    where
        F: FnOnce() + Send + 'static,
    {
        self.check_core(core)?;
        self.create_task(name, Some(core), Box::new(body))
    }

    /// `create` + `schedule_task`.
    pub fn spawn<F>(&'static self, name: &str, body: F) -> KResult<Tid>
    where
        F: FnOnce() + Send + 'static,
    {
        let tid = self.create(name, body)?;
        self.schedule_task(tid)?;
        Ok(tid)
    }

    pub fn spawn_on<F>(&'static self, core: CoreId, name: &str, body: F) -> KResult<Tid>
    where
        F: FnOnce() + Send + 'static,
    {
        let tid = self.create_on(core, name, body)?;
        self.schedule_task(tid)?;
        Ok(tid)
    }

    fn create_task(
        &'static self,
        name: &str,
        core: Option<CoreId>,
        body: Box<dyn FnOnce() + Send>,
    ) -> KResult<Tid> {
        let launch = Box::into_raw(Box::new(Launch { sched: self, body }));
        let start = TaskStart {
            func: task_entry,
            arg: launch as usize,
        };

        let context = match Context::prepare(start) {
            Ok(ctx) => ctx,
            Err(e) => {
                // A tarefa nunca vai rodar: devolver o Launch
                drop(unsafe { Box::from_raw(launch) });
                crate::kerror!("(Sched) Falha ao preparar contexto:", e.as_usize());
                return Err(e);
            }
        };

        let status = Arc::new(TaskStatus::new());
        let mut s = self.state.lock();
        let core = core.unwrap_or_else(|| s.least_loaded_core());
        let tid = s
            .tasks
            .insert(|tid| Task::new(tid, name, core, context, status));
        drop(s);

        crate::kdebug!("(Sched) Tarefa criada, tid:", tid.as_u64());
        Ok(tid)
    }

    /// Coloca uma tarefa Runnable no fim da fila do seu núcleo.
    ///
    /// `ESRCH` se o tid não existe, `EINVAL` se a tarefa não está Runnable.
    ///
    /// # Panics
    /// Se a tarefa já estiver em uma fila de execução (enqueue duplo).
    pub fn schedule_task(&self, tid: Tid) -> KResult<()> {
        let mut s = self.state.lock();
        let task = s.tasks.get(tid).ok_or(Errno::ESRCH)?;
        if task.state != TaskState::Runnable {
            return Err(Errno::EINVAL);
        }
        s.enqueue(tid);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Despacho
    // -------------------------------------------------------------------------

    /// Transforma o fluxo de boot do núcleo atual no seu idle loop e passa a
    /// despachar tarefas. Cada núcleo da configuração chama uma vez.
    pub fn start(&self) -> ! {
        unsafe { Cpu::disable_interrupts() };
        let core = self.this_core();
        let c = core.as_usize();

        {
            let mut s = self.state.lock();
            assert!(!s.cores[c].online, "Scheduler::start duas vezes no núcleo {}", c);
            s.cores[c].online = true;
        }
        crate::kinfo!("(Sched) Núcleo online:", c);

        loop {
            let mut s = self.state.lock();
            match s.pick_next(core) {
                Some(next) => {
                    let idle = s.cores[c].idle_ptr();
                    let next_ctx = s.tasks.expect_mut(next).context_ptr();
                    s.cores[c].current = Some(next);
                    s.cores[c].stats.context_switches += 1;

                    mem::forget(s);
                    unsafe {
                        Context::switch(idle, next_ctx, core);
                        self.state.force_unlock();
                    }
                    // De volta ao idle: a fila deste núcleo esvaziou
                }
                None => {
                    s.cores[c].stats.idle_entries += 1;
                    drop(s);
                    Cpu::enable_and_halt();
                    unsafe { Cpu::disable_interrupts() };
                }
            }
        }
    }

    /// Cede a CPU: a tarefa atual vai para o fim da fila. Se for a única
    /// pronta, continua executando.
    pub fn yield_now(&self) {
        let _irq = InterruptDisabler::new();
        let core = self.this_core();
        let mut s = self.state.lock();
        let Some(current) = s.current_on(core) else {
            return;
        };

        s.deschedule(current, TaskState::Runnable, true);
        self.switch_away(s, core, current);
    }

    /// Bloqueia a tarefa corrente (já registrada em alguma wait queue).
    pub(crate) fn block_current(&self, mut s: SpinlockGuard<'_, SchedState>, core: CoreId) {
        let current = match s.current_on(core) {
            Some(t) => t,
            None => panic!("bloqueio sem tarefa corrente no núcleo {}", core.0),
        };
        s.deschedule(current, TaskState::Blocked, true);
        self.switch_away(s, core, current);
    }

    /// Troca `prev` (já fora de Running) pela próxima da fila, ou pelo idle.
    /// Retorna quando `prev` voltar a ser despachada.
    fn switch_away(&self, mut s: SpinlockGuard<'_, SchedState>, core: CoreId, prev: Tid) {
        let c = core.as_usize();
        let next = s.pick_next(core);
        if next == Some(prev) {
            return;
        }

        let prev_ctx = s.tasks.expect_mut(prev).context_ptr();
        let next_ctx = match next {
            Some(tid) => s.tasks.expect_mut(tid).context_ptr(),
            None => s.cores[c].idle_ptr(),
        };
        s.cores[c].current = next;
        s.cores[c].stats.context_switches += 1;

        mem::forget(s);
        unsafe {
            Context::switch(prev_ctx, next_ctx, core);
            self.state.force_unlock();
        }
    }

    /// Despacha a próxima tarefa sem salvar o contexto atual.
    fn run_next(&self, mut s: SpinlockGuard<'_, SchedState>, core: CoreId) -> ! {
        let c = core.as_usize();
        let next = s.pick_next(core);
        let next_ctx = match next {
            Some(tid) => s.tasks.expect_mut(tid).context_ptr(),
            None => s.cores[c].idle_ptr(),
        };
        s.cores[c].current = next;
        s.cores[c].stats.context_switches += 1;

        mem::forget(s);
        unsafe { Context::jump(next_ctx, core) }
    }

    /// Chamado pela tarefa que acabou de entrar pela primeira vez.
    ///
    /// # Safety
    /// Só no trampolim de tarefa nova, logo após a troca de contexto.
    pub(crate) unsafe fn finish_switch(&self) {
        self.state.force_unlock();
        Cpu::enable_interrupts();
    }

    // -------------------------------------------------------------------------
    // Término
    // -------------------------------------------------------------------------

    /// Termina a tarefa atual com `code`. Quem espera no `TaskStatus` é
    /// acordado; a tarefa fica Exited até `reap`.
    pub fn exit_current(&self, code: i32) -> ! {
        unsafe { Cpu::disable_interrupts() };
        let core = self.this_core();

        let status = {
            let mut s = self.state.lock();
            let current = match s.current_on(core) {
                Some(t) => t,
                None => panic!("exit_current fora de uma tarefa"),
            };
            let task = s.tasks.expect_mut(current);
            task.state = TaskState::Exited;
            task.exit_code = Some(code);
            crate::kdebug!("(Sched) Tarefa terminou, tid:", current.as_u64());
            task.status.clone()
        };

        status.set_exited(self, code);
        drop(status);

        let mut s = self.state.lock();
        s.cores[core.as_usize()].current = None;
        self.run_next(s, core)
    }

    /// Libera uma tarefa terminada e retorna seu código de saída.
    ///
    /// `ESRCH` se o tid não existe, `EBUSY` se ainda não terminou (ou, em
    /// SMP, ainda está saindo da CPU).
    pub fn reap(&self, tid: Tid) -> KResult<i32> {
        let mut s = self.state.lock();
        let task = s.tasks.get(tid).ok_or(Errno::ESRCH)?;
        if task.state != TaskState::Exited || s.is_current_anywhere(tid) {
            return Err(Errno::EBUSY);
        }
        let task = s.tasks.remove(tid).ok_or(Errno::ESRCH)?;
        drop(s);

        // Contexto e pilha liberados fora do lock
        Ok(task.exit_code.unwrap_or(0))
    }

    /// Espera a tarefa terminar e retorna o código de saída (sem `reap`).
    pub fn wait_for(&self, tid: Tid) -> KResult<i32> {
        let status = self.status(tid)?;
        status.wait_until_exited(self)?;
        Ok(status.exit_code().unwrap_or(0))
    }

    /// Cancela a próxima espera (ou a atual) da tarefa: `wait` retorna
    /// `EINTR`. Sem efeito em tarefa terminada.
    pub fn interrupt(&self, tid: Tid) -> KResult<()> {
        let mut s = self.state.lock();
        let task = s.tasks.get_mut(tid).ok_or(Errno::ESRCH)?;
        if task.state == TaskState::Exited {
            return Ok(());
        }
        task.flags.insert(TaskFlags::INTERRUPT_PENDING);
        s.wake(tid);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Preempção
    // -------------------------------------------------------------------------

    /// Contabiliza um tick de timer no núcleo atual. Retorna `true` se a
    /// tarefa corrente esgotou o quantum e deve ser preemptada.
    pub fn timer_tick(&self) -> bool {
        let core = self.this_core();
        let c = core.as_usize();
        let mut s = self.state.lock();
        s.cores[c].stats.ticks += 1;

        let Some(current) = s.current_on(core) else {
            return false;
        };
        if s.tasks.expect_mut(current).accounting.tick() {
            s.cores[c].need_resched = true;
        }
        s.cores[c].need_resched
    }

    /// Preempção: guarda `frame` na tarefa interrompida, coloca-a no fim da
    /// fila e despacha a próxima. Retorna quando ela voltar a rodar.
    ///
    /// Chamar apenas de handler de interrupção (interrupções desabilitadas).
    pub fn save_state_and_run_next(&self, frame: TrapFrame) {
        let core = self.this_core();
        let c = core.as_usize();
        let mut s = self.state.lock();
        s.cores[c].need_resched = false;

        let Some(current) = s.current_on(core) else {
            return;
        };
        s.tasks.expect_mut(current).trap_frame = Some(frame);
        s.cores[c].stats.preemptions += 1;
        s.deschedule(current, TaskState::Runnable, false);
        self.switch_away(s, core, current);
    }

    /// Handler do timer: tick + preempção se o quantum acabou.
    pub fn on_timer_interrupt(&self, frame: TrapFrame) {
        if self.timer_tick() {
            self.save_state_and_run_next(frame);
        }
    }

    // -------------------------------------------------------------------------
    // Consultas
    // -------------------------------------------------------------------------

    /// Tarefa executando no núcleo do chamador.
    pub fn current(&self) -> Option<Tid> {
        let core = self.this_core();
        self.state.lock().current_on(core)
    }

    pub fn status(&self, tid: Tid) -> KResult<Arc<TaskStatus>> {
        let s = self.state.lock();
        s.tasks.get(tid).map(|t| t.status.clone()).ok_or(Errno::ESRCH)
    }

    pub fn task_state(&self, tid: Tid) -> KResult<TaskState> {
        let s = self.state.lock();
        s.tasks.get(tid).map(Task::state).ok_or(Errno::ESRCH)
    }

    pub fn task_info(&self, tid: Tid) -> KResult<TaskInfo> {
        let s = self.state.lock();
        s.tasks.get(tid).map(TaskInfo::from).ok_or(Errno::ESRCH)
    }

    pub fn task_count(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Ordem atual da fila de execução de um núcleo.
    pub fn run_queue(&self, core: CoreId) -> KResult<Vec<Tid>> {
        let c = self.check_core(core)?;
        let mut s = self.state.lock();
        let SchedState { tasks, cores, .. } = &mut *s;
        Ok(cores[c].run_queue.snapshot(tasks))
    }

    pub fn core_stats(&self, core: CoreId) -> KResult<CoreStats> {
        let c = self.check_core(core)?;
        Ok(self.state.lock().cores[c].stats)
    }

    pub fn is_online(&self, core: CoreId) -> KResult<bool> {
        let c = self.check_core(core)?;
        Ok(self.state.lock().cores[c].online)
    }
}
