//! Agregado do kernel: scheduler + registro de IRQs + linha do timer.
//!
//! O código de boot constrói um `Kernel`, o torna `'static` e o instala
//! para que os stubs de interrupção (que não recebem contexto) o encontrem.

use core::sync::atomic::{AtomicU32, Ordering};

use spin::Once;

use super::boot::CommandLine;
use super::irq::{GlobalIrq, IrqRegistry};
use crate::arch::TrapFrame;
use crate::sched::{SchedConfig, Scheduler};
use crate::sys::{CoreId, Errno, KResult};

const NO_TIMER: u32 = u32::MAX;

pub struct Kernel {
    scheduler: Scheduler,
    irq: IrqRegistry,
    timer: AtomicU32,
}

impl Kernel {
    pub fn new(config: SchedConfig) -> KResult<Self> {
        Ok(Self {
            scheduler: Scheduler::new(config)?,
            irq: IrqRegistry::new(),
            timer: AtomicU32::new(NO_TIMER),
        })
    }

    /// Configuração a partir da linha de comando de boot.
    pub fn from_cmdline(cmdline: &str) -> KResult<Self> {
        let cmdline = CommandLine::parse(cmdline)?;
        Self::new(SchedConfig::from_cmdline(&cmdline)?)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn irq(&self) -> &IrqRegistry {
        &self.irq
    }

    /// Define a linha do timer de preempção, roteia para `dest` e habilita.
    pub fn set_timer_irq(&self, gsi: GlobalIrq, dest: CoreId) -> KResult<()> {
        self.irq.route(gsi, dest)?;
        self.irq.enable(gsi)?;
        self.timer.store(gsi.0, Ordering::Release);
        crate::kinfo!("(Kernel) Timer de preempção na GSI:", gsi.0);
        Ok(())
    }

    pub fn timer_irq(&self) -> Option<GlobalIrq> {
        match self.timer.load(Ordering::Acquire) {
            NO_TIMER => None,
            gsi => Some(GlobalIrq(gsi)),
        }
    }

    /// Entrada comum de interrupções externas.
    ///
    /// O EOI do timer é enviado *antes* da preempção: a tarefa que entra
    /// pode ficar muito tempo sem voltar aqui.
    pub fn handle_irq(&self, gsi: GlobalIrq, frame: TrapFrame) -> KResult<()> {
        if self.timer_irq() == Some(gsi) {
            self.irq.end_of_interrupt(gsi)?;
            self.scheduler.on_timer_interrupt(frame);
            return Ok(());
        }

        if !self.irq.dispatch(gsi) {
            crate::kwarn!("(Kernel) IRQ sem handler, GSI:", gsi.0);
        }
        self.irq.end_of_interrupt(gsi)
    }

    pub fn handle_vector(&self, vector: u8, frame: TrapFrame) -> KResult<()> {
        let gsi = self.irq.global_of_vector(vector)?;
        self.handle_irq(gsi, frame)
    }
}

static KERNEL: Once<&'static Kernel> = Once::new();

/// Publica o kernel para os stubs de interrupção. Só uma vez: `EEXIST`
/// numa segunda chamada.
pub fn install(kernel: &'static Kernel) -> KResult<()> {
    let mut fresh = false;
    KERNEL.call_once(|| {
        fresh = true;
        kernel
    });
    if fresh {
        Ok(())
    } else {
        Err(Errno::EEXIST)
    }
}

pub fn installed() -> Option<&'static Kernel> {
    KERNEL.get().copied()
}
