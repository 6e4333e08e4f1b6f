//! Controlador de interrupções simulado.
//!
//! Guarda o estado de cada linha (habilitada, EOIs recebidos, vetor roteado)
//! para que os testes possam observar o que o registro de IRQs fez.

use alloc::vec::Vec;
use std::sync::Mutex;

use crate::core::irq::{IrqController, TriggerMode};
use crate::sys::CoreId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    pub enabled: bool,
    pub eoi_count: u32,
    pub vector: Option<u8>,
    pub dest: Option<CoreId>,
    pub trigger: Option<TriggerMode>,
}

pub struct SimulatedController {
    name: &'static str,
    lines: Mutex<Vec<LineState>>,
}

impl SimulatedController {
    pub fn new(name: &'static str, line_count: u32) -> Self {
        Self {
            name,
            lines: Mutex::new(alloc::vec![LineState::default(); line_count as usize]),
        }
    }

    pub fn line(&self, line: u32) -> LineState {
        self.with_line(line, |l| *l)
    }

    fn with_line<R>(&self, line: u32, f: impl FnOnce(&mut LineState) -> R) -> R {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut lines[line as usize])
    }
}

impl IrqController for SimulatedController {
    fn name(&self) -> &'static str {
        self.name
    }

    fn line_count(&self) -> u32 {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len() as u32
    }

    fn route(&self, line: u32, vector: u8, dest: CoreId, trigger: TriggerMode) {
        self.with_line(line, |l| {
            l.vector = Some(vector);
            l.dest = Some(dest);
            l.trigger = Some(trigger);
        });
    }

    fn enable(&self, line: u32) {
        self.with_line(line, |l| l.enabled = true);
    }

    fn disable(&self, line: u32) {
        self.with_line(line, |l| l.enabled = false);
    }

    fn end_of_interrupt(&self, line: u32) {
        self.with_line(line, |l| l.eoi_count += 1);
    }
}
