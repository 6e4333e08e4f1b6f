//! Troca de contexto x86_64.
//!
//! Só os registradores callee-saved (System V) precisam ser salvos: a troca
//! acontece dentro de uma chamada de função, então o compilador já salvou o
//! resto. Tarefas novas começam no trampolim com `r12 = func` e `r13 = arg`.

use alloc::boxed::Box;
use alloc::vec;
use core::arch::global_asm;

use crate::arch::traits::{ContextOps, TaskStart};
use crate::klib::align_down;
use crate::sched::config::KERNEL_STACK_SIZE;
use crate::sys::{CoreId, KResult};

/// Frame empilhado pelos stubs de IRQ (`interrupts.rs`) + frame do hardware.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,

    /// Empilhado pelo stub do vetor.
    pub vector: u64,

    // Empilhado pelo hardware
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

/// Registradores salvos por `ember_context_switch`. O layout é usado pelo
/// Assembly abaixo: não reordenar.
#[repr(C)]
#[derive(Debug, Default)]
struct SavedRegs {
    rbx: u64, // 0x00
    rbp: u64, // 0x08
    r12: u64, // 0x10
    r13: u64, // 0x18
    r14: u64, // 0x20
    r15: u64, // 0x28
    rsp: u64, // 0x30
    rip: u64, // 0x38
}

pub struct Context {
    regs: SavedRegs,
    /// Pilha de kernel da tarefa (`None` no contexto de boot/idle). Só
    /// precisa viver enquanto o contexto existir.
    _stack: Option<Box<[u8]>>,
}

// A pilha só é tocada pela tarefa dona do contexto.
unsafe impl Send for Context {}

extern "C" {
    fn ember_context_switch(prev: *mut SavedRegs, next: *const SavedRegs);
    fn ember_context_jump(next: *const SavedRegs) -> !;
    fn ember_task_trampoline();
}

global_asm!(
    ".global ember_context_switch",
    "ember_context_switch:",
    // rdi = prev, rsi = next
    "mov [rdi + 0x00], rbx",
    "mov [rdi + 0x08], rbp",
    "mov [rdi + 0x10], r12",
    "mov [rdi + 0x18], r13",
    "mov [rdi + 0x20], r14",
    "mov [rdi + 0x28], r15",
    // RSP como ficará após o `ret` e RIP = endereço de retorno
    "lea rax, [rsp + 8]",
    "mov [rdi + 0x30], rax",
    "mov rax, [rsp]",
    "mov [rdi + 0x38], rax",
    "mov rdi, rsi",
    ".global ember_context_jump",
    "ember_context_jump:",
    // rdi = next
    "mov rbx, [rdi + 0x00]",
    "mov rbp, [rdi + 0x08]",
    "mov r12, [rdi + 0x10]",
    "mov r13, [rdi + 0x18]",
    "mov r14, [rdi + 0x20]",
    "mov r15, [rdi + 0x28]",
    "mov rsp, [rdi + 0x30]",
    "jmp qword ptr [rdi + 0x38]",
    "",
    ".global ember_task_trampoline",
    "ember_task_trampoline:",
    "xor rbp, rbp",
    "mov rdi, r13",
    "call r12",
    "ud2",
);

impl ContextOps for Context {
    fn empty() -> Self {
        Self {
            regs: SavedRegs::default(),
            _stack: None,
        }
    }

    fn prepare(start: TaskStart) -> KResult<Self> {
        let stack = vec![0u8; KERNEL_STACK_SIZE].into_boxed_slice();

        // Topo alinhado em 16: o `call r12` do trampolim deixa RSP % 16 == 8
        // na entrada da função, como a ABI espera.
        let top = align_down(stack.as_ptr() as usize + stack.len(), 16) as u64;

        let regs = SavedRegs {
            r12: start.func as usize as u64,
            r13: start.arg as u64,
            rsp: top,
            rip: ember_task_trampoline as usize as u64,
            ..SavedRegs::default()
        };

        Ok(Self {
            regs,
            _stack: Some(stack),
        })
    }

    unsafe fn switch(prev: *mut Self, next: *const Self, _core: CoreId) {
        ember_context_switch(
            core::ptr::addr_of_mut!((*prev).regs),
            core::ptr::addr_of!((*next).regs),
        );
    }

    unsafe fn jump(next: *const Self, _core: CoreId) -> ! {
        ember_context_jump(core::ptr::addr_of!((*next).regs))
    }
}
