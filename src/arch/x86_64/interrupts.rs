//! Stubs de IRQ externas (vetores 32..48).
//!
//! Cada stub empilha o número do vetor e salta para o caminho comum, que
//! salva os registradores de propósito geral no layout de `TrapFrame` e chama
//! `ember_irq_entry`. O handler pode trocar de tarefa (preempção): o frame
//! fica na pilha de kernel da tarefa interrompida até ela ser retomada.

use core::arch::global_asm;

use super::context::TrapFrame;
use crate::core::irq::IRQ_VECTOR_BASE;

/// Quantidade de stubs gerados a partir de `IRQ_VECTOR_BASE`.
pub const IRQ_STUB_COUNT: usize = 16;

global_asm!(
    ".global ember_irq_common",
    "ember_irq_common:",
    "push rax",
    "push rbx",
    "push rcx",
    "push rdx",
    "push rbp",
    "push rdi",
    "push rsi",
    "push r8",
    "push r9",
    "push r10",
    "push r11",
    "push r12",
    "push r13",
    "push r14",
    "push r15",
    "mov rdi, rsp",
    "cld",
    // Alinhar a pilha para a chamada (RBP já está salvo no frame)
    "mov rbp, rsp",
    "and rsp, -16",
    "call ember_irq_entry",
    "mov rsp, rbp",
    "pop r15",
    "pop r14",
    "pop r13",
    "pop r12",
    "pop r11",
    "pop r10",
    "pop r9",
    "pop r8",
    "pop rsi",
    "pop rdi",
    "pop rbp",
    "pop rdx",
    "pop rcx",
    "pop rbx",
    "pop rax",
    // Descartar o vetor
    "add rsp, 8",
    "iretq",
);

macro_rules! irq_stubs {
    ($($vector:literal => $name:ident),* $(,)?) => {
        $(
            global_asm!(concat!(
                ".global ", stringify!($name), "\n",
                stringify!($name), ":\n",
                "push ", stringify!($vector), "\n",
                "jmp ember_irq_common\n",
            ));
        )*

        extern "C" {
            $(fn $name();)*
        }

        /// Endereços dos stubs, indexados por `vetor - IRQ_VECTOR_BASE`.
        pub fn stub_addresses() -> [usize; IRQ_STUB_COUNT] {
            [$($name as usize),*]
        }
    };
}

irq_stubs! {
    32 => ember_irq_stub_32,
    33 => ember_irq_stub_33,
    34 => ember_irq_stub_34,
    35 => ember_irq_stub_35,
    36 => ember_irq_stub_36,
    37 => ember_irq_stub_37,
    38 => ember_irq_stub_38,
    39 => ember_irq_stub_39,
    40 => ember_irq_stub_40,
    41 => ember_irq_stub_41,
    42 => ember_irq_stub_42,
    43 => ember_irq_stub_43,
    44 => ember_irq_stub_44,
    45 => ember_irq_stub_45,
    46 => ember_irq_stub_46,
    47 => ember_irq_stub_47,
}

/// Endereço do stub para o vetor dado, para o código que monta a IDT.
pub fn stub_for_vector(vector: u8) -> Option<usize> {
    let index = vector.checked_sub(IRQ_VECTOR_BASE)? as usize;
    stub_addresses().get(index).copied()
}

#[no_mangle]
extern "C" fn ember_irq_entry(frame: *mut TrapFrame) {
    let frame = unsafe { *frame };

    let Some(kernel) = crate::core::kernel::installed() else {
        crate::kwarn!("(IRQ) Interrupção antes do kernel instalado, vetor:", frame.vector);
        return;
    };

    if let Err(e) = kernel.handle_vector(frame.vector as u8, frame) {
        crate::kerror!("(IRQ) Falha ao tratar vetor:", frame.vector);
        crate::kerror!("(IRQ) Errno:", e.as_usize() as u64);
    }
}
