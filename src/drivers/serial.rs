// =============================================================================
// SERIAL DRIVER - ZERO OVERHEAD
// =============================================================================
//
// Sink dos macros de log (`kinfo!`, `kerror!`, ...).
//
// - Bare metal: COM1 (UART 16550) via I/O ports, sem lock, sem core::fmt,
//   sem alocação. Em SMP os logs podem se intercalar.
// - Hosted: stderr do processo via `eprint!` (capturado pelo `cargo test`).
//
// FUNÇÕES DISPONÍVEIS:
// - emit(byte)       : Envia um byte
// - emit_str(s)      : Envia string
// - emit_hex(v)      : Envia u64 em hexadecimal (0x + 16 dígitos)
// - emit_nl()        : Envia newline
//
// =============================================================================

#[cfg(target_os = "none")]
mod port {
    use core::arch::asm;

    // Porta de dados da COM1
    const COM1_DATA: u16 = 0x3F8;
    // Line Status Register
    const COM1_STATUS: u16 = 0x3FD;

    #[inline(always)]
    unsafe fn outb(port: u16, value: u8) {
        asm!("out dx, al", in("dx") port, in("al") value, options(nostack, nomem, preserves_flags));
    }

    #[inline(always)]
    unsafe fn inb(port: u16) -> u8 {
        let value: u8;
        asm!("in al, dx", out("al") value, in("dx") port, options(nostack, nomem, preserves_flags));
        value
    }

    /// Configura: 38400 baud, 8N1, FIFO habilitado.
    pub fn init() {
        unsafe {
            outb(COM1_DATA + 1, 0x00); // Sem IRQs
            outb(COM1_DATA + 3, 0x80); // DLAB
            outb(COM1_DATA, 0x03); // Divisor 3 = 38400 baud
            outb(COM1_DATA + 1, 0x00);
            outb(COM1_DATA + 3, 0x03); // 8N1
            outb(COM1_DATA + 2, 0xC7); // FIFO, limpar, 14 bytes
            outb(COM1_DATA + 4, 0x0B);
        }
    }

    #[inline(always)]
    pub fn write_bytes(bytes: &[u8]) {
        for &b in bytes {
            unsafe {
                // Buffer de transmissão vazio: bit 5 do LSR
                while inb(COM1_STATUS) & 0x20 == 0 {
                    core::hint::spin_loop();
                }
                outb(COM1_DATA, b);
            }
        }
    }
}

#[cfg(not(target_os = "none"))]
mod port {
    pub fn init() {}

    /// `eprint!` passa pela captura de saída do `cargo test`.
    pub fn write_bytes(bytes: &[u8]) {
        #[cfg(test)]
        tap::record(bytes);
        eprint!("{}", String::from_utf8_lossy(bytes));
    }

}

/// Inicializa a porta serial. Chamar uma vez no early-boot.
pub fn init() {
    port::init();
}

#[inline]
pub fn emit(byte: u8) {
    port::write_bytes(&[byte]);
}

#[inline(never)]
pub fn emit_str(s: &str) {
    port::write_bytes(s.as_bytes());
}

#[inline(never)]
pub fn emit_nl() {
    #[cfg(target_os = "none")]
    port::write_bytes(b"\r\n");
    #[cfg(not(target_os = "none"))]
    port::write_bytes(b"\n");
}

/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres).
#[inline(never)]
pub fn emit_hex(value: u64) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut buf = [0u8; 18];
    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..16 {
        let nibble = (value >> (60 - 4 * i)) & 0xF;
        buf[2 + i] = DIGITS[nibble as usize];
    }
    port::write_bytes(&buf);
}
