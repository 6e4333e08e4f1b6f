//! Parser da Linha de Comando do Kernel.
//!
//! Parâmetros `chave=valor` ou flags (`chave`) separados por espaços, ex.:
//! `sched.quantum=5 sched.hz=250 smp.cores=2 quiet`.
//!
//! Armazenamento estático (sem heap) para estar disponível cedo no boot.

use crate::sys::{Errno, KResult};

/// Tamanho máximo da linha de comando
const CMDLINE_MAX_LEN: usize = 256;

#[derive(Clone)]
pub struct CommandLine {
    buffer: [u8; CMDLINE_MAX_LEN],
    len: usize,
}

impl CommandLine {
    pub const fn empty() -> Self {
        Self {
            buffer: [0; CMDLINE_MAX_LEN],
            len: 0,
        }
    }

    /// Copia a linha fornecida pelo bootloader.
    ///
    /// Linhas maiores que o buffer são rejeitadas em vez de truncadas, para
    /// não cortar um valor no meio.
    pub fn parse(args: &str) -> KResult<Self> {
        let bytes = args.as_bytes();
        if bytes.len() > CMDLINE_MAX_LEN {
            crate::kerror!("(Boot) Linha de comando longa demais, bytes:", bytes.len());
            return Err(Errno::EINVAL);
        }

        let mut cmdline = Self::empty();
        cmdline.buffer[..bytes.len()].copy_from_slice(bytes);
        cmdline.len = bytes.len();
        Ok(cmdline)
    }

    pub fn as_str(&self) -> &str {
        // Construído a partir de &str e nunca alterado depois
        core::str::from_utf8(&self.buffer[..self.len]).unwrap_or("")
    }

    /// Itera pelos parâmetros como pares (chave, valor). Flags têm valor `""`.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.as_str()
            .split_ascii_whitespace()
            .map(|tok| tok.split_once('=').unwrap_or((tok, "")))
    }

    /// Verifica se uma flag ou parâmetro existe.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Valor do parâmetro. Em chaves repetidas vale a última ocorrência.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params().filter(|(k, _)| *k == key).map(|(_, v)| v).last()
    }

    /// Valor numérico do parâmetro: `Ok(None)` se ausente, `EINVAL` se inválido.
    pub fn get_u64(&self, key: &str) -> KResult<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v.parse::<u64>().map(Some).map_err(|_| Errno::EINVAL),
        }
    }
}

impl Default for CommandLine {
    fn default() -> Self {
        Self::empty()
    }
}
