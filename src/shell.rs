//! Console commands backed by the self-tests.
//!
//! The console reads a line, tokenizes it and hands the first token to
//! [`Shell::dispatch`]. Commands take no arguments and report through the
//! shell's character output.

use core::fmt::Write;

use crate::{
    config::VecUnitConfig,
    device::VectorUnit,
    harness::{probe_registers, run_vector_test},
    osal::{CharSink, Osal, SinkWriter},
    registers::{Opcode, RegisterMap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Full ADD job with verification.
    Vector,
    /// Full SUB job with verification.
    VectorSub,
    /// Register write/read-back probe.
    Registers,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Help,
        Command::Vector,
        Command::VectorSub,
        Command::Registers,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    pub const fn token(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Vector => "vector",
            Command::VectorSub => "vsub",
            Command::Registers => "vregs",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Command::Help => "Prints this help",
            Command::Vector => "Tests Vector Unit ADD against a software reference",
            Command::VectorSub => "Tests Vector Unit SUB against a software reference",
            Command::Registers => "Tests Vector Unit register read-back",
        }
    }
}

/// Everything a command needs: the driver, the board config, the scratch
/// arena and the console.
pub struct Shell<'a, R: RegisterMap, O: Osal, S: CharSink> {
    unit: VectorUnit<R, O>,
    config: VecUnitConfig,
    arena: &'a mut [u64],
    out: S,
}

impl<'a, R: RegisterMap, O: Osal, S: CharSink> Shell<'a, R, O, S> {
    pub fn new(
        unit: VectorUnit<R, O>,
        config: VecUnitConfig,
        arena: &'a mut [u64],
        out: S,
    ) -> Self {
        Self {
            unit,
            config,
            arena,
            out,
        }
    }

    pub fn unit(&self) -> &VectorUnit<R, O> {
        &self.unit
    }

    pub fn out(&self) -> &S {
        &self.out
    }

    /// Runs the command named by `token`. Failures are reported on the
    /// console only.
    pub fn dispatch(&mut self, token: &str) {
        let Some(command) = Command::from_token(token) else {
            let _ = writeln!(SinkWriter(&mut self.out), "Command not found");
            return;
        };
        debug!("shell: {:?}", command);

        match command {
            Command::Help => self.help(),
            Command::Vector => self.vector(Opcode::Add),
            Command::VectorSub => self.vector(Opcode::Sub),
            Command::Registers => {
                probe_registers(&self.unit, &self.config, &mut self.out);
            }
        }
    }

    fn help(&mut self) {
        let mut w = SinkWriter(&mut self.out);
        let _ = writeln!(w, "Available commands:");
        for command in Command::ALL {
            let _ = writeln!(w, "{:<16} - {}", command.token(), command.description());
        }
    }

    fn vector(&mut self, opcode: Opcode) {
        if let Err(e) = run_vector_test(
            &mut self.unit,
            &self.config,
            opcode,
            &mut *self.arena,
            &mut self.out,
        ) {
            error!("shell: vector test aborted: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve_to_commands() {
        for command in Command::ALL {
            assert_eq!(Command::from_token(command.token()), Some(command));
        }
        assert_eq!(Command::from_token("donut"), None);
        assert_eq!(Command::from_token(""), None);
    }
}
