//! A tiny x86-64 machine that executes generated routines, for tests.
//!
//! Only the instructions in [`Instruction`] are modelled. Memory is a sparse map of
//! quadwords; reading a quadword that was never written panics.

use crate::{
    asm::{Instruction, Register, Symbol},
    listing::Listing,
};
use std::collections::{BTreeMap, HashMap};

/// Initial stack pointer. The CPU aligns to 16 bytes before pushing its frame.
pub const STACK_TOP: u64 = 0x7FFF_F000;

/// Pushed as the return address of a `call`.
const RETURN_ADDRESS: u64 = 0xC0DE_0000_C0DE;

/// Registers clobbered across a SysV call.
const CALLER_SAVED: [Register; 9] = [
    Register::Rax,
    Register::Rcx,
    Register::Rdx,
    Register::Rsi,
    Register::Rdi,
    Register::R8,
    Register::R9,
    Register::R10,
    Register::R11,
];

/// Written over caller-saved registers after the handler returns.
const CLOBBER: u64 = 0xBAD0_0000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IretFrame {
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl IretFrame {
    pub const fn kernel(rip: u64, rsp: u64) -> Self {
        Self { rip, cs: 0x08, rflags: 0x202, rsp, ss: 0x10 }
    }
}

#[derive(Debug)]
pub enum Exit {
    Jump(Symbol),
    Return(IretFrame),
}

/// State observed when the machine executed a `call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRecord {
    pub argument: u64,
    /// `rsp` after the return address was pushed.
    pub entry_rsp: u64,
    pub direction_flag: bool,
}

pub struct Machine {
    registers: BTreeMap<Register, u64>,
    memory: BTreeMap<u64, u64>,
    direction_flag: bool,
    calls: Vec<CallRecord>,
    iret_stack: Option<u64>,
}

impl Machine {
    pub fn new() -> Self {
        let registers = Register::ALL.into_iter().map(|register| (register, 0)).collect();
        let mut machine =
            Self { registers, memory: BTreeMap::new(), direction_flag: true, calls: Vec::new(), iret_stack: None };
        machine.set_register(Register::Rsp, STACK_TOP);
        machine
    }

    pub fn register(&self, register: Register) -> u64 {
        self.registers[&register]
    }

    pub fn set_register(&mut self, register: Register, value: u64) {
        self.registers.insert(register, value);
    }

    pub fn read(&self, address: u64) -> u64 {
        match self.memory.get(&address) {
            Some(value) => *value,
            None => panic!("read of uninitialized memory at {address:#x}"),
        }
    }

    pub fn write(&mut self, address: u64, value: u64) {
        self.memory.insert(address, value);
    }

    pub fn push(&mut self, value: u64) {
        let rsp = self.register(Register::Rsp) - 8;
        self.set_register(Register::Rsp, rsp);
        self.write(rsp, value);
    }

    pub fn pop(&mut self) -> u64 {
        let rsp = self.register(Register::Rsp);
        let value = self.read(rsp);
        self.set_register(Register::Rsp, rsp + 8);
        value
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// `rsp` after the last `iretq` popped its frame, before it switched to the popped `rsp`.
    pub fn iret_stack(&self) -> Option<u64> {
        self.iret_stack
    }

    /// Pushes the interrupt return frame, and the error code if given, as the CPU does on delivery.
    pub fn deliver(&mut self, frame: IretFrame, error_code: Option<u64>) {
        assert_eq!(self.register(Register::Rsp) % 16, 0);

        self.push(frame.ss);
        self.push(frame.rsp);
        self.push(frame.rflags);
        self.push(frame.cs);
        self.push(frame.rip);
        if let Some(error_code) = error_code {
            self.push(error_code);
        }
    }

    /// Runs `code` until it jumps away or returns from the interrupt.
    ///
    /// `handler` stands in for any called function; it receives the machine and the value of `rdi`.
    pub fn run(&mut self, code: &[Instruction], handler: &mut dyn FnMut(&mut Machine, u64)) -> Exit {
        for instruction in code {
            match instruction {
                Instruction::PushImm(imm) => self.push(u64::from(*imm)),
                Instruction::SubImm { dst, imm } => {
                    self.set_register(*dst, self.register(*dst) - u64::try_from(*imm).unwrap());
                }
                Instruction::AddImm { dst, imm } => {
                    self.set_register(*dst, self.register(*dst) + u64::try_from(*imm).unwrap());
                }
                Instruction::Store { src, base, disp } => {
                    self.write(self.register(*base) + u64::try_from(*disp).unwrap(), self.register(*src));
                }
                Instruction::Load { base, disp, dst } => {
                    let value = self.read(self.register(*base) + u64::try_from(*disp).unwrap());
                    self.set_register(*dst, value);
                }
                Instruction::Mov { src, dst } => self.set_register(*dst, self.register(*src)),
                Instruction::Cld => self.direction_flag = false,
                Instruction::Call(_) => {
                    self.push(RETURN_ADDRESS);

                    let argument = self.register(Register::Rdi);
                    self.calls.push(CallRecord {
                        argument,
                        entry_rsp: self.register(Register::Rsp),
                        direction_flag: self.direction_flag,
                    });
                    handler(self, argument);

                    for (index, register) in CALLER_SAVED.into_iter().enumerate() {
                        self.set_register(register, CLOBBER + index as u64);
                    }

                    assert_eq!(self.pop(), RETURN_ADDRESS);
                }
                Instruction::Jmp(target) => return Exit::Jump(target.clone()),
                Instruction::Iretq => {
                    let rip = self.pop();
                    let cs = self.pop();
                    let rflags = self.pop();
                    let rsp = self.pop();
                    let ss = self.pop();

                    self.iret_stack = Some(self.register(Register::Rsp));
                    self.set_register(Register::Rsp, rsp);
                    return Exit::Return(IretFrame { rip, cs, rflags, rsp, ss });
                }
            }
        }

        panic!("fell off the end of a routine")
    }
}

/// Every routine of a listing, addressable by label.
pub struct Program {
    routines: HashMap<Symbol, Vec<Instruction>>,
}

impl Program {
    /// The common routine and every stub, keyed by label.
    pub fn new(listing: &Listing) -> Self {
        let mut routines = HashMap::new();
        routines.insert(listing.symbols().common.clone(), listing.trampoline().instructions());
        for stub in listing.table().stubs() {
            routines.insert(stub.label().clone(), stub.body().to_vec());
        }

        Self { routines }
    }

    pub fn routine(&self, label: &Symbol) -> &[Instruction] {
        &self.routines[label]
    }

    /// Runs from `entry`, following jumps, until the interrupt returns.
    pub fn execute(
        &self,
        machine: &mut Machine,
        entry: &Symbol,
        handler: &mut dyn FnMut(&mut Machine, u64),
    ) -> IretFrame {
        let mut label = entry.clone();

        loop {
            match machine.run(self.routine(&label), handler) {
                Exit::Jump(target) => label = target,
                Exit::Return(frame) => return frame,
            }
        }
    }
}
