//! Simulated probe for unit tests.
//!
//! [`SimDevice`] models the firmware's register file and auto-incrementing
//! register pointer. [`FakeI2c`] and [`FakeDelay`] share its state and append
//! every bus transfer and wait to one event log, so tests can assert on the
//! exact order of operations.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{Error, ErrorKind, ErrorType, I2c, Operation};

use crate::registers::{Command, Register, DEFAULT_ADDRESS};

/// One observable step on the bus or the timer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Write(u8, Vec<u8>),
    Read(u8, Vec<u8>),
    /// A wait, with the config register value at the time it started.
    Delay { ms: u32, config: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeI2cError;

impl Error for FakeI2cError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

struct State {
    regs: [u8; 64],
    pointer: usize,
    address: u8,
    events: Vec<Event>,
    responses: Vec<(u8, Vec<(Register, f32)>)>,
    fail_after: Option<usize>,
}

impl State {
    fn check(&mut self, address: u8) -> Result<(), FakeI2cError> {
        if let Some(remaining) = self.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(FakeI2cError);
            }
            *remaining -= 1;
        }
        if address != self.address {
            return Err(FakeI2cError);
        }
        Ok(())
    }

    fn set_float(&mut self, register: Register, value: f32) {
        let start = register.addr() as usize;
        self.regs[start..start + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn float(&self, register: Register) -> f32 {
        let start = register.addr() as usize;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.regs[start..start + 4]);
        f32::from_le_bytes(bytes)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), FakeI2cError> {
        self.check(address)?;
        self.events.push(Event::Write(address, bytes.to_vec()));

        let Some((&register, payload)) = bytes.split_first() else {
            return Ok(());
        };
        self.pointer = register as usize;
        for &byte in payload {
            self.regs[self.pointer] = byte;
            self.pointer += 1;
        }

        if register == Register::Task.addr() {
            if let Some(&command) = payload.first() {
                self.run(command);
            }
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), FakeI2cError> {
        self.check(address)?;
        for byte in buf.iter_mut() {
            *byte = self.regs[self.pointer];
            self.pointer += 1;
        }
        self.events.push(Event::Read(address, buf.to_vec()));
        Ok(())
    }

    fn run(&mut self, command: u8) {
        if command == u8::from(Command::SetI2cAddress) {
            self.address = self.float(Register::Solution) as u8;
        }

        let results: Vec<(Register, f32)> = self
            .responses
            .iter()
            .filter(|(code, _)| *code == command)
            .flat_map(|(_, results)| results.iter().copied())
            .collect();
        for (register, value) in results {
            self.set_float(register, value);
        }
    }
}

/// Simulated probe shared by a [`FakeI2c`] and a [`FakeDelay`].
#[derive(Clone)]
pub struct SimDevice {
    state: Rc<RefCell<State>>,
}

impl SimDevice {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                regs: [0u8; 64],
                pointer: 0,
                address: DEFAULT_ADDRESS,
                events: Vec::new(),
                responses: Vec::new(),
                fail_after: None,
            })),
        }
    }

    pub fn i2c(&self) -> FakeI2c {
        FakeI2c { state: self.state.clone() }
    }

    pub fn delay(&self) -> FakeDelay {
        FakeDelay { state: self.state.clone() }
    }

    /// When the firmware receives `command`, store `results`.
    pub fn on_command(&self, command: Command, results: &[(Register, f32)]) {
        self.state
            .borrow_mut()
            .responses
            .push((command.into(), results.to_vec()));
    }

    /// Let `n` more bus operations succeed, then fail every one after.
    pub fn fail_after(&self, n: usize) {
        self.state.borrow_mut().fail_after = Some(n);
    }

    pub fn set_float(&self, register: Register, value: f32) {
        self.state.borrow_mut().set_float(register, value);
    }

    pub fn float(&self, register: Register) -> f32 {
        self.state.borrow().float(register)
    }

    pub fn set_byte(&self, register: Register, value: u8) {
        self.state.borrow_mut().regs[register.addr() as usize] = value;
    }

    pub fn byte(&self, register: Register) -> u8 {
        self.state.borrow().regs[register.addr() as usize]
    }

    pub fn address(&self) -> u8 {
        self.state.borrow().address
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }
}

pub struct FakeI2c {
    state: Rc<RefCell<State>>,
}

impl ErrorType for FakeI2c {
    type Error = FakeI2cError;
}

impl I2c for FakeI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => state.write(address, bytes)?,
                Operation::Read(buf) => state.read(address, buf)?,
            }
        }
        Ok(())
    }
}

/// Records waits without sleeping. Yields to the runtime so concurrent tasks
/// get a chance to interleave.
pub struct FakeDelay {
    state: Rc<RefCell<State>>,
}

impl FakeDelay {
    fn record(&mut self, ms: u32) {
        let mut state = self.state.borrow_mut();
        let config = state.regs[Register::Config.addr() as usize];
        state.events.push(Event::Delay { ms, config });
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(ns / 1_000_000);
        tokio::task::yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(ms);
        tokio::task::yield_now().await;
    }
}
