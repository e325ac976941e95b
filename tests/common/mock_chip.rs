//! Mock nRF24L01+ behind an SPI device, plus mock CE and IRQ lines
//!
//! All mocks are `Clone` and share their state, so a test keeps a handle
//! while the driver owns another.

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, Operation, SpiDevice};
use nrf24::EdgeCallback;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

const STATUS: u8 = 0x07;
const OBSERVE_TX: u8 = 0x08;
const RPD: u8 = 0x09;
const FIFO_STATUS: u8 = 0x17;
const FIFO_DEPTH: usize = 3;

/// Simulated chip state
#[derive(Debug)]
struct ChipState {
    /// Register bytes by address, multi-byte registers LSB first
    registers: Vec<Vec<u8>>,
    tx_fifo: VecDeque<Vec<u8>>,
    rx_fifo: VecDeque<(u8, Vec<u8>)>,
    /// MOSI bytes of every transaction, in order
    transactions: Vec<Vec<u8>>,
    fail_next: bool,
    /// STATUS bits to raise once this many transactions completed
    deferred_raise: Option<(usize, u8)>,
}

impl ChipState {
    fn new() -> Self {
        let mut registers = vec![vec![0x00]; 0x20];
        registers[0x00] = vec![0x08];
        registers[0x01] = vec![0x3F];
        registers[0x02] = vec![0x03];
        registers[0x03] = vec![0x03];
        registers[0x04] = vec![0x03];
        registers[0x05] = vec![0x02];
        registers[0x06] = vec![0x0E];
        registers[0x0A] = vec![0xE7; 5];
        registers[0x0B] = vec![0xC2; 5];
        registers[0x0C] = vec![0xC3];
        registers[0x0D] = vec![0xC4];
        registers[0x0E] = vec![0xC5];
        registers[0x0F] = vec![0xC6];
        registers[0x10] = vec![0xE7; 5];
        Self {
            registers,
            tx_fifo: VecDeque::new(),
            rx_fifo: VecDeque::new(),
            transactions: Vec::new(),
            fail_next: false,
            deferred_raise: None,
        }
    }

    fn status(&self) -> u8 {
        let rx_p_no = self.rx_fifo.front().map_or(0b111, |(pipe, _)| *pipe);
        let tx_full = (self.tx_fifo.len() == FIFO_DEPTH) as u8;
        (self.registers[STATUS as usize][0] & 0x70) | (rx_p_no << 1) | tx_full
    }

    fn fifo_status(&self) -> u8 {
        let tx_full = (self.tx_fifo.len() == FIFO_DEPTH) as u8;
        let tx_empty = self.tx_fifo.is_empty() as u8;
        let rx_full = (self.rx_fifo.len() == FIFO_DEPTH) as u8;
        let rx_empty = self.rx_fifo.is_empty() as u8;
        tx_full << 5 | tx_empty << 4 | rx_full << 1 | rx_empty
    }

    fn read(&self, address: u8, out: &mut [u8]) {
        match address {
            STATUS => out.fill(self.status()),
            FIFO_STATUS => out.fill(self.fifo_status()),
            _ => {
                let register = &self.registers[address as usize];
                for (i, byte) in out.iter_mut().enumerate() {
                    *byte = register.get(i).copied().unwrap_or(0);
                }
            }
        }
    }

    fn write(&mut self, address: u8, data: &[u8]) {
        match address {
            STATUS => self.registers[STATUS as usize][0] &= !(data[0] & 0x70),
            OBSERVE_TX | RPD | FIFO_STATUS => {}
            _ => {
                let register = &mut self.registers[address as usize];
                for (i, byte) in data.iter().enumerate() {
                    if i < register.len() {
                        register[i] = *byte;
                    }
                }
            }
        }
    }

    /// Run one CSN frame, `frame` holds MOSI on entry and MISO on return
    fn exchange(&mut self, frame: &mut [u8]) {
        self.transactions.push(frame.to_vec());
        let status = self.status();
        let opcode = frame[0];
        frame[0] = status;
        let data = &mut frame[1..];
        match opcode {
            0x00..=0x1F => self.read(opcode, data),
            0x20..=0x3F => {
                let written = data.to_vec();
                self.write(opcode & 0x1F, &written);
            }
            0x60 => {
                let width = self.rx_fifo.front().map_or(0, |(_, p)| p.len() as u8);
                data.fill(width);
            }
            0x61 => {
                if let Some((_, payload)) = self.rx_fifo.pop_front() {
                    for (i, byte) in data.iter_mut().enumerate() {
                        *byte = payload.get(i).copied().unwrap_or(0);
                    }
                }
            }
            0xA0 | 0xB0 | 0xA8..=0xAD => {
                if self.tx_fifo.len() < FIFO_DEPTH {
                    self.tx_fifo.push_back(data.to_vec());
                }
            }
            0xE1 => self.tx_fifo.clear(),
            0xE2 => self.rx_fifo.clear(),
            0xE3 | 0xFF => {}
            other => panic!("unexpected opcode 0x{:02X}", other),
        }

        if let Some((remaining, bits)) = self.deferred_raise.take() {
            if remaining <= 1 {
                self.registers[STATUS as usize][0] |= bits;
            } else {
                self.deferred_raise = Some((remaining - 1, bits));
            }
        }
    }
}

/// SPI device wired to a simulated chip
#[derive(Clone)]
pub struct MockSpi {
    state: Arc<Mutex<ChipState>>,
}

impl MockSpi {
    /// Chip in its power-on state
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChipState::new())),
        }
    }

    /// First byte of a register
    pub fn register(&self, address: u8) -> u8 {
        self.register_bytes(address)[0]
    }

    pub fn register_bytes(&self, address: u8) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let mut out = vec![0; state.registers[address as usize].len()];
        state.read(address, &mut out);
        out
    }

    /// Overwrite a register behind the driver's back, no access rules
    pub fn set_register(&self, address: u8, value: u8) {
        self.state.lock().unwrap().registers[address as usize][0] = value;
    }

    /// Flag interrupt conditions in STATUS
    pub fn raise(&self, bits: u8) {
        self.state.lock().unwrap().registers[STATUS as usize][0] |= bits & 0x70;
    }

    /// Flag interrupt conditions once `transactions` more frames completed
    pub fn raise_after(&self, transactions: usize, bits: u8) {
        self.state.lock().unwrap().deferred_raise = Some((transactions, bits & 0x70));
    }

    /// Receive a payload on `pipe`, flagging RX_DR
    pub fn receive(&self, pipe: u8, payload: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.rx_fifo.push_back((pipe, payload.to_vec()));
        state.registers[STATUS as usize][0] |= 0x40;
    }

    pub fn tx_fifo(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().tx_fifo.iter().cloned().collect()
    }

    pub fn rx_fifo_len(&self) -> usize {
        self.state.lock().unwrap().rx_fifo.len()
    }

    /// MOSI bytes of every transaction so far
    pub fn transactions(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn clear_transactions(&self) {
        self.state.lock().unwrap().transactions.clear();
    }

    /// Make the next transaction fail without reaching the chip
    pub fn fail_next_transfer(&self) {
        self.state.lock().unwrap().fail_next = true;
    }
}

impl spi::ErrorType for MockSpi {
    type Error = ErrorKind;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next {
            state.fail_next = false;
            return Err(ErrorKind::Other);
        }
        for operation in operations {
            match operation {
                Operation::TransferInPlace(frame) => state.exchange(frame),
                _ => panic!("driver only issues in-place transfers"),
            }
        }
        Ok(())
    }
}

/// Output pin remembering every level it was driven to
#[derive(Clone, Default)]
pub struct MockPin {
    levels: Arc<Mutex<Vec<bool>>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.levels.lock().unwrap().last().copied().unwrap_or(false)
    }

    pub fn levels(&self) -> Vec<bool> {
        self.levels.lock().unwrap().clone()
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.lock().unwrap().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.lock().unwrap().push(true);
        Ok(())
    }
}

/// IRQ line whose falling edges are triggered by the test
#[derive(Clone, Default)]
pub struct MockIrq {
    callback: Arc<Mutex<Option<Arc<dyn Fn() + Send + Sync>>>>,
}

impl MockIrq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    /// Deliver a falling edge on the calling thread. Returns whether a
    /// callback was installed.
    pub fn fire(&self) -> bool {
        // Don't hold our lock while the callback runs: it takes the waiter's
        // lock, and the waiter clears the callback with that lock held.
        let callback = self.callback.lock().unwrap().clone();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl nrf24::IrqLine for MockIrq {
    type Error = Infallible;

    fn set_falling_edge_callback(&mut self, callback: EdgeCallback) -> Result<(), Self::Error> {
        *self.callback.lock().unwrap() = Some(Arc::from(callback));
        Ok(())
    }

    fn clear_falling_edge_callback(&mut self) -> Result<(), Self::Error> {
        self.callback.lock().unwrap().take();
        Ok(())
    }
}
