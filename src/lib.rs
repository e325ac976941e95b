//! A platform agnostic Rust driver for the nRF24L01+, based on the `embedded-hal` traits.
//!
//! The driver works at register level: every register and field of the chip
//! is described by a static descriptor (see [`regs`] and [`fields`]), and
//! [`Nrf24::get`]/[`Nrf24::set`] read and write any combination of them in as
//! few bus transactions as possible.
//!
//! ```no_run
//! # fn demo<SPI, CE, IRQ>(
//! #     radio: &mut nrf24::Nrf24<SPI, CE, IRQ>,
//! # ) -> Result<(), nrf24::Error<SPI::Error>>
//! # where
//! #     SPI: embedded_hal::spi::SpiDevice,
//! #     CE: embedded_hal::digital::OutputPin,
//! #     IRQ: nrf24::IrqLine,
//! # {
//! use nrf24::fields::{PRIM_RX, PWR_UP, RF_CH};
//!
//! radio.reset_to_default()?;
//! radio.set([PWR_UP.value(1)?.and(PRIM_RX.value(1)?)?])?;
//! radio.set([RF_CH.value(76)?])?;
//! let [pwr_up, channel] = radio.get_array([&PWR_UP, &RF_CH])?;
//! # Ok(())
//! # }
//! ```
//!
//! Blocking on the IRQ line, optionally cancellable from another thread, is
//! covered in the [`wait`] module.

use core::fmt;
use std::sync::Arc;

use commands::Command;
use embedded_hal::{digital, spi};
use registers::regs::addr;
use thiserror::Error;

pub mod commands;
pub mod config;
pub mod irq;
pub mod registers;
pub mod wait;

pub use config::Config;
pub use irq::{EdgeCallback, Irq, IrqLine, NoIrq};
pub use registers::{
    check_address_and_size, fields, regs, Access, Conflict, FieldSpec, FieldValue,
    FieldValueSet, RegisterSpec, RegisterValue, Request, ValueError, Write,
};
pub use wait::{IrqCanceller, IrqGuard, IrqLock, WaitError, WaitOutcome};

use registers::MAX_REGISTER_SIZE;
use wait::WaitSlot;

pub const NRF24_MODE: spi::Mode = embedded_hal::spi::MODE_0;

/// Largest TX/RX payload, in bytes
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// Number of RX data pipes
pub const PIPES: u8 = 6;

/// nRF24 error
#[derive(Debug, PartialEq, Error)]
pub enum Error<E> {
    #[error("SPI error: {0:?}")]
    Transfer(E),
    #[error("GPIO error")]
    Pin,
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Wait(#[from] WaitError),
    #[error("payload length {0} not in 1..=32")]
    InvalidPayloadLength(usize),
    #[error("pipe {0} not in 0..=5")]
    InvalidPipe(u8),
    #[error("nothing to write")]
    NothingToWrite,
}

/// STATUS register, as shifted out at the start of every transaction
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Status {
    value: u8,
}

impl Status {
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    pub fn bits(&self) -> u8 {
        self.value
    }

    /// Data ready in the RX FIFO
    pub fn rx_dr(&self) -> bool {
        fields::RX_DR.extract(self.value) == 1
    }

    /// Packet transmitted, or acknowledged when auto-ack is on
    pub fn tx_ds(&self) -> bool {
        fields::TX_DS.extract(self.value) == 1
    }

    /// Retransmit limit reached
    pub fn max_rt(&self) -> bool {
        fields::MAX_RT.extract(self.value) == 1
    }

    /// Pipe of the payload at the head of the RX FIFO, `None` when empty
    pub fn rx_pipe(&self) -> Option<u8> {
        Some(fields::RX_P_NO.extract(self.value)).filter(|pipe| *pipe < PIPES)
    }

    pub fn tx_full(&self) -> bool {
        fields::TX_FULL.extract(self.value) == 1
    }

    /// Interrupt conditions flagged, masked or not
    pub fn irq(&self) -> Irq {
        Irq::from_bits_truncate(self.value)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Status rx_dr: {}, tx_ds: {}, max_rt: {}, rx pipe: {}, tx full: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe(),
            self.tx_full()
        )
    }
}

/// Register content decoded field by field, see [`Nrf24::describe_register`]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RegisterDump {
    spec: &'static RegisterSpec,
    bytes: Vec<u8>,
}

impl RegisterDump {
    pub fn spec(&self) -> &'static RegisterSpec {
        self.spec
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Value of every named field, in layout order
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldSpec, u8)> + '_ {
        let byte = self.bytes.first().copied().unwrap_or_default();
        self.spec
            .named_fields()
            .map(move |field| (field, field.extract(byte)))
    }
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} (0x{:02X}): {}",
            self.spec.name, self.spec.address, self.spec.description
        )?;
        if self.spec.fields.is_empty() {
            return writeln!(f, "  {:02X?}", self.bytes);
        }
        let width = self
            .spec
            .named_fields()
            .map(|field| field.name.len())
            .max()
            .unwrap_or_default();
        for (field, value) in self.fields() {
            let bits = if field.width == 1 {
                format!("[{}]", field.start_bit)
            } else {
                format!("[{}:{}]", field.end_bit(), field.start_bit)
            };
            let summary = field.description.lines().next().unwrap_or_default();
            writeln!(
                f,
                "  {:<width$}  {:<5}  {:>3}  {}",
                field.name,
                bits,
                value,
                summary,
                width = width
            )?;
        }
        Ok(())
    }
}

/// Register bytes gathered by one batched read, indexed by address
struct Snapshot {
    bytes: [u8; addr::LAST as usize + 1],
}

impl Snapshot {
    fn get(&self, request: &Request) -> u8 {
        request.project(self.bytes[request.address() as usize])
    }
}

/// Validated write batch: whole registers first, then field sets by address
#[derive(Default)]
struct WritePlan {
    registers: Vec<RegisterValue>,
    fields: Vec<FieldValueSet>,
}

impl WritePlan {
    fn build<I>(items: I) -> Result<Self, ValueError>
    where
        I: IntoIterator,
        I::Item: Into<Write>,
    {
        let mut plan = Self::default();
        for item in items {
            match item.into() {
                Write::Register(value) => {
                    let address = value.spec().address;
                    if plan.registers.iter().any(|r| r.spec().address == address) {
                        return Err(ValueError::Conflict(Conflict::DuplicateRegister { address }));
                    }
                    if plan.fields.iter().any(|s| s.address() == Some(address)) {
                        return Err(ValueError::Conflict(Conflict::RegisterAndFields { address }));
                    }
                    plan.registers.push(value);
                }
                Write::Fields(set) => {
                    let Some(address) = set.address() else {
                        continue;
                    };
                    if plan.registers.iter().any(|r| r.spec().address == address) {
                        return Err(ValueError::Conflict(Conflict::RegisterAndFields { address }));
                    }
                    match plan.fields.iter_mut().find(|s| s.address() == Some(address)) {
                        Some(existing) => existing.merge(&set)?,
                        None => plan.fields.push(set),
                    }
                }
            }
        }
        Ok(plan)
    }

    fn is_empty(&self) -> bool {
        self.registers.is_empty() && self.fields.is_empty()
    }
}

struct Joined<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Joined<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

/// Driver for the nRF24L01+
pub struct Nrf24<SPI, CE, IRQ> {
    spi: SPI,
    ce: CE,
    irq: IRQ,
    cfg: Config,
    wait: Arc<WaitSlot>,
}

impl<SPI, CE, IRQ> Nrf24<SPI, CE, IRQ>
where
    SPI: spi::SpiDevice,
    CE: digital::OutputPin,
    IRQ: IrqLine,
{
    /// Create a new nRF24 driver. The chip is left untouched, see
    /// [`reset_to_default`](Self::reset_to_default).
    pub fn new(spi: SPI, ce: CE, irq: IRQ) -> Self {
        Self::with_config(spi, ce, irq, Config::default())
    }

    pub fn with_config(spi: SPI, ce: CE, irq: IRQ, cfg: Config) -> Self {
        Self {
            spi,
            ce,
            irq,
            cfg,
            wait: Arc::new(WaitSlot::default()),
        }
    }

    /// Releases SPI bus and control pins
    pub fn release(self) -> (SPI, CE, IRQ) {
        (self.spi, self.ce, self.irq)
    }

    /// Set common config
    pub fn set_config(&mut self, cfg: Config) {
        log::trace!("set_config({:?})", cfg);
        self.cfg = cfg;
    }

    /// Get common config
    pub fn config(&self) -> Config {
        self.cfg
    }

    /// Handle that cancels [`wait_for_irq_low_cancellable`](Self::wait_for_irq_low_cancellable)
    /// from another thread
    pub fn canceller(&self) -> IrqCanceller {
        IrqCanceller::new(self.wait.clone())
    }

    /// Drive CE high: start RX, or TX of the FIFO head
    pub fn chip_enable_high(&mut self) -> Result<(), Error<SPI::Error>> {
        log::trace!("chip_enable_high()");
        self.ce.set_high().map_err(|_| Error::Pin)
    }

    /// Drive CE low: back to standby
    pub fn chip_enable_low(&mut self) -> Result<(), Error<SPI::Error>> {
        log::trace!("chip_enable_low()");
        self.ce.set_low().map_err(|_| Error::Pin)
    }

    /// Get status, with a single NOP
    pub fn get_status(&mut self) -> Result<Status, Error<SPI::Error>> {
        log::trace!("get_status()");
        self.command(Command::Nop)
    }

    /// Read `value.len()` bytes of the register at `address`
    pub fn read_register(
        &mut self,
        address: u8,
        value: &mut [u8],
    ) -> Result<Status, Error<SPI::Error>> {
        log::trace!("read_register(0x{:02x}, {})", address, value.len());
        check_address_and_size(address, value.len())?;
        if address == addr::STATUS {
            let status = self.command(Command::Nop)?;
            value[0] = status.bits();
            return Ok(status);
        }
        let mut scratch = [Command::Nop as u8; 1 + MAX_REGISTER_SIZE];
        let frame = &mut scratch[..=value.len()];
        frame[0] = Command::ReadRegister.opcode(address);
        let status = self.transfer(frame)?;
        value.copy_from_slice(&frame[1..]);
        Ok(status)
    }

    /// Write `value` to the register at `address`
    pub fn write_register(
        &mut self,
        address: u8,
        value: &[u8],
    ) -> Result<Status, Error<SPI::Error>> {
        log::trace!("write_register(0x{:02x}, {:02x?})", address, value);
        check_address_and_size(address, value.len())?;
        let mut scratch = [0; 1 + MAX_REGISTER_SIZE];
        let frame = &mut scratch[..=value.len()];
        frame[0] = Command::WriteRegister.opcode(address);
        frame[1..].copy_from_slice(value);
        self.transfer(frame)
    }

    pub fn flush_tx(&mut self) -> Result<Status, Error<SPI::Error>> {
        log::trace!("flush_tx()");
        self.command(Command::FlushTx)
    }

    pub fn flush_rx(&mut self) -> Result<Status, Error<SPI::Error>> {
        log::trace!("flush_rx()");
        self.command(Command::FlushRx)
    }

    /// Reuse the last transmitted payload while CE is high
    pub fn reuse_tx_payload(&mut self) -> Result<Status, Error<SPI::Error>> {
        log::trace!("reuse_tx_payload()");
        self.command(Command::ReuseTxPayload)
    }

    pub fn write_tx_payload(&mut self, payload: &[u8]) -> Result<Status, Error<SPI::Error>> {
        log::trace!("write_tx_payload({:02x?})", payload);
        self.write_payload(Command::WriteTxPayload.opcode(0), payload)
    }

    /// Queue a payload that must not be acknowledged, needs EN_DYN_ACK
    pub fn write_tx_payload_no_ack(&mut self, payload: &[u8]) -> Result<Status, Error<SPI::Error>> {
        log::trace!("write_tx_payload_no_ack({:02x?})", payload);
        self.write_payload(Command::WriteTxPayloadNoAck.opcode(0), payload)
    }

    /// Queue a payload sent back with the next ACK on `pipe`, needs EN_ACK_PAY
    pub fn write_ack_payload(
        &mut self,
        pipe: u8,
        payload: &[u8],
    ) -> Result<Status, Error<SPI::Error>> {
        log::trace!("write_ack_payload({}, {:02x?})", pipe, payload);
        if pipe >= PIPES {
            return Err(Error::InvalidPipe(pipe));
        }
        self.write_payload(Command::WriteAckPayload.opcode(pipe), payload)
    }

    /// Pop the RX FIFO head into `payload`
    pub fn read_rx_payload(&mut self, payload: &mut [u8]) -> Result<Status, Error<SPI::Error>> {
        log::trace!("read_rx_payload({})", payload.len());
        check_payload_length(payload.len())?;
        let mut scratch = [Command::Nop as u8; 1 + MAX_PAYLOAD_SIZE];
        let frame = &mut scratch[..=payload.len()];
        frame[0] = Command::ReadRxPayload.opcode(0);
        let status = self.transfer(frame)?;
        payload.copy_from_slice(&frame[1..]);
        Ok(status)
    }

    /// Width of the RX FIFO head, for dynamic payload length
    pub fn read_rx_payload_width(&mut self) -> Result<(Status, u8), Error<SPI::Error>> {
        log::trace!("read_rx_payload_width()");
        let mut frame = [Command::ReadRxPayloadWidth.opcode(0), Command::Nop as u8];
        let status = self.transfer(&mut frame)?;
        Ok((status, frame[1]))
    }

    /// Read one register or field
    pub fn get(&mut self, request: impl Into<Request>) -> Result<u8, Error<SPI::Error>> {
        let [value] = self.get_array([request.into()])?;
        Ok(value)
    }

    /// Read several registers and fields, each distinct register once.
    ///
    /// Values come back in request order, duplicates included. STATUS gets its
    /// own READ_REGISTER only when nothing else is requested, otherwise it
    /// comes for free with the other reads.
    pub fn get_array<R, const N: usize>(
        &mut self,
        requests: [R; N],
    ) -> Result<[u8; N], Error<SPI::Error>>
    where
        R: Into<Request>,
    {
        let requests: [Request; N] = requests.map(Into::into);
        log::trace!("get({})", Joined(&requests));
        let snapshot = self.snapshot(&requests)?;
        Ok(requests.map(|request| snapshot.get(&request)))
    }

    /// Slice form of [`get_array`](Self::get_array)
    pub fn get_many(&mut self, requests: &[Request]) -> Result<Vec<u8>, Error<SPI::Error>> {
        log::trace!("get({})", Joined(requests));
        let snapshot = self.snapshot(requests)?;
        Ok(requests.iter().map(|request| snapshot.get(request)).collect())
    }

    fn snapshot(&mut self, requests: &[Request]) -> Result<Snapshot, Error<SPI::Error>> {
        let mut needed = [false; addr::LAST as usize + 1];
        for request in requests {
            if let Request::Register(spec) = request {
                if !spec.is_single_byte() {
                    return Err(ValueError::InvalidAddressOrSize {
                        address: spec.address,
                        size: 1,
                    }
                    .into());
                }
            }
            needed[request.address() as usize] = true;
        }

        let mut snapshot = Snapshot {
            bytes: [0; addr::LAST as usize + 1],
        };
        let mut status = None;
        for address in 0..=addr::LAST {
            if !needed[address as usize] || address == addr::STATUS {
                continue;
            }
            let mut value = [0];
            status = Some(self.read_register(address, &mut value)?);
            snapshot.bytes[address as usize] = value[0];
        }
        if needed[addr::STATUS as usize] {
            let status = match status {
                Some(status) => status,
                None => {
                    let mut frame = [
                        Command::ReadRegister.opcode(addr::STATUS),
                        Command::Nop as u8,
                    ];
                    self.transfer(&mut frame)?
                }
            };
            snapshot.bytes[addr::STATUS as usize] = status.bits();
        }
        Ok(snapshot)
    }

    /// Write registers and fields.
    ///
    /// Field values for the same register are merged, so each register is
    /// written once. Registers written whole go first, then fields, with a
    /// read-modify-write unless the fields cover the whole byte. Flags that
    /// clear on a written 1 are only written when named. Everything
    /// is validated before the first transaction; the returned STATUS is the
    /// one seen by the last write.
    ///
    /// The read-modify-write is not atomic against other writers of the chip.
    pub fn set<I>(&mut self, items: I) -> Result<Status, Error<SPI::Error>>
    where
        I: IntoIterator,
        I::Item: Into<Write>,
    {
        let plan = WritePlan::build(items)?;
        if plan.is_empty() {
            return Err(Error::NothingToWrite);
        }
        let mut status = None;
        for value in &plan.registers {
            log::trace!("set({})", value);
            status = Some(self.write_register(value.spec().address, value.bytes())?);
        }
        for set in &plan.fields {
            log::trace!("set({})", set);
            let Some(address) = set.address() else {
                continue;
            };
            let byte = if set.mask() == u8::MAX {
                set.value()
            } else {
                let mut current = [0];
                self.read_register(address, &mut current)?;
                set.apply(current[0] & !fields::write_one_to_clear_mask(address))
            };
            status = Some(self.write_register(address, &[byte])?);
        }
        status.ok_or(Error::NothingToWrite)
    }

    /// Bring the chip back to its power-on register state.
    ///
    /// CE goes low and both FIFOs are flushed first, then every writable
    /// field gets its reset value, pending interrupts are cleared and the
    /// pipe addresses are restored.
    pub fn reset_to_default(&mut self) -> Result<Status, Error<SPI::Error>> {
        log::trace!("reset_to_default()");
        self.chip_enable_low()?;
        self.flush_tx()?;
        self.flush_rx()?;

        let mut defaults = Vec::new();
        for register in regs::ALL {
            let mut set = FieldValueSet::new();
            for field in register.named_fields().filter(|f| f.is_writable()) {
                set.add(field.value(field.reset_value)?)?;
            }
            if !set.is_empty() {
                defaults.push(set);
            }
        }
        self.set(defaults)?;

        let mut clear = FieldValueSet::new();
        for field in fields::WRITE_ONE_TO_CLEAR {
            clear.add(field.value(1)?)?;
        }
        self.set([clear])?;

        let addresses: [(&RegisterSpec, &[u8]); 7] = [
            (&regs::RX_ADDR_P0, &[0xE7; 5]),
            (&regs::RX_ADDR_P1, &[0xC2; 5]),
            (&regs::RX_ADDR_P2, &[0xC3]),
            (&regs::RX_ADDR_P3, &[0xC4]),
            (&regs::RX_ADDR_P4, &[0xC5]),
            (&regs::RX_ADDR_P5, &[0xC6]),
            (&regs::TX_ADDR, &[0xE7; 5]),
        ];
        let mut status = None;
        for (register, bytes) in addresses {
            status = Some(self.write_register(register.address, bytes)?);
        }
        status.ok_or(Error::NothingToWrite)
    }

    /// Read a register and decode it field by field, for debugging
    pub fn describe_register(
        &mut self,
        spec: &'static RegisterSpec,
    ) -> Result<RegisterDump, Error<SPI::Error>> {
        log::trace!("describe_register({})", spec.name);
        let mut bytes = vec![0; spec.max_size as usize];
        self.read_register(spec.address, &mut bytes)?;
        Ok(RegisterDump { spec, bytes })
    }

    /// Interrupt conditions currently driving the IRQ line low
    pub fn pending_irq(&mut self) -> Result<Irq, Error<SPI::Error>> {
        let [config, status] = self.get_array([&regs::CONFIG, &regs::STATUS])?;
        Ok(Irq::pending(config, status))
    }

    fn write_payload(&mut self, opcode: u8, payload: &[u8]) -> Result<Status, Error<SPI::Error>> {
        check_payload_length(payload.len())?;
        let mut scratch = [0; 1 + MAX_PAYLOAD_SIZE];
        let frame = &mut scratch[..=payload.len()];
        frame[0] = opcode;
        frame[1..].copy_from_slice(payload);
        self.transfer(frame)
    }

    fn command(&mut self, cmd: Command) -> Result<Status, Error<SPI::Error>> {
        let mut frame = [cmd.opcode(0)];
        self.transfer(&mut frame)
    }

    fn transfer(&mut self, frame: &mut [u8]) -> Result<Status, Error<SPI::Error>> {
        self.spi.transfer_in_place(frame).map_err(Error::Transfer)?;
        Ok(Status::new(frame[0]))
    }
}

fn check_payload_length<E>(len: usize) -> Result<(), Error<E>> {
    if (1..=MAX_PAYLOAD_SIZE).contains(&len) {
        Ok(())
    } else {
        Err(Error::InvalidPayloadLength(len))
    }
}
