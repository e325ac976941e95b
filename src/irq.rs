use bitflags::bitflags;

bitflags! {
    /// Interrupt conditions, laid out as in the STATUS and CONFIG registers
    #[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
    pub struct Irq: u8 {
        const RX_DR = (1 << 6);
        const TX_DS = (1 << 5);
        const MAX_RT = (1 << 4);
    }
}

impl Irq {
    /// Conditions currently driving the IRQ line: flagged in STATUS and not
    /// masked in CONFIG
    pub fn pending(config: u8, status: u8) -> Self {
        Self::from_bits_truncate(status & !config)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Irq {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Irq {{ 0b{0=0..8:08b} }}", self.bits())
    }
}

/// Falling edge callback installed on an [`IrqLine`]
pub type EdgeCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Interrupt line of the radio
///
/// The callback runs on whatever thread the implementation delivers edges
/// on. [`clear_falling_edge_callback`](IrqLine::clear_falling_edge_callback)
/// must return without waiting for a callback that is already running.
pub trait IrqLine {
    type Error: core::fmt::Debug;

    fn set_falling_edge_callback(&mut self, callback: EdgeCallback) -> Result<(), Self::Error>;

    fn clear_falling_edge_callback(&mut self) -> Result<(), Self::Error>;
}

/// Placeholder for boards without a wired IRQ line
///
/// Waiting on it fails unless [`Config::irq_poll_interval`](crate::Config)
/// is set, in which case the waiter polls STATUS instead.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoIrq;

/// Edge callbacks are not available on [`NoIrq`]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unsupported;

impl IrqLine for NoIrq {
    type Error = Unsupported;

    fn set_falling_edge_callback(&mut self, _callback: EdgeCallback) -> Result<(), Self::Error> {
        Err(Unsupported)
    }

    fn clear_falling_edge_callback(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
