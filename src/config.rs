use core::time::Duration;

/// Configuration parameters
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Config {
    /// Also wake a waiting thread at this interval and re-read STATUS.
    ///
    /// Needed when the IRQ line can't deliver edge callbacks, e.g. with
    /// [`NoIrq`](crate::irq::NoIrq). `None` waits on edges only.
    pub irq_poll_interval: Option<Duration>,
}

impl Config {
    pub fn with_irq_poll_interval(mut self, interval: Duration) -> Self {
        self.irq_poll_interval = Some(interval);
        self
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Config {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Config {{ irq_poll_interval_us: {} }}",
            self.irq_poll_interval.map(|d| d.as_micros() as u64)
        )
    }
}
