//! Blocking on the IRQ line
//!
//! [`Nrf24::wait_for_irq_low`] blocks until an unmasked interrupt condition is
//! flagged in STATUS, or a timeout elapses.
//!
//! [`Nrf24::wait_for_irq_low_cancellable`] does the same while parked on a
//! caller supplied [`IrqLock`], so another thread holding the same lock can
//! end the wait early with [`IrqCanceller::cancel`]. The lock is shared with
//! the falling edge callback, which makes "edge seen" and "waiter parked"
//! race free. One lock can serve several radios.
//!
//! ```no_run
//! # fn demo<SPI, CE, IRQ>(mut radio: nrf24::Nrf24<SPI, CE, IRQ>)
//! # where
//! #     SPI: embedded_hal::spi::SpiDevice + Send + 'static,
//! #     CE: embedded_hal::digital::OutputPin + Send + 'static,
//! #     IRQ: nrf24::IrqLine + Send + 'static,
//! #     SPI::Error: Send,
//! # {
//! use std::time::Duration;
//! use nrf24::IrqLock;
//!
//! let lock = IrqLock::new(());
//! let canceller = radio.canceller();
//!
//! let waiter = std::thread::spawn({
//!     let lock = lock.clone();
//!     move || {
//!         let guard = lock.lock();
//!         let (_guard, outcome) =
//!             radio.wait_for_irq_low_cancellable(guard, Some(Duration::from_secs(5)));
//!         outcome
//!     }
//! });
//!
//! while !canceller.is_waiting() {
//!     std::thread::yield_now();
//! }
//! canceller.cancel(&lock.lock()).ok();
//! let outcome = waiter.join().unwrap();
//! # }
//! ```

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use embedded_hal::{digital, spi};

use crate::irq::{EdgeCallback, Irq, IrqLine};
use crate::{Error, Nrf24};

/// Wait coordinator misuse
#[derive(Copy, Clone, PartialEq, Eq, Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitError {
    #[error("a wait is already in progress on this radio")]
    AlreadyWaiting,
    #[error("no cancellable wait in progress")]
    NoActiveWait,
    #[error("the wait in progress is parked on another lock")]
    LockMismatch,
}

/// How a wait ended
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// At least one unmasked condition is flagged
    Satisfied(Irq),
    TimedOut,
    Cancelled,
}

struct LockShared<T> {
    mutex: Mutex<T>,
    condvar: Condvar,
}

/// Mutex and condition variable pair shared between waiters, cancellers
/// and IRQ callbacks
pub struct IrqLock<T> {
    shared: Arc<LockShared<T>>,
}

impl<T> IrqLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(LockShared {
                mutex: Mutex::new(value),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Acquire the lock. A poisoned lock is recovered, the data belongs to
    /// the caller.
    pub fn lock(&self) -> IrqGuard<'_, T> {
        IrqGuard {
            lock: self,
            inner: self
                .shared
                .mutex
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.shared) as *const () as usize
    }
}

impl<T> Clone for IrqLock<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Default> Default for IrqLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Held [`IrqLock`]
pub struct IrqGuard<'a, T> {
    lock: &'a IrqLock<T>,
    inner: MutexGuard<'a, T>,
}

impl<T> Deref for IrqGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for IrqGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

const IDLE: usize = 0;
const INTERNAL: usize = 1;

/// Per radio wait ticket.
///
/// Only ever changed while the lock of the current wait is held, so the
/// waiter, its callback and a canceller see a consistent state.
#[derive(Default)]
pub(crate) struct WaitSlot {
    /// `IDLE`, `INTERNAL` or the id of the caller's lock
    owner: AtomicUsize,
    /// Ticket of the wait in progress, 0 once it concluded
    active: AtomicU64,
    tickets: AtomicU64,
    cancelled: AtomicBool,
    generation: AtomicU64,
}

impl WaitSlot {
    fn claim(&self, owner: usize) -> Result<u64, WaitError> {
        self.owner
            .compare_exchange(IDLE, owner, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| WaitError::AlreadyWaiting)?;
        self.cancelled.store(false, Ordering::SeqCst);
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(ticket, Ordering::SeqCst);
        Ok(ticket)
    }

    fn conclude(&self) {
        self.active.store(0, Ordering::SeqCst);
    }

    fn release(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        self.owner.store(IDLE, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.active.load(Ordering::SeqCst) == ticket
    }

    fn notify(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancels a radio's cancellable wait from another thread
#[derive(Clone)]
pub struct IrqCanceller {
    slot: Arc<WaitSlot>,
}

impl IrqCanceller {
    pub(crate) fn new(slot: Arc<WaitSlot>) -> Self {
        Self { slot }
    }

    /// Ask the wait in progress to return [`WaitOutcome::Cancelled`].
    ///
    /// `guard` must come from the lock the waiter is parked on. Returns as
    /// soon as the waiter is notified, without waiting for it to leave.
    pub fn cancel<T>(&self, guard: &IrqGuard<'_, T>) -> Result<(), WaitError> {
        match self.slot.owner.load(Ordering::SeqCst) {
            IDLE | INTERNAL => Err(WaitError::NoActiveWait),
            owner if owner != guard.lock.id() => Err(WaitError::LockMismatch),
            _ => {
                log::debug!("cancelling IRQ wait");
                self.slot.cancelled.store(true, Ordering::SeqCst);
                self.slot.notify();
                guard.lock.shared.condvar.notify_all();
                Ok(())
            }
        }
    }

    /// A wait of any kind is in progress
    pub fn is_waiting(&self) -> bool {
        self.slot.owner.load(Ordering::SeqCst) != IDLE
    }
}

impl<SPI, CE, IRQ> Nrf24<SPI, CE, IRQ>
where
    SPI: spi::SpiDevice,
    CE: digital::OutputPin,
    IRQ: IrqLine,
{
    /// Block until an unmasked interrupt condition is flagged, or `timeout`
    /// elapses. `None` waits forever.
    ///
    /// This wait can't be cancelled.
    pub fn wait_for_irq_low(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome, Error<SPI::Error>> {
        log::trace!("wait_for_irq_low({:?})", timeout);
        let lock = IrqLock::new(());
        let guard = lock.lock();
        let (_guard, outcome) = self.wait_with(INTERNAL, guard, timeout);
        outcome
    }

    /// Like [`wait_for_irq_low`](Self::wait_for_irq_low), parked on the
    /// caller's lock so [`IrqCanceller::cancel`] can end it.
    ///
    /// The lock is released while parked and held again on return, in the
    /// manner of [`Condvar::wait_timeout`].
    pub fn wait_for_irq_low_cancellable<'a, T: Send + 'static>(
        &mut self,
        guard: IrqGuard<'a, T>,
        timeout: Option<Duration>,
    ) -> (IrqGuard<'a, T>, Result<WaitOutcome, Error<SPI::Error>>) {
        log::trace!("wait_for_irq_low_cancellable({:?})", timeout);
        let owner = guard.lock.id();
        self.wait_with(owner, guard, timeout)
    }

    fn wait_with<'a, T: Send + 'static>(
        &mut self,
        owner: usize,
        guard: IrqGuard<'a, T>,
        timeout: Option<Duration>,
    ) -> (IrqGuard<'a, T>, Result<WaitOutcome, Error<SPI::Error>>) {
        let ticket = match self.wait.claim(owner) {
            Ok(ticket) => ticket,
            Err(err) => return (guard, Err(err.into())),
        };
        log::debug!("waiting for IRQ, timeout {:?}", timeout);

        let (guard, result) = self.wait_parked(guard, ticket, timeout);

        self.wait.conclude();
        if let Err(err) = self.irq.clear_falling_edge_callback() {
            log::warn!("failed to clear IRQ callback: {:?}", err);
        }
        self.wait.release();

        match &result {
            Ok(outcome) => log::debug!("IRQ wait done: {:?}", outcome),
            Err(err) => log::debug!("IRQ wait failed: {:?}", err),
        }
        (guard, result)
    }

    fn wait_parked<'a, T: Send + 'static>(
        &mut self,
        guard: IrqGuard<'a, T>,
        ticket: u64,
        timeout: Option<Duration>,
    ) -> (IrqGuard<'a, T>, Result<WaitOutcome, Error<SPI::Error>>) {
        let IrqGuard { lock, mut inner } = guard;
        let poll = self.cfg.irq_poll_interval;

        let shared = lock.shared.clone();
        let slot = self.wait.clone();
        let callback: EdgeCallback = Box::new(move || {
            let _held = shared.mutex.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_current(ticket) {
                slot.notify();
                shared.condvar.notify_all();
            }
        });
        if let Err(err) = self.irq.set_falling_edge_callback(callback) {
            if poll.is_none() {
                return (IrqGuard { lock, inner }, Err(Error::Pin));
            }
            log::warn!("no IRQ callback ({:?}), polling STATUS", err);
        }

        // a deadline past what `Instant` can hold is no deadline
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let mut seen = None;
        let result = loop {
            let generation = self.wait.generation();
            if poll.is_some() || seen != Some(generation) {
                seen = Some(generation);
                match self.pending_irq() {
                    Ok(irq) if !irq.is_empty() => break Ok(WaitOutcome::Satisfied(irq)),
                    Ok(_) => {}
                    Err(err) => break Err(err),
                }
            } else {
                log::trace!("spurious IRQ wakeup");
            }

            if self.wait.is_cancelled() {
                break Ok(WaitOutcome::Cancelled);
            }

            let remaining = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => Some(remaining),
                    _ => break Ok(WaitOutcome::TimedOut),
                },
                None => None,
            };
            let step = match (remaining, poll) {
                (Some(remaining), Some(poll)) => Some(remaining.min(poll)),
                (remaining, poll) => remaining.or(poll),
            };
            inner = match step {
                Some(step) => lock
                    .shared
                    .condvar
                    .wait_timeout(inner, step)
                    .map(|(inner, _)| inner)
                    .unwrap_or_else(|err| err.into_inner().0),
                None => lock
                    .shared
                    .condvar
                    .wait(inner)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        };
        (IrqGuard { lock, inner }, result)
    }
}
