//! Power banks: the sample resource, lent from a growing pool or a fixed box

use std::fmt;

use parking_lot::Mutex;

use crate::config::PoolConfiguration;
use crate::errors::PoolResult;
use crate::pool::{KeyedObjectPool, ObjectPool};
use crate::serial::SerialCounter;

/// A rechargeable power bank
///
/// The current user sits behind a lock so a shared loan handle can record
/// who is holding it.
#[derive(Debug)]
pub struct PowerBank {
    serial_number: u64,
    charge: u8,
    user: Mutex<String>,
}

impl PowerBank {
    pub fn new(serial_number: u64, charge: u8) -> Self {
        Self {
            serial_number,
            charge: charge.min(100),
            user: Mutex::new(String::new()),
        }
    }

    pub fn serial_number(&self) -> u64 {
        self.serial_number
    }

    /// Charge level in percent
    pub fn charge(&self) -> u8 {
        self.charge
    }

    pub fn set_user(&self, user: impl Into<String>) {
        *self.user.lock() = user.into();
    }

    pub fn user(&self) -> String {
        self.user.lock().clone()
    }
}

impl fmt::Display for PowerBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "serial: {:03}  charge: {}%  user: {}",
            self.serial_number,
            self.charge,
            self.user.lock()
        )
    }
}

/// Growing pool of fully charged power banks.
///
/// Every bank takes the next serial from `counter`; pass
/// [`SerialCounter::global`] to share numbering across the process.
///
/// # Examples
///
/// ```
/// use loanpool::{PoolConfiguration, SerialCounter, power_bank_pool};
/// use std::sync::Arc;
///
/// let config = PoolConfiguration::new().with_initial_size(2).with_max_size(3);
/// let pool = power_bank_pool(config, Arc::new(SerialCounter::new())).unwrap();
///
/// let bank = pool.borrow_object().unwrap();
/// bank.set_user("Tony");
/// assert_eq!(bank.to_string(), "serial: 001  charge: 100%  user: Tony");
/// ```
pub fn power_bank_pool<C>(config: PoolConfiguration, counter: C) -> PoolResult<ObjectPool<PowerBank>>
where
    C: AsRef<SerialCounter> + Send + Sync + 'static,
{
    ObjectPool::new(
        move || PowerBank::new(counter.as_ref().next_serial(), 100),
        config,
    )
}

/// Keys of the two slots in [`power_bank_box`]
pub const BOX_SLOTS: [&str; 2] = ["0001", "0002"];

/// Fixed box holding two power banks addressed by slot key
///
/// # Examples
///
/// ```
/// use loanpool::{PoolConfiguration, power_bank_box};
///
/// let bank_box = power_bank_box(PoolConfiguration::new()).unwrap();
/// let bank = bank_box.borrow_object(&"0002".to_string()).unwrap();
/// assert_eq!(bank.serial_number(), 2);
/// ```
pub fn power_bank_box(config: PoolConfiguration) -> PoolResult<KeyedObjectPool<String, PowerBank>> {
    let banks = BOX_SLOTS.iter().enumerate().map(|(idx, slot)| {
        (slot.to_string(), PowerBank::new(idx as u64 + 1, 100))
    });
    KeyedObjectPool::new(banks, config)
}
