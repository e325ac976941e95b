//! Register and field model
//!
//! The nRF24L01+ control space is described by two kinds of static
//! descriptors:
//!
//! - [`RegisterSpec`]: an addressable register, 1 byte or 3-5 bytes long
//! - [`FieldSpec`]: a named, contiguous group of bits inside a 1 byte register
//!
//! The complete register map lives in [`regs`] and the named fields in
//! [`fields`]. Both are plain `static` items, so they can be shared between
//! threads freely.
//!
//! Writes are described by value objects that are validated when they are
//! built, before anything touches the bus:
//!
//! - [`FieldValue`]: a field bound to a value that fits its width
//! - [`FieldValueSet`]: several field values targeting the same register
//! - [`RegisterValue`]: a whole register bound to its raw bytes
//!
//! ```
//! use nrf24::fields::{PRIM_RX, PWR_UP};
//!
//! let set = PWR_UP.value(1)?.and(PRIM_RX.value(1)?)?;
//! assert_eq!(set.mask(), 0b0000_0011);
//! assert_eq!(set.value(), 0b0000_0011);
//! # Ok::<(), nrf24::ValueError>(())
//! ```

use core::fmt;

use thiserror::Error;

pub mod fields;
pub mod regs;

/// Largest register, in bytes (RX_ADDR_P0, RX_ADDR_P1 and TX_ADDR).
pub const MAX_REGISTER_SIZE: usize = 5;

/// Field access capability
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Reason a field value could not join a [`FieldValueSet`] or a write batch
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Conflict {
    /// The field lives in another register than the rest of the set
    DifferentRegister { field: &'static str, expected: u8 },
    /// The field, or one overlapping its bits, is already in the set
    Overlap { field: &'static str },
    /// A register is written as a whole and through its fields in one batch
    RegisterAndFields { address: u8 },
    /// A whole register appears twice in one batch
    DuplicateRegister { address: u8 },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DifferentRegister { field, expected } => write!(
                f,
                "field {} is not in register 0x{:02X}",
                field, expected
            ),
            Self::Overlap { field } => write!(f, "field {} overlaps the set", field),
            Self::RegisterAndFields { address } => write!(
                f,
                "register 0x{:02X} written both whole and by field",
                address
            ),
            Self::DuplicateRegister { address } => {
                write!(f, "register 0x{:02X} written twice", address)
            }
        }
    }
}

/// Validation errors raised by the model, always before any bus transaction
#[derive(Copy, Clone, PartialEq, Eq, Debug, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueError {
    #[error("value {value} out of range for field {field} (max {max})")]
    Range {
        field: &'static str,
        value: u8,
        max: u8,
    },
    #[error("field {field} can't be written")]
    WriteNotPermitted { field: &'static str },
    #[error("conflicting write: {0}")]
    Conflict(Conflict),
    #[error("invalid register address 0x{address:02X} or size {size}")]
    InvalidAddressOrSize { address: u8, size: usize },
}

/// Static description of a bit field inside a 1 byte register
#[derive(Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Address of the owning register
    pub register: u8,
    pub name: &'static str,
    /// Lowest bit of the field, bit 0 is the LSB
    pub start_bit: u8,
    /// Width in bits, `start_bit + width <= 8`
    pub width: u8,
    pub reset_value: u8,
    pub access: Access,
    pub description: &'static str,
}

impl FieldSpec {
    pub(crate) const fn reserved(register: u8, start_bit: u8, width: u8) -> Self {
        Self {
            register,
            name: "Reserved",
            start_bit,
            width,
            reset_value: 0,
            access: Access::ReadWrite,
            description: "Only zeros allowed",
        }
    }

    /// Mask of the field, not shifted into position
    pub const fn unshifted_mask(&self) -> u8 {
        u8::MAX >> (8 - self.width)
    }

    /// Mask of the field within its register byte
    pub const fn mask(&self) -> u8 {
        self.unshifted_mask() << self.start_bit
    }

    /// Largest value the field can hold
    pub const fn max_value(&self) -> u8 {
        self.unshifted_mask()
    }

    /// Extract this field from a raw register byte
    pub const fn extract(&self, byte: u8) -> u8 {
        (byte >> self.start_bit) & self.unshifted_mask()
    }

    /// Reserved and obsolete bits: part of the layout, never written by field
    pub fn is_placeholder(&self) -> bool {
        matches!(self.name, "Reserved" | "Obsolete")
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite && !self.is_placeholder()
    }

    /// Highest bit of the field
    pub const fn end_bit(&self) -> u8 {
        self.start_bit + self.width - 1
    }

    /// Bind a value to this field
    pub fn value(&'static self, value: u8) -> Result<FieldValue, ValueError> {
        if !self.is_writable() {
            return Err(ValueError::WriteNotPermitted { field: self.name });
        }
        if value > self.max_value() {
            return Err(ValueError::Range {
                field: self.name,
                value,
                max: self.max_value(),
            });
        }
        Ok(FieldValue { spec: self, value })
    }
}

/// Static description of a register
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterSpec {
    pub name: &'static str,
    pub address: u8,
    pub min_size: u8,
    pub max_size: u8,
    /// Field layout, empty for the multi-byte address registers
    pub fields: &'static [&'static FieldSpec],
    pub description: &'static str,
}

impl RegisterSpec {
    pub const fn is_single_byte(&self) -> bool {
        self.min_size == 1 && self.max_size == 1
    }

    /// Look up a field of this register by name
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().copied().find(|f| f.name == name)
    }

    /// Fields that carry meaning, i.e. everything except placeholders
    pub fn named_fields(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        self.fields.iter().copied().filter(|f| !f.is_placeholder())
    }

    pub fn accepts_size(&self, size: usize) -> bool {
        (self.min_size as usize..=self.max_size as usize).contains(&size)
    }

    /// Bind raw bytes to this register
    pub fn value(&'static self, bytes: &[u8]) -> Result<RegisterValue, ValueError> {
        if !self.accepts_size(bytes.len()) {
            return Err(ValueError::InvalidAddressOrSize {
                address: self.address,
                size: bytes.len(),
            });
        }
        let mut raw = [0; MAX_REGISTER_SIZE];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(RegisterValue {
            spec: self,
            raw,
            len: bytes.len() as u8,
        })
    }

    /// Bind a single byte to a 1 byte register
    pub fn byte(&'static self, value: u8) -> Result<RegisterValue, ValueError> {
        self.value(&[value])
    }
}

/// Check that `address` is a legal register and `size` fits it
pub fn check_address_and_size(
    address: u8,
    size: usize,
) -> Result<&'static RegisterSpec, ValueError> {
    regs::by_address(address)
        .filter(|spec| spec.accepts_size(size))
        .ok_or(ValueError::InvalidAddressOrSize { address, size })
}

/// A writable field bound to a value within its range
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FieldValue {
    spec: &'static FieldSpec,
    value: u8,
}

impl FieldValue {
    pub fn spec(&self) -> &'static FieldSpec {
        self.spec
    }

    pub fn get(&self) -> u8 {
        self.value
    }

    /// Value shifted into position within the register byte
    pub fn shifted(&self) -> u8 {
        self.value << self.spec.start_bit
    }

    /// Combine with another field of the same register
    pub fn and(self, other: FieldValue) -> Result<FieldValueSet, ValueError> {
        FieldValueSet::from(self).and(other)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.spec.name, self.value)
    }
}

/// Field values for a single register, with disjoint masks
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct FieldValueSet {
    members: Vec<FieldValue>,
    mask: u8,
    value: u8,
}

impl FieldValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self, fv: &FieldValue, mask: u8) -> Result<(), ValueError> {
        let spec = fv.spec;
        if let Some(address) = self.address() {
            if spec.register != address {
                return Err(ValueError::Conflict(Conflict::DifferentRegister {
                    field: spec.name,
                    expected: address,
                }));
            }
        }
        let named_twice = self.members.iter().any(|m| m.spec.name == spec.name);
        if named_twice || mask & spec.mask() != 0 {
            return Err(ValueError::Conflict(Conflict::Overlap { field: spec.name }));
        }
        Ok(())
    }

    /// Insert a field value
    pub fn add(&mut self, fv: FieldValue) -> Result<(), ValueError> {
        self.check(&fv, self.mask)?;
        self.mask |= fv.spec.mask();
        self.value |= fv.shifted();
        self.members.push(fv);
        Ok(())
    }

    /// Insert every member of `other`. Either all members join or none does.
    pub fn merge(&mut self, other: &FieldValueSet) -> Result<(), ValueError> {
        let mut probe = self.clone();
        for fv in &other.members {
            probe.add(*fv)?;
        }
        *self = probe;
        Ok(())
    }

    /// Builder form of [`add`](Self::add)
    pub fn and(mut self, fv: FieldValue) -> Result<Self, ValueError> {
        self.add(fv)?;
        Ok(self)
    }

    /// Target register, `None` while empty
    pub fn address(&self) -> Option<u8> {
        self.members.first().map(|fv| fv.spec.register)
    }

    /// OR of the member masks
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// OR of the shifted member values, always within [`mask`](Self::mask)
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Byte to write given the register's current content
    pub fn apply(&self, current: u8) -> u8 {
        (current & !self.mask) | self.value
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.members.iter()
    }
}

impl From<FieldValue> for FieldValueSet {
    fn from(fv: FieldValue) -> Self {
        Self {
            members: vec![fv],
            mask: fv.spec.mask(),
            value: fv.shifted(),
        }
    }
}

impl fmt::Display for FieldValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fv) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", fv)?;
        }
        Ok(())
    }
}

/// A whole register bound to its raw content
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RegisterValue {
    spec: &'static RegisterSpec,
    raw: [u8; MAX_REGISTER_SIZE],
    len: u8,
}

impl RegisterValue {
    pub fn spec(&self) -> &'static RegisterSpec {
        self.spec
    }

    pub fn bytes(&self) -> &[u8] {
        &self.raw[..self.len as usize]
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:02X?})", self.spec.name, self.bytes())
    }
}

/// Something [`Nrf24::get`](crate::Nrf24::get) can read
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Request {
    /// A whole 1 byte register
    Register(&'static RegisterSpec),
    Field(&'static FieldSpec),
}

impl Request {
    pub fn address(&self) -> u8 {
        match self {
            Self::Register(spec) => spec.address,
            Self::Field(spec) => spec.register,
        }
    }

    /// Project the request out of its register byte
    pub fn project(&self, byte: u8) -> u8 {
        match self {
            Self::Register(_) => byte,
            Self::Field(spec) => spec.extract(byte),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(spec) => f.write_str(spec.name),
            Self::Field(spec) => f.write_str(spec.name),
        }
    }
}

impl From<&'static RegisterSpec> for Request {
    fn from(spec: &'static RegisterSpec) -> Self {
        Self::Register(spec)
    }
}

impl From<&'static FieldSpec> for Request {
    fn from(spec: &'static FieldSpec) -> Self {
        Self::Field(spec)
    }
}

/// Something [`Nrf24::set`](crate::Nrf24::set) can write
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Write {
    Register(RegisterValue),
    Fields(FieldValueSet),
}

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(value) => value.fmt(f),
            Self::Fields(set) => set.fmt(f),
        }
    }
}

impl From<RegisterValue> for Write {
    fn from(value: RegisterValue) -> Self {
        Self::Register(value)
    }
}

impl From<FieldValue> for Write {
    fn from(value: FieldValue) -> Self {
        Self::Fields(value.into())
    }
}

impl From<FieldValueSet> for Write {
    fn from(value: FieldValueSet) -> Self {
        Self::Fields(value)
    }
}
