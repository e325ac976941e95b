//! Named fields of the nRF24L01+ registers
//!
//! Bit layouts, reset values and access rights follow the nRF24L01+ Product
//! Specification v1.0, chapter 9.

use super::regs::addr;
use super::{Access, FieldSpec};
use Access::{ReadOnly, ReadWrite};

const fn field(
    register: u8,
    name: &'static str,
    start_bit: u8,
    width: u8,
    reset_value: u8,
    access: Access,
    description: &'static str,
) -> FieldSpec {
    FieldSpec {
        register,
        name,
        start_bit,
        width,
        reset_value,
        access,
        description,
    }
}

// CONFIG

pub static MASK_RX_DR: FieldSpec = field(
    addr::CONFIG,
    "MASK_RX_DR",
    6,
    1,
    0,
    ReadWrite,
    "Mask interrupt caused by RX_DR. 1: not reflected on the IRQ pin",
);
pub static MASK_TX_DS: FieldSpec = field(
    addr::CONFIG,
    "MASK_TX_DS",
    5,
    1,
    0,
    ReadWrite,
    "Mask interrupt caused by TX_DS. 1: not reflected on the IRQ pin",
);
pub static MASK_MAX_RT: FieldSpec = field(
    addr::CONFIG,
    "MASK_MAX_RT",
    4,
    1,
    0,
    ReadWrite,
    "Mask interrupt caused by MAX_RT. 1: not reflected on the IRQ pin",
);
pub static EN_CRC: FieldSpec = field(
    addr::CONFIG,
    "EN_CRC",
    3,
    1,
    1,
    ReadWrite,
    "Enable CRC. Forced high if one of the bits in EN_AA is high",
);
pub static CRCO: FieldSpec = field(
    addr::CONFIG,
    "CRCO",
    2,
    1,
    0,
    ReadWrite,
    "CRC encoding scheme. 0: 1 byte, 1: 2 bytes",
);
pub static PWR_UP: FieldSpec = field(
    addr::CONFIG,
    "PWR_UP",
    1,
    1,
    0,
    ReadWrite,
    "1: power up, 0: power down",
);
pub static PRIM_RX: FieldSpec = field(
    addr::CONFIG,
    "PRIM_RX",
    0,
    1,
    0,
    ReadWrite,
    "RX/TX control. 1: PRX, 0: PTX",
);

// EN_AA

pub static ENAA_P5: FieldSpec = field(
    addr::EN_AA,
    "ENAA_P5",
    5,
    1,
    1,
    ReadWrite,
    "Enable auto acknowledgement data pipe 5",
);
pub static ENAA_P4: FieldSpec = field(
    addr::EN_AA,
    "ENAA_P4",
    4,
    1,
    1,
    ReadWrite,
    "Enable auto acknowledgement data pipe 4",
);
pub static ENAA_P3: FieldSpec = field(
    addr::EN_AA,
    "ENAA_P3",
    3,
    1,
    1,
    ReadWrite,
    "Enable auto acknowledgement data pipe 3",
);
pub static ENAA_P2: FieldSpec = field(
    addr::EN_AA,
    "ENAA_P2",
    2,
    1,
    1,
    ReadWrite,
    "Enable auto acknowledgement data pipe 2",
);
pub static ENAA_P1: FieldSpec = field(
    addr::EN_AA,
    "ENAA_P1",
    1,
    1,
    1,
    ReadWrite,
    "Enable auto acknowledgement data pipe 1",
);
pub static ENAA_P0: FieldSpec = field(
    addr::EN_AA,
    "ENAA_P0",
    0,
    1,
    1,
    ReadWrite,
    "Enable auto acknowledgement data pipe 0",
);

// EN_RXADDR

pub static ERX_P5: FieldSpec = field(
    addr::EN_RXADDR,
    "ERX_P5",
    5,
    1,
    0,
    ReadWrite,
    "Enable data pipe 5",
);
pub static ERX_P4: FieldSpec = field(
    addr::EN_RXADDR,
    "ERX_P4",
    4,
    1,
    0,
    ReadWrite,
    "Enable data pipe 4",
);
pub static ERX_P3: FieldSpec = field(
    addr::EN_RXADDR,
    "ERX_P3",
    3,
    1,
    0,
    ReadWrite,
    "Enable data pipe 3",
);
pub static ERX_P2: FieldSpec = field(
    addr::EN_RXADDR,
    "ERX_P2",
    2,
    1,
    0,
    ReadWrite,
    "Enable data pipe 2",
);
pub static ERX_P1: FieldSpec = field(
    addr::EN_RXADDR,
    "ERX_P1",
    1,
    1,
    1,
    ReadWrite,
    "Enable data pipe 1",
);
pub static ERX_P0: FieldSpec = field(
    addr::EN_RXADDR,
    "ERX_P0",
    0,
    1,
    1,
    ReadWrite,
    "Enable data pipe 0",
);

// SETUP_AW

pub static AW: FieldSpec = field(
    addr::SETUP_AW,
    "AW",
    0,
    2,
    0b11,
    ReadWrite,
    "RX/TX address width. 01: 3 bytes, 10: 4 bytes, 11: 5 bytes",
);

// SETUP_RETR

pub static ARD: FieldSpec = field(
    addr::SETUP_RETR,
    "ARD",
    4,
    4,
    0,
    ReadWrite,
    "Auto retransmit delay, (n + 1) * 250us",
);
pub static ARC: FieldSpec = field(
    addr::SETUP_RETR,
    "ARC",
    0,
    4,
    0b0011,
    ReadWrite,
    "Auto retransmit count, 0 disables retransmit",
);

// RF_CH

pub static RF_CH: FieldSpec = field(
    addr::RF_CH,
    "RF_CH",
    0,
    7,
    0b000_0010,
    ReadWrite,
    "Frequency channel the chip operates on",
);

// RF_SETUP

pub static CONT_WAVE: FieldSpec = field(
    addr::RF_SETUP,
    "CONT_WAVE",
    7,
    1,
    0,
    ReadWrite,
    "Enables continuous carrier transmit when high",
);
pub static RF_DR_LOW: FieldSpec = field(
    addr::RF_SETUP,
    "RF_DR_LOW",
    5,
    1,
    0,
    ReadWrite,
    "Set RF data rate to 250kbps",
);
pub static PLL_LOCK: FieldSpec = field(
    addr::RF_SETUP,
    "PLL_LOCK",
    4,
    1,
    0,
    ReadWrite,
    "Force PLL lock signal. Only used in test",
);
pub static RF_DR_HIGH: FieldSpec = field(
    addr::RF_SETUP,
    "RF_DR_HIGH",
    3,
    1,
    1,
    ReadWrite,
    "Select between the high speed data rates. 0: 1Mbps, 1: 2Mbps",
);
pub static RF_PWR: FieldSpec = field(
    addr::RF_SETUP,
    "RF_PWR",
    1,
    2,
    0b11,
    ReadWrite,
    "RF output power in TX mode. 00: -18dBm .. 11: 0dBm",
);

// STATUS

pub static RX_DR: FieldSpec = field(
    addr::STATUS,
    "RX_DR",
    6,
    1,
    0,
    ReadWrite,
    "Data ready RX FIFO interrupt. Write 1 to clear",
);
pub static TX_DS: FieldSpec = field(
    addr::STATUS,
    "TX_DS",
    5,
    1,
    0,
    ReadWrite,
    "Data sent TX FIFO interrupt. Write 1 to clear",
);
pub static MAX_RT: FieldSpec = field(
    addr::STATUS,
    "MAX_RT",
    4,
    1,
    0,
    ReadWrite,
    "Maximum number of TX retransmits interrupt. Write 1 to clear",
);
pub static RX_P_NO: FieldSpec = field(
    addr::STATUS,
    "RX_P_NO",
    1,
    3,
    0b111,
    ReadOnly,
    "Data pipe number of the payload at the head of the RX FIFO. 111: empty",
);
pub static TX_FULL: FieldSpec = field(
    addr::STATUS,
    "TX_FULL",
    0,
    1,
    0,
    ReadOnly,
    "TX FIFO full flag",
);

// OBSERVE_TX

pub static PLOS_CNT: FieldSpec = field(
    addr::OBSERVE_TX,
    "PLOS_CNT",
    4,
    4,
    0,
    ReadOnly,
    "Count lost packets, reset by writing RF_CH",
);
pub static ARC_CNT: FieldSpec = field(
    addr::OBSERVE_TX,
    "ARC_CNT",
    0,
    4,
    0,
    ReadOnly,
    "Count retransmitted packets, reset when a new packet starts",
);

// RPD

pub static RPD: FieldSpec = field(
    addr::RPD,
    "RPD",
    0,
    1,
    0,
    ReadOnly,
    "Received power detector",
);

// RX_ADDR_P2..P5, LSByte only, MSBytes equal to RX_ADDR_P1[39:8]

pub static RX_ADDR_P2: FieldSpec = field(
    addr::RX_ADDR_P2,
    "RX_ADDR_P2",
    0,
    8,
    0xC3,
    ReadWrite,
    "Receive address data pipe 2, LSByte",
);
pub static RX_ADDR_P3: FieldSpec = field(
    addr::RX_ADDR_P3,
    "RX_ADDR_P3",
    0,
    8,
    0xC4,
    ReadWrite,
    "Receive address data pipe 3, LSByte",
);
pub static RX_ADDR_P4: FieldSpec = field(
    addr::RX_ADDR_P4,
    "RX_ADDR_P4",
    0,
    8,
    0xC5,
    ReadWrite,
    "Receive address data pipe 4, LSByte",
);
pub static RX_ADDR_P5: FieldSpec = field(
    addr::RX_ADDR_P5,
    "RX_ADDR_P5",
    0,
    8,
    0xC6,
    ReadWrite,
    "Receive address data pipe 5, LSByte",
);

// RX_PW_P0..P5

pub static RX_PW_P0: FieldSpec = field(
    addr::RX_PW_P0,
    "RX_PW_P0",
    0,
    6,
    0,
    ReadWrite,
    "RX payload width pipe 0, 0: pipe not used",
);
pub static RX_PW_P1: FieldSpec = field(
    addr::RX_PW_P1,
    "RX_PW_P1",
    0,
    6,
    0,
    ReadWrite,
    "RX payload width pipe 1, 0: pipe not used",
);
pub static RX_PW_P2: FieldSpec = field(
    addr::RX_PW_P2,
    "RX_PW_P2",
    0,
    6,
    0,
    ReadWrite,
    "RX payload width pipe 2, 0: pipe not used",
);
pub static RX_PW_P3: FieldSpec = field(
    addr::RX_PW_P3,
    "RX_PW_P3",
    0,
    6,
    0,
    ReadWrite,
    "RX payload width pipe 3, 0: pipe not used",
);
pub static RX_PW_P4: FieldSpec = field(
    addr::RX_PW_P4,
    "RX_PW_P4",
    0,
    6,
    0,
    ReadWrite,
    "RX payload width pipe 4, 0: pipe not used",
);
pub static RX_PW_P5: FieldSpec = field(
    addr::RX_PW_P5,
    "RX_PW_P5",
    0,
    6,
    0,
    ReadWrite,
    "RX payload width pipe 5, 0: pipe not used",
);

// FIFO_STATUS

pub static TX_REUSE: FieldSpec = field(
    addr::FIFO_STATUS,
    "TX_REUSE",
    6,
    1,
    0,
    ReadOnly,
    "Set by REUSE_TX_PL, reset by W_TX_PAYLOAD or FLUSH_TX",
);
/// TX_FULL as mirrored in FIFO_STATUS
pub static FIFO_TX_FULL: FieldSpec = field(
    addr::FIFO_STATUS,
    "TX_FULL",
    5,
    1,
    0,
    ReadOnly,
    "TX FIFO full flag",
);
pub static TX_EMPTY: FieldSpec = field(
    addr::FIFO_STATUS,
    "TX_EMPTY",
    4,
    1,
    1,
    ReadOnly,
    "TX FIFO empty flag",
);
pub static RX_FULL: FieldSpec = field(
    addr::FIFO_STATUS,
    "RX_FULL",
    1,
    1,
    0,
    ReadOnly,
    "RX FIFO full flag",
);
pub static RX_EMPTY: FieldSpec = field(
    addr::FIFO_STATUS,
    "RX_EMPTY",
    0,
    1,
    1,
    ReadOnly,
    "RX FIFO empty flag",
);

// DYNPD

pub static DPL_P5: FieldSpec = field(
    addr::DYNPD,
    "DPL_P5",
    5,
    1,
    0,
    ReadWrite,
    "Dynamic payload length pipe 5",
);
pub static DPL_P4: FieldSpec = field(
    addr::DYNPD,
    "DPL_P4",
    4,
    1,
    0,
    ReadWrite,
    "Dynamic payload length pipe 4",
);
pub static DPL_P3: FieldSpec = field(
    addr::DYNPD,
    "DPL_P3",
    3,
    1,
    0,
    ReadWrite,
    "Dynamic payload length pipe 3",
);
pub static DPL_P2: FieldSpec = field(
    addr::DYNPD,
    "DPL_P2",
    2,
    1,
    0,
    ReadWrite,
    "Dynamic payload length pipe 2",
);
pub static DPL_P1: FieldSpec = field(
    addr::DYNPD,
    "DPL_P1",
    1,
    1,
    0,
    ReadWrite,
    "Dynamic payload length pipe 1",
);
pub static DPL_P0: FieldSpec = field(
    addr::DYNPD,
    "DPL_P0",
    0,
    1,
    0,
    ReadWrite,
    "Dynamic payload length pipe 0",
);

// FEATURE

pub static EN_DPL: FieldSpec = field(
    addr::FEATURE,
    "EN_DPL",
    2,
    1,
    0,
    ReadWrite,
    "Enables dynamic payload length",
);
pub static EN_ACK_PAY: FieldSpec = field(
    addr::FEATURE,
    "EN_ACK_PAY",
    1,
    1,
    0,
    ReadWrite,
    "Enables payload with ACK",
);
pub static EN_DYN_ACK: FieldSpec = field(
    addr::FEATURE,
    "EN_DYN_ACK",
    0,
    1,
    0,
    ReadWrite,
    "Enables the W_TX_PAYLOAD_NOACK command",
);

/// Status bits cleared by writing 1
pub static WRITE_ONE_TO_CLEAR: [&FieldSpec; 3] = [&RX_DR, &TX_DS, &MAX_RT];

/// Bits of register `address` that a read-modify-write must not write back
pub fn write_one_to_clear_mask(address: u8) -> u8 {
    WRITE_ONE_TO_CLEAR
        .iter()
        .filter(|field| field.register == address)
        .fold(0, |mask, field| mask | field.mask())
}
