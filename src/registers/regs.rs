//! nRF24L01+ register map

use super::fields::*;
use super::{Access, FieldSpec, RegisterSpec};

/// Register addresses
pub mod addr {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const OBSERVE_TX: u8 = 0x08;
    pub const RPD: u8 = 0x09;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const RX_ADDR_P1: u8 = 0x0B;
    pub const RX_ADDR_P2: u8 = 0x0C;
    pub const RX_ADDR_P3: u8 = 0x0D;
    pub const RX_ADDR_P4: u8 = 0x0E;
    pub const RX_ADDR_P5: u8 = 0x0F;
    pub const TX_ADDR: u8 = 0x10;
    pub const RX_PW_P0: u8 = 0x11;
    pub const RX_PW_P1: u8 = 0x12;
    pub const RX_PW_P2: u8 = 0x13;
    pub const RX_PW_P3: u8 = 0x14;
    pub const RX_PW_P4: u8 = 0x15;
    pub const RX_PW_P5: u8 = 0x16;
    pub const FIFO_STATUS: u8 = 0x17;
    pub const DYNPD: u8 = 0x1C;
    pub const FEATURE: u8 = 0x1D;

    /// Highest legal register address
    pub const LAST: u8 = FEATURE;
}

const CONFIG_RESERVED: FieldSpec = FieldSpec::reserved(addr::CONFIG, 7, 1);
const EN_AA_RESERVED: FieldSpec = FieldSpec::reserved(addr::EN_AA, 6, 2);
const EN_RXADDR_RESERVED: FieldSpec = FieldSpec::reserved(addr::EN_RXADDR, 6, 2);
const SETUP_AW_RESERVED: FieldSpec = FieldSpec::reserved(addr::SETUP_AW, 2, 6);
const RF_CH_RESERVED: FieldSpec = FieldSpec::reserved(addr::RF_CH, 7, 1);
const RF_SETUP_RESERVED: FieldSpec = FieldSpec::reserved(addr::RF_SETUP, 6, 1);
const RF_SETUP_OBSOLETE: FieldSpec = FieldSpec {
    name: "Obsolete",
    description: "Don't care",
    ..FieldSpec::reserved(addr::RF_SETUP, 0, 1)
};
const STATUS_RESERVED: FieldSpec = FieldSpec::reserved(addr::STATUS, 7, 1);
const RPD_RESERVED: FieldSpec = FieldSpec {
    access: Access::ReadOnly,
    ..FieldSpec::reserved(addr::RPD, 1, 7)
};
const RX_PW_P0_RESERVED: FieldSpec = FieldSpec::reserved(addr::RX_PW_P0, 6, 2);
const RX_PW_P1_RESERVED: FieldSpec = FieldSpec::reserved(addr::RX_PW_P1, 6, 2);
const RX_PW_P2_RESERVED: FieldSpec = FieldSpec::reserved(addr::RX_PW_P2, 6, 2);
const RX_PW_P3_RESERVED: FieldSpec = FieldSpec::reserved(addr::RX_PW_P3, 6, 2);
const RX_PW_P4_RESERVED: FieldSpec = FieldSpec::reserved(addr::RX_PW_P4, 6, 2);
const RX_PW_P5_RESERVED: FieldSpec = FieldSpec::reserved(addr::RX_PW_P5, 6, 2);
const FIFO_STATUS_RESERVED_HIGH: FieldSpec = FieldSpec::reserved(addr::FIFO_STATUS, 7, 1);
const FIFO_STATUS_RESERVED_LOW: FieldSpec = FieldSpec::reserved(addr::FIFO_STATUS, 2, 2);
const DYNPD_RESERVED: FieldSpec = FieldSpec::reserved(addr::DYNPD, 6, 2);
const FEATURE_RESERVED: FieldSpec = FieldSpec::reserved(addr::FEATURE, 3, 5);

const SINGLE_BYTE: RegisterSpec = RegisterSpec {
    name: "",
    address: 0,
    min_size: 1,
    max_size: 1,
    fields: &[],
    description: "",
};

const fn address(name: &'static str, address: u8, description: &'static str) -> RegisterSpec {
    RegisterSpec {
        name,
        address,
        min_size: 3,
        max_size: 5,
        fields: &[],
        description,
    }
}

pub static CONFIG: RegisterSpec = RegisterSpec {
    name: "CONFIG",
    address: addr::CONFIG,
    fields: &[
        &CONFIG_RESERVED,
        &MASK_RX_DR,
        &MASK_TX_DS,
        &MASK_MAX_RT,
        &EN_CRC,
        &CRCO,
        &PWR_UP,
        &PRIM_RX,
    ],
    description: "Configuration register",
    ..SINGLE_BYTE
};

pub static EN_AA: RegisterSpec = RegisterSpec {
    name: "EN_AA",
    address: addr::EN_AA,
    fields: &[
        &EN_AA_RESERVED,
        &ENAA_P5,
        &ENAA_P4,
        &ENAA_P3,
        &ENAA_P2,
        &ENAA_P1,
        &ENAA_P0,
    ],
    description: "Enable auto acknowledgement",
    ..SINGLE_BYTE
};

pub static EN_RXADDR: RegisterSpec = RegisterSpec {
    name: "EN_RXADDR",
    address: addr::EN_RXADDR,
    fields: &[
        &EN_RXADDR_RESERVED,
        &ERX_P5,
        &ERX_P4,
        &ERX_P3,
        &ERX_P2,
        &ERX_P1,
        &ERX_P0,
    ],
    description: "Enabled RX addresses",
    ..SINGLE_BYTE
};

pub static SETUP_AW: RegisterSpec = RegisterSpec {
    name: "SETUP_AW",
    address: addr::SETUP_AW,
    fields: &[&SETUP_AW_RESERVED, &AW],
    description: "Setup of address widths, common for all data pipes",
    ..SINGLE_BYTE
};

pub static SETUP_RETR: RegisterSpec = RegisterSpec {
    name: "SETUP_RETR",
    address: addr::SETUP_RETR,
    fields: &[&ARD, &ARC],
    description: "Setup of automatic retransmission",
    ..SINGLE_BYTE
};

pub static RF_CH: RegisterSpec = RegisterSpec {
    name: "RF_CH",
    address: addr::RF_CH,
    fields: &[&RF_CH_RESERVED, &super::fields::RF_CH],
    description: "RF channel",
    ..SINGLE_BYTE
};

pub static RF_SETUP: RegisterSpec = RegisterSpec {
    name: "RF_SETUP",
    address: addr::RF_SETUP,
    fields: &[
        &CONT_WAVE,
        &RF_SETUP_RESERVED,
        &RF_DR_LOW,
        &PLL_LOCK,
        &RF_DR_HIGH,
        &RF_PWR,
        &RF_SETUP_OBSOLETE,
    ],
    description: "RF setup register",
    ..SINGLE_BYTE
};

pub static STATUS: RegisterSpec = RegisterSpec {
    name: "STATUS",
    address: addr::STATUS,
    fields: &[
        &STATUS_RESERVED,
        &RX_DR,
        &TX_DS,
        &MAX_RT,
        &RX_P_NO,
        &TX_FULL,
    ],
    description: "Status register, shifted out on MISO in parallel to every command byte",
    ..SINGLE_BYTE
};

pub static OBSERVE_TX: RegisterSpec = RegisterSpec {
    name: "OBSERVE_TX",
    address: addr::OBSERVE_TX,
    fields: &[&PLOS_CNT, &ARC_CNT],
    description: "Transmit observe register",
    ..SINGLE_BYTE
};

pub static RPD: RegisterSpec = RegisterSpec {
    name: "RPD",
    address: addr::RPD,
    fields: &[&RPD_RESERVED, &super::fields::RPD],
    description: "Received power detector",
    ..SINGLE_BYTE
};

pub static RX_ADDR_P0: RegisterSpec = address(
    "RX_ADDR_P0",
    addr::RX_ADDR_P0,
    "Receive address data pipe 0, LSByte first",
);

pub static RX_ADDR_P1: RegisterSpec = address(
    "RX_ADDR_P1",
    addr::RX_ADDR_P1,
    "Receive address data pipe 1, LSByte first",
);

pub static RX_ADDR_P2: RegisterSpec = RegisterSpec {
    name: "RX_ADDR_P2",
    address: addr::RX_ADDR_P2,
    fields: &[&super::fields::RX_ADDR_P2],
    description: "Receive address data pipe 2, LSByte only",
    ..SINGLE_BYTE
};

pub static RX_ADDR_P3: RegisterSpec = RegisterSpec {
    name: "RX_ADDR_P3",
    address: addr::RX_ADDR_P3,
    fields: &[&super::fields::RX_ADDR_P3],
    description: "Receive address data pipe 3, LSByte only",
    ..SINGLE_BYTE
};

pub static RX_ADDR_P4: RegisterSpec = RegisterSpec {
    name: "RX_ADDR_P4",
    address: addr::RX_ADDR_P4,
    fields: &[&super::fields::RX_ADDR_P4],
    description: "Receive address data pipe 4, LSByte only",
    ..SINGLE_BYTE
};

pub static RX_ADDR_P5: RegisterSpec = RegisterSpec {
    name: "RX_ADDR_P5",
    address: addr::RX_ADDR_P5,
    fields: &[&super::fields::RX_ADDR_P5],
    description: "Receive address data pipe 5, LSByte only",
    ..SINGLE_BYTE
};

pub static TX_ADDR: RegisterSpec = address(
    "TX_ADDR",
    addr::TX_ADDR,
    "Transmit address, LSByte first. Mirror into RX_ADDR_P0 for auto acknowledge",
);

pub static RX_PW_P0: RegisterSpec = RegisterSpec {
    name: "RX_PW_P0",
    address: addr::RX_PW_P0,
    fields: &[&RX_PW_P0_RESERVED, &super::fields::RX_PW_P0],
    description: "RX payload width pipe 0",
    ..SINGLE_BYTE
};

pub static RX_PW_P1: RegisterSpec = RegisterSpec {
    name: "RX_PW_P1",
    address: addr::RX_PW_P1,
    fields: &[&RX_PW_P1_RESERVED, &super::fields::RX_PW_P1],
    description: "RX payload width pipe 1",
    ..SINGLE_BYTE
};

pub static RX_PW_P2: RegisterSpec = RegisterSpec {
    name: "RX_PW_P2",
    address: addr::RX_PW_P2,
    fields: &[&RX_PW_P2_RESERVED, &super::fields::RX_PW_P2],
    description: "RX payload width pipe 2",
    ..SINGLE_BYTE
};

pub static RX_PW_P3: RegisterSpec = RegisterSpec {
    name: "RX_PW_P3",
    address: addr::RX_PW_P3,
    fields: &[&RX_PW_P3_RESERVED, &super::fields::RX_PW_P3],
    description: "RX payload width pipe 3",
    ..SINGLE_BYTE
};

pub static RX_PW_P4: RegisterSpec = RegisterSpec {
    name: "RX_PW_P4",
    address: addr::RX_PW_P4,
    fields: &[&RX_PW_P4_RESERVED, &super::fields::RX_PW_P4],
    description: "RX payload width pipe 4",
    ..SINGLE_BYTE
};

pub static RX_PW_P5: RegisterSpec = RegisterSpec {
    name: "RX_PW_P5",
    address: addr::RX_PW_P5,
    fields: &[&RX_PW_P5_RESERVED, &super::fields::RX_PW_P5],
    description: "RX payload width pipe 5",
    ..SINGLE_BYTE
};

pub static FIFO_STATUS: RegisterSpec = RegisterSpec {
    name: "FIFO_STATUS",
    address: addr::FIFO_STATUS,
    fields: &[
        &FIFO_STATUS_RESERVED_HIGH,
        &TX_REUSE,
        &FIFO_TX_FULL,
        &TX_EMPTY,
        &FIFO_STATUS_RESERVED_LOW,
        &RX_FULL,
        &RX_EMPTY,
    ],
    description: "FIFO status register",
    ..SINGLE_BYTE
};

pub static DYNPD: RegisterSpec = RegisterSpec {
    name: "DYNPD",
    address: addr::DYNPD,
    fields: &[
        &DYNPD_RESERVED,
        &DPL_P5,
        &DPL_P4,
        &DPL_P3,
        &DPL_P2,
        &DPL_P1,
        &DPL_P0,
    ],
    description: "Enable dynamic payload length",
    ..SINGLE_BYTE
};

pub static FEATURE: RegisterSpec = RegisterSpec {
    name: "FEATURE",
    address: addr::FEATURE,
    fields: &[&FEATURE_RESERVED, &EN_DPL, &EN_ACK_PAY, &EN_DYN_ACK],
    description: "Feature register",
    ..SINGLE_BYTE
};

/// Every register, in address order
pub static ALL: [&RegisterSpec; 26] = [
    &CONFIG,
    &EN_AA,
    &EN_RXADDR,
    &SETUP_AW,
    &SETUP_RETR,
    &RF_CH,
    &RF_SETUP,
    &STATUS,
    &OBSERVE_TX,
    &RPD,
    &RX_ADDR_P0,
    &RX_ADDR_P1,
    &RX_ADDR_P2,
    &RX_ADDR_P3,
    &RX_ADDR_P4,
    &RX_ADDR_P5,
    &TX_ADDR,
    &RX_PW_P0,
    &RX_PW_P1,
    &RX_PW_P2,
    &RX_PW_P3,
    &RX_PW_P4,
    &RX_PW_P5,
    &FIFO_STATUS,
    &DYNPD,
    &FEATURE,
];

pub fn by_address(address: u8) -> Option<&'static RegisterSpec> {
    ALL.iter().copied().find(|r| r.address == address)
}

pub fn by_name(name: &str) -> Option<&'static RegisterSpec> {
    ALL.iter().copied().find(|r| r.name == name)
}
