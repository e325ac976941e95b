/// SPI command opcodes
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `0b000A_AAAA`, OR'ed with the register address
    ReadRegister = 0x00,
    /// `0b001A_AAAA`, OR'ed with the register address
    WriteRegister = 0x20,
    ReadRxPayloadWidth = 0x60,
    ReadRxPayload = 0x61,
    WriteTxPayload = 0xA0,
    /// `0b1010_1PPP`, OR'ed with the pipe number
    WriteAckPayload = 0xA8,
    WriteTxPayloadNoAck = 0xB0,
    FlushTx = 0xE1,
    FlushRx = 0xE2,
    ReuseTxPayload = 0xE3,
    Nop = 0xFF,
}

impl Command {
    /// Opcode byte, with `arg` folded in for the addressed commands
    pub fn opcode(self, arg: u8) -> u8 {
        match self {
            Self::ReadRegister | Self::WriteRegister => self as u8 | (arg & 0x1F),
            Self::WriteAckPayload => self as u8 | (arg & 0x07),
            _ => self as u8,
        }
    }
}
