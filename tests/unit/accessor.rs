//! Unit tests for batched get/set

use crate::common::create_mock_driver;
use nrf24::fields::*;
use nrf24::{regs, Conflict, Error, FieldSpec, Request, ValueError, Write};

fn is_write_one_to_clear(field: &FieldSpec) -> bool {
    WRITE_ONE_TO_CLEAR.iter().any(|f| core::ptr::eq(*f, field))
}

#[test]
fn test_get_register_and_field() {
    let (mut radio, mocks) = create_mock_driver();

    assert_eq!(radio.get(&regs::CONFIG).unwrap(), 0x08);
    assert_eq!(radio.get(&EN_CRC).unwrap(), 1);
    assert_eq!(radio.get(&ARC).unwrap(), 3);
    assert_eq!(radio.get(&RX_P_NO).unwrap(), 0b111);
    assert_eq!(
        mocks.spi.transactions(),
        vec![
            vec![0x00, 0xFF],
            vec![0x00, 0xFF],
            vec![0x04, 0xFF],
            vec![0x07, 0xFF]
        ]
    );
}

#[test]
fn test_get_reads_each_register_once() {
    let (mut radio, mocks) = create_mock_driver();

    let values = radio
        .get_array([
            Request::from(&RF_CH),
            Request::from(&EN_CRC),
            Request::from(&regs::CONFIG),
            Request::from(&PWR_UP),
        ])
        .unwrap();
    assert_eq!(values, [2, 1, 0x08, 0]);

    // ascending address order, one frame per register
    assert_eq!(
        mocks.spi.transactions(),
        vec![vec![0x00, 0xFF], vec![0x05, 0xFF]]
    );
}

#[test]
fn test_get_preserves_duplicates() {
    let (mut radio, mocks) = create_mock_driver();

    let values = radio
        .get_many(&[Request::from(&ARD), Request::from(&ARC), Request::from(&ARC)])
        .unwrap();
    assert_eq!(values, vec![0, 3, 3]);
    assert_eq!(mocks.spi.transactions().len(), 1);
}

#[test]
fn test_batched_get_matches_single_gets() {
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.set_register(regs::RF_SETUP.address, 0b0010_0110);
    mocks.spi.set_register(regs::SETUP_AW.address, 0b01);
    mocks.spi.receive(3, &[1, 2]);

    let requests: Vec<Request> = regs::ALL
        .iter()
        .flat_map(|register| register.named_fields())
        .map(Request::from)
        .collect();
    let batched = radio.get_many(&requests).unwrap();
    for (request, value) in requests.iter().zip(&batched) {
        assert_eq!(radio.get(*request).unwrap(), *value, "{}", request);
    }
}

#[test]
fn test_status_alone_is_read_as_a_register() {
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.raise(0x10);

    assert_eq!(radio.get(&regs::STATUS).unwrap(), 0x1E);
    assert_eq!(radio.get(&MAX_RT).unwrap(), 1);
    assert_eq!(
        mocks.spi.transactions(),
        vec![vec![0x07, 0xFF], vec![0x07, 0xFF]]
    );
}

#[test]
fn test_status_rides_along_other_reads() {
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.raise(0x40);

    let [rx_dr, channel] = radio.get_array([Request::from(&RX_DR), Request::from(&RF_CH)]).unwrap();
    assert_eq!((rx_dr, channel), (1, 2));
    assert_eq!(mocks.spi.transactions(), vec![vec![0x05, 0xFF]]);
}

#[test]
fn test_status_with_other_reads_is_as_of_the_last_frame() {
    // Known window: STATUS comes from the head of the last register read, a
    // flag raised after that frame shows up only on the next transaction.
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.raise_after(1, 0x40);

    let [channel, status] = radio.get_array([&regs::RF_CH, &regs::STATUS]).unwrap();
    assert_eq!(channel, 0x02);
    assert_eq!(status & 0x40, 0);
    assert_eq!(radio.get(&RX_DR).unwrap(), 1);
}

#[test]
fn test_multi_byte_register_is_rejected_before_the_bus() {
    let (mut radio, mocks) = create_mock_driver();

    assert_eq!(
        radio.get_array([Request::from(&RF_CH), Request::from(&regs::RX_ADDR_P0)]),
        Err(Error::Value(ValueError::InvalidAddressOrSize {
            address: 0x0A,
            size: 1
        }))
    );
    assert!(mocks.spi.transactions().is_empty());
}

#[test]
fn test_partial_write_keeps_other_bits() {
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.set_register(regs::SETUP_RETR.address, 0b1011_0000);

    radio.set([ARC.value(0b11).unwrap()]).unwrap();
    assert_eq!(mocks.spi.register(regs::SETUP_RETR.address), 0b1011_0011);
    assert_eq!(
        mocks.spi.transactions(),
        vec![vec![0x04, 0xFF], vec![0x24, 0b1011_0011]]
    );
}

#[test]
fn test_full_byte_field_is_written_directly() {
    let (mut radio, mocks) = create_mock_driver();

    radio.set([RX_ADDR_P2.value(0x99).unwrap()]).unwrap();
    assert_eq!(mocks.spi.register(regs::RX_ADDR_P2.address), 0x99);
    assert_eq!(mocks.spi.transactions(), vec![vec![0x2C, 0x99]]);
}

#[test]
fn test_fields_of_one_register_are_merged() {
    let (mut radio, mocks) = create_mock_driver();

    radio
        .set([PWR_UP.value(1).unwrap(), PRIM_RX.value(1).unwrap()])
        .unwrap();
    assert_eq!(mocks.spi.register(regs::CONFIG.address), 0x0B);
    assert_eq!(
        mocks.spi.transactions(),
        vec![vec![0x00, 0xFF], vec![0x20, 0x0B]]
    );
}

#[test]
fn test_registers_are_written_before_fields() {
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.raise(0x20);

    let status = radio
        .set([
            Write::from(PWR_UP.value(1).unwrap()),
            Write::from(regs::RF_CH.byte(40).unwrap()),
            Write::from(regs::TX_ADDR.value(&[1, 2, 3, 4, 5]).unwrap()),
        ])
        .unwrap();
    assert_eq!(status.bits(), 0x2E);
    assert_eq!(
        mocks.spi.transactions(),
        vec![
            vec![0x25, 40],
            vec![0x30, 1, 2, 3, 4, 5],
            vec![0x00, 0xFF],
            vec![0x20, 0x0A],
        ]
    );
}

#[test]
fn test_round_trip_every_writable_field() {
    let (mut radio, _mocks) = create_mock_driver();

    for register in regs::ALL {
        for field in register.named_fields().filter(|f| f.is_writable()) {
            if is_write_one_to_clear(field) {
                continue;
            }
            for value in [field.max_value(), 0] {
                radio.set([field.value(value).unwrap()]).unwrap();
                assert_eq!(radio.get(field).unwrap(), value, "{}", field.name);
            }
        }
    }
}

#[test]
fn test_write_one_to_clear_only_touches_named_flags() {
    let (mut radio, mocks) = create_mock_driver();
    mocks.spi.raise(0x70);

    radio.set([RX_DR.value(1).unwrap()]).unwrap();
    assert_eq!(radio.get_array([&RX_DR, &TX_DS, &MAX_RT]).unwrap(), [0, 1, 1]);

    radio
        .set([TX_DS.value(1).unwrap().and(MAX_RT.value(1).unwrap()).unwrap()])
        .unwrap();
    assert_eq!(radio.get(&regs::STATUS).unwrap() & 0x70, 0);
}

#[test]
fn test_conflicts_never_reach_the_bus() {
    let (mut radio, mocks) = create_mock_driver();

    assert_eq!(
        radio.set([
            Write::from(regs::CONFIG.byte(0x0A).unwrap()),
            Write::from(PWR_UP.value(1).unwrap()),
        ]),
        Err(Error::Value(ValueError::Conflict(
            Conflict::RegisterAndFields { address: 0x00 }
        )))
    );
    assert_eq!(
        radio.set([
            Write::from(PWR_UP.value(1).unwrap()),
            Write::from(regs::CONFIG.byte(0x0A).unwrap()),
        ]),
        Err(Error::Value(ValueError::Conflict(
            Conflict::RegisterAndFields { address: 0x00 }
        )))
    );
    assert_eq!(
        radio.set([regs::RF_CH.byte(1).unwrap(), regs::RF_CH.byte(2).unwrap()]),
        Err(Error::Value(ValueError::Conflict(
            Conflict::DuplicateRegister { address: 0x05 }
        )))
    );
    assert_eq!(
        radio.set([
            RF_CH.value(1).unwrap(),
            PWR_UP.value(1).unwrap(),
            RF_CH.value(2).unwrap()
        ]),
        Err(Error::Value(ValueError::Conflict(Conflict::Overlap {
            field: "RF_CH"
        })))
    );
    assert!(mocks.spi.transactions().is_empty());
}

#[test]
fn test_empty_set_is_refused() {
    let (mut radio, mocks) = create_mock_driver();

    assert_eq!(radio.set(Vec::<Write>::new()), Err(Error::NothingToWrite));
    assert_eq!(
        radio.set([nrf24::FieldValueSet::new()]),
        Err(Error::NothingToWrite)
    );
    assert!(mocks.spi.transactions().is_empty());
}
