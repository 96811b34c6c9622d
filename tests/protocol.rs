//! Protocol-level tests driven through a scripted transport.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use mcp2221_driver::gpio::Gp2Function;
use mcp2221_driver::i2c::{I2cMode, I2cSetSpeedResponse};
use mcp2221_driver::settings::ClockFrequency;
use mcp2221_driver::transport::Transport;
use mcp2221_driver::{Error, Mcp2221, MemoryTarget};

const FRAME: usize = 64;

/// Transport that answers from per-command scripted responses.
///
/// Responses are keyed by the command code of the request. A command with
/// several scripted responses pops them in order, with the final one
/// repeating; a command with none is answered with a bare success echo.
struct MockTransport {
    sent: Rc<RefCell<Vec<[u8; FRAME]>>>,
    responses: HashMap<u8, VecDeque<[u8; FRAME]>>,
    fail_sends: Rc<Cell<bool>>,
    empty_responses: bool,
    last_code: u8,
}

impl MockTransport {
    fn new() -> Self {
        let mut mock = Self {
            sent: Rc::new(RefCell::new(Vec::new())),
            responses: HashMap::new(),
            fail_sends: Rc::new(Cell::new(false)),
            empty_responses: false,
            last_code: 0,
        };
        // Settling at open reads the SRAM settings once.
        mock.script(0x61, sram_response([0u8; 18], [0u8; 4]));
        mock
    }

    fn script(&mut self, code: u8, frame: [u8; FRAME]) {
        self.responses.entry(code).or_default().push_back(frame);
    }

    fn sent_frames(&self) -> Rc<RefCell<Vec<[u8; FRAME]>>> {
        Rc::clone(&self.sent)
    }

    fn fail_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.fail_sends)
    }
}

impl Transport for MockTransport {
    fn send_raw(&mut self, frame: &[u8; FRAME]) -> Result<(), Error> {
        if self.fail_sends.get() {
            return Err(hidapi::HidError::HidApiError {
                message: "device disconnected".into(),
            }
            .into());
        }
        self.sent.borrow_mut().push(*frame);
        self.last_code = frame[0];
        Ok(())
    }

    fn recv_raw(&mut self) -> Result<Vec<u8>, Error> {
        if self.empty_responses {
            return Ok(Vec::new());
        }
        if let Some(queue) = self.responses.get_mut(&self.last_code) {
            let frame = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                *queue.front().unwrap()
            };
            return Ok(frame.to_vec());
        }
        Ok(response(self.last_code).to_vec())
    }
}

fn response(code: u8) -> [u8; FRAME] {
    let mut frame = [0u8; FRAME];
    frame[0] = code;
    frame
}

fn sram_response(chip: [u8; 18], gp: [u8; 4]) -> [u8; FRAME] {
    let mut frame = response(0x61);
    frame[2] = 18;
    frame[3] = 4;
    frame[4..22].copy_from_slice(&chip);
    frame[22..26].copy_from_slice(&gp);
    frame
}

fn gpio_response(pins: [(u8, u8); 4]) -> [u8; FRAME] {
    let mut frame = response(0x51);
    for (n, (value, direction)) in pins.iter().enumerate() {
        frame[2 + 2 * n] = *value;
        frame[3 + 2 * n] = *direction;
    }
    frame
}

fn flash_chip_response(image: &[u8]) -> [u8; FRAME] {
    let mut frame = response(0xB0);
    frame[2] = image.len() as u8;
    frame[4..4 + image.len()].copy_from_slice(image);
    frame
}

fn open_session(mock: MockTransport) -> Mcp2221<MockTransport> {
    let mut device = Mcp2221::new();
    device.attach(mock).unwrap();
    device
}

#[test]
fn open_failure_leaves_session_closed() {
    let mut mock = MockTransport::new();
    mock.empty_responses = true;
    let mut device: Mcp2221<MockTransport> = Mcp2221::new();
    let result = device.attach(mock);
    assert!(matches!(result, Err(Error::EmptyResponse)));
    assert!(!device.is_open());
}

#[test]
fn opening_parks_analog_pins_and_restores_them() {
    let mut mock = MockTransport::new();
    // GP1 is a GPIO input, GP2 is on the ADC, GP3 on some other alternate
    // function; GP0's byte passes through untouched.
    mock.responses.remove(&0x61);
    mock.script(0x61, sram_response([0u8; 18], [0x07, 0x08, 0x02, 0x01]));
    let sent = mock.sent_frames();
    let _device = open_session(mock);

    let frames = sent.borrow();
    let writes: Vec<_> = frames.iter().filter(|f| f[0] == 0x60).collect();
    assert_eq!(writes.len(), 2);
    // First pass swaps GPIO inputs onto the ADC and ADC pins onto GPIO input.
    assert_eq!(writes[0][7], 0x80);
    assert_eq!(&writes[0][8..12], &[0x07, 0x02, 0x08, 0x01]);
    // Second pass puts the original configuration back.
    assert_eq!(writes[1][7], 0x80);
    assert_eq!(&writes[1][8..12], &[0x07, 0x08, 0x02, 0x01]);
}

#[test]
fn operations_on_closed_session_fail() {
    let mut device: Mcp2221<MockTransport> = Mcp2221::new();
    assert!(matches!(device.status(), Err(Error::NotConnected)));
    assert!(matches!(device.reset(), Err(Error::NotConnected)));
}

#[test]
fn pin_index_is_validated_before_any_exchange() {
    let mut device: Mcp2221<MockTransport> = Mcp2221::new();
    // Rejected by validation even though no device is open.
    assert!(matches!(
        device.gpio_read_value(4),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn adc_channels_come_from_the_status_frame() {
    let mut mock = MockTransport::new();
    let mut status = response(0x10);
    status[52] = 0x1F;
    mock.script(0x10, status);
    let mut device = open_session(mock);
    assert_eq!(device.adc_read(1).unwrap(), 31);
}

#[test]
fn command_code_mismatch_is_detected() {
    let mut mock = MockTransport::new();
    mock.script(0x10, response(0x51));
    let mut device = open_session(mock);
    assert!(matches!(
        device.status(),
        Err(Error::CommandCodeMismatch {
            sent: 0x10,
            received: 0x51
        })
    ));
}

#[test]
fn nonzero_status_byte_fails_the_command() {
    let mut mock = MockTransport::new();
    let mut bad = response(0x10);
    bad[1] = 0x41;
    mock.script(0x10, bad);
    let mut device = open_session(mock);
    assert!(matches!(device.status(), Err(Error::CommandFailed(0x41))));
}

#[test]
fn reset_tolerates_transport_loss_and_closes_the_session() {
    let mock = MockTransport::new();
    let fail = mock.fail_flag();
    let mut device = open_session(mock);
    fail.set(true);
    device.reset().unwrap();
    assert!(!device.is_open());
}

#[test]
fn sram_pin_function_write_reconstructs_all_four_pins() {
    let mut mock = MockTransport::new();
    // GP0, GP1, GP3 are GPIO inputs driving high; GP2 is on an alternate
    // function so its value and direction read as sentinels.
    mock.script(
        0x51,
        gpio_response([(1, 1), (1, 1), (0xEE, 0xEF), (1, 1)]),
    );
    let mut chip = [0u8; 18];
    chip[2] = 0b0110_0000;
    chip[3] = 0b0001_1100;
    mock.script(0x61, sram_response(chip, [0x18, 0x18, 0x02, 0x18]));
    let sent = mock.sent_frames();
    let mut device = open_session(mock);
    sent.borrow_mut().clear();

    device
        .set_gp2_function(Gp2Function::Dac1, Some(MemoryTarget::Sram))
        .unwrap();

    let frames = sent.borrow();
    let gp_write = frames
        .iter()
        .find(|f| f[0] == 0x60 && f[7] == 0x80)
        .expect("no GP settings write sent");
    // GPIO pins fold in their live value (bit 4) and direction (bit 3).
    assert_eq!(gp_write[8], 0b0001_1000);
    assert_eq!(gp_write[9], 0b0001_1000);
    assert_eq!(gp_write[11], 0b0001_1000);
    // The altered pin carries the new function code.
    assert_eq!(gp_write[10], 3);

    // The references cleared by the pin rewrite are restored afterwards.
    let vref_write = frames
        .iter()
        .rev()
        .find(|f| f[0] == 0x60 && f[7] != 0x80)
        .expect("no reference restore sent");
    assert_eq!(vref_write[3], 0x80 | 0b011);
    assert_eq!(vref_write[5], 0x80 | 0b111);
}

#[test]
fn interrupt_configuration_writes_the_armed_sram_byte() {
    let mock = MockTransport::new();
    let sent = mock.sent_frames();
    let mut device = open_session(mock);
    sent.borrow_mut().clear();

    device
        .set_interrupt_on_falling_edge(true, Some(MemoryTarget::Sram))
        .unwrap();
    device
        .set_interrupt_on_rising_edge(true, Some(MemoryTarget::Sram))
        .unwrap();
    device.clear_interrupt_flag().unwrap();

    let frames = sent.borrow();
    let writes: Vec<_> = frames.iter().filter(|f| f[0] == 0x60).collect();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0][6], 0b1001_1000);
    assert_eq!(writes[1][6], 0b1000_0110);
    assert_eq!(writes[2][6], 0b1000_0001);
    // Chip-settings writes leave the GP-alter flag clear.
    assert!(writes.iter().all(|f| f[7] == 0));
}

#[test]
fn flash_chip_settings_writes_carry_the_cached_password() {
    let mut mock = MockTransport::new();
    let image = [0u8; 10];
    mock.script(0xB0, flash_chip_response(&image));
    let sent = mock.sent_frames();
    let mut device: Mcp2221<MockTransport> = Mcp2221::with_password("pass123").unwrap();
    device.attach(mock).unwrap();

    device.set_led_idle_i2c_level(true).unwrap();

    let frames = sent.borrow();
    let write = frames.iter().find(|f| f[0] == 0xB1).expect("no flash write");
    assert_eq!(write[1], 0x00);
    assert_eq!(&write[2 + image.len()..2 + image.len() + 7], b"pass123");
}

#[test]
fn flash_bit_writes_preserve_neighbouring_bits() {
    let mut mock = MockTransport::new();
    let mut image = [0u8; 10];
    image[0] = 0b0101_0101;
    mock.script(0xB0, flash_chip_response(&image));
    let sent = mock.sent_frames();
    let mut device = open_session(mock);

    device.set_cdc_serial_number_enumeration(true).unwrap();

    let frames = sent.borrow();
    let write = frames.iter().find(|f| f[0] == 0xB1).expect("no flash write");
    assert_eq!(write[2], 0b1101_0101);
}

#[test]
fn descriptor_write_encodes_utf16_with_header() {
    let mock = MockTransport::new();
    let sent = mock.sent_frames();
    let mut device = open_session(mock);

    let thirty_chars = "a".repeat(30);
    device.set_usb_product_descriptor(&thirty_chars).unwrap();

    let frames = sent.borrow();
    let write = frames.iter().find(|f| f[0] == 0xB1).expect("no flash write");
    assert_eq!(write[1], 0x03);
    assert_eq!(write[2], 62);
    assert_eq!(write[3], 0x03);
    assert_eq!(write[4], b'a');
    assert_eq!(write[5], 0);
    drop(frames);

    let too_long = "a".repeat(31);
    assert!(matches!(
        device.set_usb_product_descriptor(&too_long),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn short_descriptor_read_drops_the_trailing_header_bytes() {
    let mut mock = MockTransport::new();
    let mut frame = response(0xB0);
    // Length field counts the string bytes plus a two-byte header, so the
    // block read overshoots by two bytes.
    frame[2] = 6;
    frame[4] = b'A';
    frame[6] = b'B';
    mock.script(0xB0, frame);
    let mut device = open_session(mock);
    assert_eq!(device.usb_product_descriptor().unwrap(), "AB");
}

#[test]
fn gpio_sentinels_read_as_none() {
    let mut mock = MockTransport::new();
    mock.script(
        0x51,
        gpio_response([(1, 0), (0xEE, 0xEF), (0, 1), (0, 0)]),
    );
    let mut device = open_session(mock);
    assert_eq!(device.gpio_read_value(0).unwrap(), Some(true));
    assert_eq!(device.gpio_read_value(1).unwrap(), None);
    assert!(device.gpio_read_direction(1).unwrap().is_none());
}

#[test]
fn default_memory_target_routes_dual_space_reads() {
    let mut mock = MockTransport::new();
    let mut image = [0u8; 10];
    image[1] = 0b010;
    mock.script(0xB0, flash_chip_response(&image));
    let sent = mock.sent_frames();
    let mut device = open_session(mock);
    sent.borrow_mut().clear();

    device.set_default_memory_target(MemoryTarget::Flash);
    let frequency = device.clock_output_frequency(None).unwrap();
    assert_eq!(frequency, ClockFrequency::MHz12);
    assert!(sent.borrow().iter().all(|f| f[0] == 0xB0));
}

#[test]
fn i2c_write_chunks_long_transfers() {
    let mock = MockTransport::new();
    let sent = mock.sent_frames();
    let mut device = open_session(mock);
    sent.borrow_mut().clear();

    let data: Vec<u8> = (0..100).collect();
    device.i2c_write(0x50, &data, I2cMode::Start).unwrap();

    let frames = sent.borrow();
    let writes: Vec<_> = frames.iter().filter(|f| f[0] == 0x90).collect();
    assert_eq!(writes.len(), 2);
    for frame in &writes {
        assert_eq!(frame[1], 100);
        assert_eq!(frame[2], 0);
        assert_eq!(frame[3], 0x50 << 1);
    }
    assert_eq!(&writes[0][4..64], &data[..60]);
    assert_eq!(&writes[1][4..44], &data[60..]);
}

#[test]
fn i2c_read_collects_data_frames() {
    let mut mock = MockTransport::new();
    let mut data_frame = response(0x40);
    data_frame[3] = 4;
    data_frame[4..8].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    mock.script(0x40, data_frame);
    let sent = mock.sent_frames();
    let mut device = open_session(mock);

    let data = device.i2c_read(0x50, 4, I2cMode::Start).unwrap();
    assert_eq!(data, [0xDE, 0xAD, 0xBE, 0xEF]);

    let frames = sent.borrow();
    let issue = frames.iter().find(|f| f[0] == 0x91).expect("no read issued");
    assert_eq!(issue[1], 4);
    assert_eq!(issue[3], (0x50 << 1) | 1);
}

#[test]
fn i2c_read_without_data_reports_the_target_not_responding() {
    let mut mock = MockTransport::new();
    let mut no_data = response(0x40);
    no_data[1] = 0x41;
    mock.script(0x40, no_data);
    let mut device = open_session(mock);
    assert!(matches!(
        device.i2c_read(0x50, 4, I2cMode::Start),
        Err(Error::I2cTargetNotResponding)
    ));
}

#[test]
fn i2c_read_surfaces_a_target_reported_error() {
    let mut mock = MockTransport::new();
    let mut errored = response(0x40);
    errored[3] = 0x7F;
    mock.script(0x40, errored);
    let mut device = open_session(mock);
    assert!(matches!(
        device.i2c_read(0x50, 4, I2cMode::Start),
        Err(Error::I2cTargetError)
    ));
}

#[test]
fn i2c_read_has_no_nostop_variant() {
    let mut device: Mcp2221<MockTransport> = Mcp2221::new();
    assert!(matches!(
        device.i2c_read(0x50, 1, I2cMode::NoStop),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn busy_engine_exhausts_retries() {
    let mut mock = MockTransport::new();
    let mut busy = response(0x90);
    busy[1] = 0x01;
    mock.script(0x90, busy);
    let mut device = open_session(mock);
    assert!(matches!(
        device.i2c_write(0x50, &[1, 2, 3], I2cMode::Start),
        Err(Error::I2cEngineBusy)
    ));
}

#[test]
fn i2c_speed_change_reports_the_engine_response() {
    let mut mock = MockTransport::new();
    let mut accepted = response(0x10);
    accepted[3] = 0x20;
    mock.script(0x10, accepted);
    let sent = mock.sent_frames();
    let mut device = open_session(mock);

    let outcome = device.i2c_set_speed(400_000).unwrap();
    assert_eq!(outcome, I2cSetSpeedResponse::SpeedConsidered);

    let frames = sent.borrow();
    let request = frames.iter().find(|f| f[0] == 0x10).expect("no request");
    assert_eq!(request[3], 0x20);
    assert_eq!(request[4], 27);
}

#[test]
fn unlock_presents_the_password_and_caches_it() {
    let mut mock = MockTransport::new();
    mock.script(0xB0, flash_chip_response(&[0u8; 10]));
    let sent = mock.sent_frames();
    let mut device = open_session(mock);

    device.unlock("secret").unwrap();
    device.set_suspend_mode_logic_level(true).unwrap();

    let frames = sent.borrow();
    let unlock = frames.iter().find(|f| f[0] == 0xB2).expect("no unlock sent");
    assert_eq!(unlock[1], 0x00);
    assert_eq!(&unlock[2..8], b"secret");
    let write = frames.iter().find(|f| f[0] == 0xB1).expect("no flash write");
    assert_eq!(&write[12..18], b"secret");
}
