//! Simulated open-drain bus with one register-file peripheral
//!
//! The peripheral decodes START/STOP, address and data bytes, and
//! acknowledge bits purely from line transitions, the way a real target
//! sees them. A first data byte after a write address sets the register
//! pointer; further bytes are stored and the pointer advances. Reads
//! return bytes from the pointer onwards.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use twinwire_hal::OpenDrainPin;

/// Bus line selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Sda,
    Scl,
}

/// What the peripheral observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Stop,
    /// Byte clocked in from the master (address or data)
    Byte(u8),
    /// Master acknowledge after a byte the peripheral sent (`true` = ACK)
    MasterAck(bool),
}

/// Register-file peripheral
#[derive(Debug, Clone)]
pub struct SimDevice {
    /// 7-bit address
    pub address: u8,
    pub registers: [u8; 256],
    /// Acknowledge data bytes (address bytes are always acknowledged)
    pub ack_data: bool,
    pointer: u8,
    pointer_set: bool,
}

impl SimDevice {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            ack_data: true,
            pointer: 0,
            pointer_set: false,
        }
    }

    pub fn with_register(mut self, register: u8, value: u8) -> Self {
        self.registers[register as usize] = value;
        self
    }

    pub fn rejecting_data(mut self) -> Self {
        self.ack_data = false;
        self
    }

    fn next_out(&mut self) -> u8 {
        let value = self.registers[self.pointer as usize];
        self.pointer = self.pointer.wrapping_add(1);
        value
    }

    fn accept(&mut self, byte: u8) {
        if self.pointer_set {
            self.registers[self.pointer as usize] = byte;
            self.pointer = self.pointer.wrapping_add(1);
        } else {
            self.pointer = byte;
            self.pointer_set = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Master is clocking a byte in
    Receiving { bits: u8, shift: u8, address: bool },
    /// Peripheral's acknowledge slot
    AckOut { ack: bool, then_transmit: bool },
    /// Peripheral is clocking a byte out
    Transmitting { byte: u8, sent: u8 },
    /// Master's acknowledge slot
    AckIn { ack: bool },
    /// Not addressed until the next START
    Ignore,
}

struct State {
    master_sda: bool,
    master_scl: bool,
    device_sda: bool,
    stretch: u32,
    elapsed_ns: u64,
    phase: Phase,
    device: Option<SimDevice>,
    events: Vec<Event, 512>,
}

impl State {
    fn sda(&self) -> bool {
        self.master_sda && self.device_sda
    }

    fn log(&mut self, event: Event) {
        let _ = self.events.push(event);
    }

    fn drive(&mut self, line: Line, released: bool) {
        match line {
            Line::Sda => {
                let before = self.sda();
                self.master_sda = released;
                let after = self.sda();
                if self.master_scl && before != after {
                    if after {
                        self.on_stop();
                    } else {
                        self.on_start();
                    }
                }
            }
            Line::Scl => {
                let before = self.master_scl;
                self.master_scl = released;
                match (before, released) {
                    (false, true) => self.on_rise(),
                    (true, false) => self.on_fall(),
                    _ => {}
                }
            }
        }
    }

    fn on_start(&mut self) {
        self.log(Event::Start);
        self.device_sda = true;
        if let Some(device) = self.device.as_mut() {
            device.pointer_set = false;
        }
        self.phase = Phase::Receiving {
            bits: 0,
            shift: 0,
            address: true,
        };
    }

    fn on_stop(&mut self) {
        self.log(Event::Stop);
        self.device_sda = true;
        self.phase = Phase::Idle;
    }

    fn on_rise(&mut self) {
        let sda = self.sda();
        match self.phase {
            Phase::Receiving {
                bits,
                shift,
                address,
            } if bits < 8 => {
                self.phase = Phase::Receiving {
                    bits: bits + 1,
                    shift: (shift << 1) | sda as u8,
                    address,
                };
            }
            Phase::AckIn { .. } => {
                self.log(Event::MasterAck(!sda));
                self.phase = Phase::AckIn { ack: !sda };
            }
            _ => {}
        }
    }

    fn on_fall(&mut self) {
        match self.phase {
            Phase::Receiving {
                bits: 8,
                shift,
                address,
            } => {
                self.log(Event::Byte(shift));
                let (ack, then_transmit) = match self.device.as_mut() {
                    Some(device) if address => (shift >> 1 == device.address, shift & 1 == 1),
                    Some(device) => {
                        device.accept(shift);
                        (device.ack_data, false)
                    }
                    None => (false, false),
                };
                self.device_sda = !ack;
                self.phase = Phase::AckOut { ack, then_transmit };
            }
            Phase::AckOut { ack, then_transmit } => {
                self.device_sda = true;
                self.phase = match (ack, then_transmit, self.device.as_mut()) {
                    (true, true, Some(device)) => {
                        let byte = device.next_out();
                        self.device_sda = byte & 0x80 != 0;
                        Phase::Transmitting { byte, sent: 0 }
                    }
                    (true, false, _) => Phase::Receiving {
                        bits: 0,
                        shift: 0,
                        address: false,
                    },
                    _ => Phase::Ignore,
                };
            }
            Phase::Transmitting { byte, sent } => {
                let sent = sent + 1;
                if sent == 8 {
                    self.device_sda = true;
                    self.phase = Phase::AckIn { ack: false };
                } else {
                    self.device_sda = byte & (0x80 >> sent) != 0;
                    self.phase = Phase::Transmitting { byte, sent };
                }
            }
            Phase::AckIn { ack } => {
                self.phase = match (ack, self.device.as_mut()) {
                    (true, Some(device)) => {
                        let byte = device.next_out();
                        self.device_sda = byte & 0x80 != 0;
                        Phase::Transmitting { byte, sent: 0 }
                    }
                    _ => Phase::Ignore,
                };
            }
            _ => {}
        }
    }
}

/// Simulated bus shared by two [`SimPin`]s
pub struct SimBus {
    state: RefCell<State>,
}

impl SimBus {
    /// Bus with nothing attached
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                master_sda: true,
                master_scl: true,
                device_sda: true,
                stretch: 0,
                elapsed_ns: 0,
                phase: Phase::Idle,
                device: None,
                events: Vec::new(),
            }),
        }
    }

    /// Bus with one peripheral attached
    pub fn with_device(device: SimDevice) -> Self {
        let bus = Self::new();
        bus.state.borrow_mut().device = Some(device);
        bus
    }

    pub fn pin(&self, line: Line) -> SimPin<'_> {
        SimPin { bus: self, line }
    }

    pub fn sda_level(&self) -> bool {
        self.state.borrow().sda()
    }

    pub fn scl_level(&self) -> bool {
        self.state.borrow().master_scl
    }

    /// Make the next `reads` samples of SCL read low
    pub fn stretch_clock(&self, reads: u32) {
        self.state.borrow_mut().stretch = reads;
    }

    pub fn stretch_remaining(&self) -> u32 {
        self.state.borrow().stretch
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.state.borrow().elapsed_ns
    }

    pub fn events(&self) -> Vec<Event, 512> {
        self.state.borrow().events.clone()
    }

    /// Bytes the peripheral clocked in, in order
    pub fn bytes(&self) -> Vec<u8, 64> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Byte(byte) => Some(*byte),
                _ => None,
            })
            .take(64)
            .collect()
    }

    /// Master acknowledges of peripheral-sent bytes, in order
    pub fn master_acks(&self) -> Vec<bool, 64> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::MasterAck(ack) => Some(*ack),
                _ => None,
            })
            .take(64)
            .collect()
    }

    pub fn register(&self, register: u8) -> Option<u8> {
        self.state
            .borrow()
            .device
            .as_ref()
            .map(|device| device.registers[register as usize])
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }
}

/// One line of a [`SimBus`]
pub struct SimPin<'a> {
    bus: &'a SimBus,
    line: Line,
}

impl OpenDrainPin for SimPin<'_> {
    fn release(&mut self) {
        self.bus.state.borrow_mut().drive(self.line, true);
    }

    fn set_low(&mut self) {
        self.bus.state.borrow_mut().drive(self.line, false);
    }

    fn is_high(&mut self) -> bool {
        let mut state = self.bus.state.borrow_mut();
        match self.line {
            Line::Sda => state.sda(),
            Line::Scl if state.stretch > 0 => {
                state.stretch -= 1;
                false
            }
            Line::Scl => state.master_scl,
        }
    }
}

/// Delay that only accounts elapsed time on the bus
pub struct SimDelay<'a> {
    bus: &'a SimBus,
}

impl<'a> SimDelay<'a> {
    pub fn new(bus: &'a SimBus) -> Self {
        Self { bus }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.state.borrow_mut().elapsed_ns += ns as u64;
    }
}
