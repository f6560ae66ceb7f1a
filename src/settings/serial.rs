//! Assignment of functions (MSP, serial receiver, GPS, telemetry, ...) to serial ports.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const MAX_SERIAL_PORTS: usize = 12;
pub const MAX_MSP_PORT_COUNT: usize = 3;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SerialFunction: u16 {
        const MSP = 1 << 0;
        const GPS = 1 << 1;
        const TELEMETRY_FRSKY_HUB = 1 << 2;
        const TELEMETRY_HOTT = 1 << 3;
        const TELEMETRY_LTM = 1 << 4;
        const TELEMETRY_SMARTPORT = 1 << 5;
        const RX_SERIAL = 1 << 6;
        const BLACKBOX = 1 << 7;
        const TELEMETRY_MAVLINK = 1 << 9;
        const ESC_SENSOR = 1 << 10;
        const VTX_SMARTAUDIO = 1 << 11;
        const TELEMETRY_IBUS = 1 << 12;
        const VTX_TRAMP = 1 << 13;
        const RCDEVICE = 1 << 14;
    }
}

impl SerialFunction {
    /// Every telemetry protocol.
    pub const TELEMETRY: SerialFunction = SerialFunction::from_bits_retain(
        SerialFunction::TELEMETRY_FRSKY_HUB.bits()
            | SerialFunction::TELEMETRY_HOTT.bits()
            | SerialFunction::TELEMETRY_LTM.bits()
            | SerialFunction::TELEMETRY_SMARTPORT.bits()
            | SerialFunction::TELEMETRY_MAVLINK.bits()
            | SerialFunction::TELEMETRY_IBUS.bits(),
    );

    /// Telemetry protocols that only use the TX line and can share a port with the serial receiver.
    pub const TELEMETRY_SHAREABLE_WITH_RX: SerialFunction = SerialFunction::from_bits_retain(
        SerialFunction::TELEMETRY_FRSKY_HUB.bits()
            | SerialFunction::TELEMETRY_LTM.bits()
            | SerialFunction::TELEMETRY_MAVLINK.bits(),
    );

    /// Functions that may run on a port together with MSP.
    pub const SHAREABLE_WITH_MSP: SerialFunction = SerialFunction::BLACKBOX;
}

impl Default for SerialFunction {
    fn default() -> Self {
        SerialFunction::empty()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SerialPortIdentifier {
    UsbVcp,
    Uart1,
    Uart2,
    Uart3,
    Uart4,
    Uart5,
    Uart6,
    Uart7,
    Uart8,
    SoftSerial1,
    SoftSerial2,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerialPortConfig {
    pub identifier: SerialPortIdentifier,
    pub functions: SerialFunction,
}

impl SerialPortConfig {
    pub const fn new(identifier: SerialPortIdentifier, functions: SerialFunction) -> Self {
        Self { identifier, functions }
    }

    /// Whether the combination of functions on this port is usable at the same time.
    fn has_valid_sharing(&self) -> bool {
        if self.functions.bits().count_ones() <= 1 {
            return true;
        }

        let others = self.functions.difference(SerialFunction::MSP);
        if self.functions.contains(SerialFunction::MSP) {
            return SerialFunction::SHAREABLE_WITH_MSP.contains(others);
        }

        let telemetry = self.functions.difference(SerialFunction::RX_SERIAL);
        self.functions.contains(SerialFunction::RX_SERIAL)
            && SerialFunction::TELEMETRY_SHAREABLE_WITH_RX.contains(telemetry)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    pub ports: heapless::Vec<SerialPortConfig, MAX_SERIAL_PORTS>,
    /// character that reboots the board into the bootloader when received via MSP
    pub reboot_character: u8,
}

impl SerialConfig {
    pub fn find_port(&self, function: SerialFunction) -> Option<&SerialPortConfig> {
        self.ports.iter().find(|p| p.functions.intersects(function))
    }

    pub fn has_port(&self, function: SerialFunction) -> bool {
        self.find_port(function).is_some()
    }

    /// Removes the given functions from every port, returns whether any port changed.
    pub fn remove_function(&mut self, function: SerialFunction) -> bool {
        let mut changed = false;
        for port in self.ports.iter_mut().filter(|p| p.functions.intersects(function)) {
            port.functions.remove(function);
            changed = true;
        }
        changed
    }

    /// Structural check of the port mapping: unique identifiers, one to three MSP ports, at most
    /// one serial receiver port, and only shareable functions on shared ports.
    pub fn is_valid(&self) -> bool {
        for (i, port) in self.ports.iter().enumerate() {
            if self.ports[..i].iter().any(|p| p.identifier == port.identifier) {
                return false;
            }

            if !port.has_valid_sharing() {
                return false;
            }
        }

        let msp_ports = self.ports.iter().filter(|p| p.functions.contains(SerialFunction::MSP)).count();
        let rx_ports = self.ports.iter().filter(|p| p.functions.contains(SerialFunction::RX_SERIAL)).count();

        (1..=MAX_MSP_PORT_COUNT).contains(&msp_ports) && rx_ports <= 1
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        let mut ports = heapless::Vec::new();
        for port in [
            SerialPortConfig::new(SerialPortIdentifier::UsbVcp, SerialFunction::MSP),
            SerialPortConfig::new(SerialPortIdentifier::Uart1, SerialFunction::empty()),
            SerialPortConfig::new(SerialPortIdentifier::Uart2, SerialFunction::RX_SERIAL),
            SerialPortConfig::new(SerialPortIdentifier::Uart3, SerialFunction::empty()),
        ] {
            // capacity is larger than the default port list
            let _ = ports.push(port);
        }

        Self { ports, reboot_character: b'R' }
    }
}
