//! Xbox One GIP device-mode output: enumerates the RP2040 as vendor class
//! `0xFF`/`0x47`/`0xD0` over `embassy-usb` and exchanges GIP packets on a
//! pair of interrupt endpoints. Packet composition lives in
//! [`usbretro_console::xboxone`]; this module is only the endpoint
//! plumbing and the chunked-transfer framing.

use embassy_usb::driver::{Endpoint, EndpointIn, EndpointOut};
use embassy_usb::{Builder, Config as UsbConfig};
use usbretro_console::xboxone::{
    self, AuthRelay, GipCommand, CHUNK_SIZE, DEVICE_DESCRIPTOR, ENDPOINT_MAX_PACKET,
    POLL_INTERVAL_MS, PRODUCT_ID, USB_VERSION, VENDOR_CLASS, VENDOR_ID, VENDOR_PROTOCOL,
    VENDOR_SUBCLASS,
};

/// Build the `UsbConfig` an Xbox One build enumerates with.
#[must_use]
pub fn usb_config() -> UsbConfig<'static> {
    let mut config = UsbConfig::new(VENDOR_ID, PRODUCT_ID);
    config.device_class = VENDOR_CLASS;
    config.device_sub_class = VENDOR_SUBCLASS;
    config.device_protocol = VENDOR_PROTOCOL;
    config.device_release = USB_VERSION;
    config.manufacturer = Some("USBRetro");
    config.product = Some("Joypad (Xbox One)");
    config.max_power = 500;
    config.max_packet_size_0 = 64;
    config
}

/// GIP vendor class: two interrupt endpoints, no standard HID/CDC
/// wrapping — the console side speaks raw GIP frames.
pub struct GipClass<'d, D: embassy_usb::driver::Driver<'d>> {
    write_ep: D::EndpointIn,
    read_ep: D::EndpointOut,
    sequence: u8,
}

impl<'d, D: embassy_usb::driver::Driver<'d>> GipClass<'d, D> {
    pub fn new(builder: &mut Builder<'d, D>) -> Self {
        let mut func = builder.function(VENDOR_CLASS, VENDOR_SUBCLASS, VENDOR_PROTOCOL);
        let mut iface = func.interface();
        let mut alt = iface.alt_setting(VENDOR_CLASS, VENDOR_SUBCLASS, VENDOR_PROTOCOL, None);
        let write_ep = alt.endpoint_interrupt_in(ENDPOINT_MAX_PACKET, POLL_INTERVAL_MS);
        let read_ep = alt.endpoint_interrupt_out(ENDPOINT_MAX_PACKET, POLL_INTERVAL_MS);
        drop(func);

        Self {
            write_ep,
            read_ep,
            sequence: 0,
        }
    }

    pub async fn wait_ready(&mut self) {
        self.write_ep.wait_enabled().await;
    }

    /// Send the one-shot Announce packet immediately after enumeration.
    pub async fn announce(&mut self) {
        self.sequence = self.sequence.wrapping_add(1);
        let pkt = xboxone::announce_packet(self.sequence);
        let _ = self.write_ep.write(&pkt).await;
    }

    /// Send a composed input report, chunking and ACK-waiting per
    /// [`xboxone::chunk_count`]/[`xboxone::needs_ack`].
    pub async fn send_input_report(&mut self, payload: &[u8]) {
        let chunks = xboxone::chunk_count(payload.len());
        for i in 0..chunks {
            let start = i * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(payload.len());
            if self.write_ep.write(&payload[start..end]).await.is_err() {
                return;
            }
            if xboxone::needs_ack(i) {
                let mut buf = [0u8; 64];
                let _ = self.read_ep.read(&mut buf).await;
            }
        }
    }

    /// Relay an authentication command's payload to the external dongle
    /// via `relay`, forwarding any reply back to the console.
    pub async fn relay_auth(&mut self, command: GipCommand, payload: &[u8], relay: &mut impl AuthRelay) {
        if let Some(reply) = relay.forward(command, payload) {
            let _ = self.write_ep.write(&reply).await;
        }
    }

    /// Reply to a `GipCommand::DeviceDescriptor` request, chunking
    /// through the same framing as an input report.
    pub async fn send_device_descriptor(&mut self) {
        let mut header = [0u8; 4];
        header[0] = GipCommand::DeviceDescriptor.opcode();
        header[1] = 0x20;
        header[2] = self.sequence;
        header[3] = DEVICE_DESCRIPTOR.len() as u8;
        let _ = self.write_ep.write(&header).await;
        self.sequence = self.sequence.wrapping_add(1);
        self.send_input_report(&DEVICE_DESCRIPTOR).await;
    }

    /// Wait for the console's next command on the interrupt-OUT
    /// endpoint, decoding its opcode. Returns `None` for an opcode this
    /// side has no handling for (most notably `InputReport`, which this
    /// device only ever sends, never receives).
    pub async fn read_command(&mut self) -> Option<(GipCommand, heapless::Vec<u8, 64>)> {
        const HEADER_LEN: usize = 4;
        let mut buf = [0u8; 64];
        let n = self.read_ep.read(&mut buf).await.ok()?;
        if n < HEADER_LEN {
            return None;
        }
        let command = GipCommand::from_opcode(buf[0])?;
        let mut payload: heapless::Vec<u8, 64> = heapless::Vec::new();
        let _ = payload.extend_from_slice(&buf[HEADER_LEN..n]);
        Some((command, payload))
    }
}
