//! USB host glue: enumerates an attached controller with `cotton-usb-host`,
//! dispatches its reports through `usbretro-drivers`' registry, and
//! submits the resulting canonical events into a console-stage router.
//!
//! Grounded in `other_examples`'s `pdh11-cotton` RTIC example for the
//! `UsbBus::device_events` enumeration loop shape; adapted here to run as
//! an `embassy-executor` task instead of an RTIC task, and to dispatch
//! through [`usbretro_core::registry::Registry`] instead of a fixed
//! boot-keyboard report.

use cotton_usb_host::host::rp2040::{Rp2040HostController, UsbShared, UsbStatics};
use cotton_usb_host::usb_bus::{DeviceEvent, HubState, UsbBus};
use cotton_usb_host::wire::ShowDescriptors;
use cotton_usb_host_hid::{Hid, IdentifyHid};
use embassy_rp::pac;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker, Timer};
use usbretro_core::driver::{DeviceDriver, DriverOutputRequest};
use usbretro_core::event::InputEvent;
use usbretro_core::registry::{HidProtocol, MountOutcome};
use usbretro_drivers::AllDrivers;

/// How often a mounted device's `task()` is polled for a fresh output
/// report, matching the 20 ms throttle the original `task_sony_ds3`/
/// `task_sony_ds4` functions use.
const OUTPUT_TICK: Duration = Duration::from_millis(20);

/// `cotton-usb-host` drives the controller from interrupt context itself
/// (it has no embassy `InterruptHandler` impl to hand to `bind_interrupts!`),
/// so `USBCTRL_IRQ` is bound the same way `pdh11-cotton`'s RTIC example
/// binds it: a raw vector handler that just calls `on_irq()`.
static USB_SHARED: UsbShared = UsbShared::new();

#[cortex_m_rt::interrupt]
fn USBCTRL_IRQ() {
    USB_SHARED.on_irq();
}

/// Per-`(dev_addr, instance)` handshake/init bookkeeping the main task
/// needs beyond what a driver keeps in its own instance-state array: the
/// driver bound to this device at mount time, so its report pump
/// dispatches directly instead of re-probing every registry entry per
/// report.
struct MountedDevice<'r> {
    dev_addr: u8,
    driver: Option<&'r dyn DeviceDriver>,
}

/// Runs forever: drives USB host enumeration, feeds reports to a driver
/// registry, and signals canonical events to the console wire task on
/// core1. `cotton-usb-host` drives the USB PHY straight from the PAC
/// register blocks rather than through `embassy-rp`'s own `usb::Driver`
/// (device-mode only) — this firmware never uses `embassy_rp::usb`, so
/// stealing these three blocks once, here, at startup is the only access
/// to them in the whole program.
#[embassy_executor::task]
pub async fn usb_host_task(
    events: &'static Signal<CriticalSectionRawMutex, InputEvent>,
    rumble: &'static Signal<CriticalSectionRawMutex, bool>,
) {
    static STATICS: static_cell::StaticCell<UsbStatics> = static_cell::StaticCell::new();
    let statics = STATICS.init(UsbStatics::new());

    let drivers = AllDrivers::new();
    let registry = drivers.registry();

    // SAFETY: embassy_rp::init() never hands out these three PAC blocks
    // (USB device mode goes through embassy_rp::usb::Driver instead, which
    // this firmware does not use), so no other code in this binary holds
    // a live reference to them.
    let (resets, regs, dpram) =
        unsafe { (pac::RESETS::steal(), pac::USBCTRL_REGS::steal(), pac::USBCTRL_DPRAM::steal()) };
    let controller = Rp2040HostController::new(resets, regs, dpram, &USB_SHARED, statics);
    let hub_state = HubState::default();
    let stack = UsbBus::new(controller);

    unsafe {
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::USBCTRL_IRQ);
    }

    let mut mounted: heapless::Vec<MountedDevice<'_>, 8> = heapless::Vec::new();

    let mut device_stream = core::pin::pin!(stack.device_events(&hub_state, async_delay));

    loop {
        use futures_util::StreamExt;
        let Some(event) = device_stream.next().await else {
            continue;
        };

        match event {
            DeviceEvent::EnumerationError(hub, port, err) => {
                defmt::debug!("enumeration error on hub {} port {}: {:?}", hub, port, defmt::Debug2Format(&err));
            }
            DeviceEvent::Connect(device, info) => {
                defmt::debug!("device connect {:x} {:x}", device, defmt::Debug2Format(&info));

                let mut identify = IdentifyHid::default();
                if stack.get_configuration(&device, &mut identify).await.is_err() {
                    continue;
                }
                let Some(cfg) = identify.identify() else {
                    continue;
                };
                let Ok(device) = stack.configure(device, cfg).await else {
                    continue;
                };
                let _ = stack.get_configuration(&device, &mut ShowDescriptors).await;

                let dev_addr = device.address() as u8;
                let (vid, pid) = (info.vendor, info.product);

                let outcome = registry.dispatch_mount(vid, pid, HidProtocol::None, None);
                let driver: Option<&dyn DeviceDriver> = match outcome {
                    MountOutcome::Matched { driver, .. } => {
                        driver.init(dev_addr, 0);
                        Some(driver)
                    }
                    MountOutcome::GenericHid { .. } => {
                        drivers.generic_hid.init(dev_addr, 0);
                        Some(&drivers.generic_hid)
                    }
                    MountOutcome::Unknown => {
                        defmt::debug!("unknown device {:04x}:{:04x}", vid, pid);
                        None
                    }
                };
                let _ = mounted.push(MountedDevice { dev_addr, driver });

                if let (Some(driver), Ok(mut hid)) = (driver, Hid::new(&stack, device)) {
                    spawn_report_pump(&mut hid, dev_addr, driver, events, rumble).await;
                }
            }
            DeviceEvent::Disconnect(addresses) => {
                mounted.retain(|m| {
                    let gone = addresses.contains(m.dev_addr as usize);
                    if gone {
                        defmt::debug!("device disconnect {}", m.dev_addr);
                    }
                    !gone
                });
            }
        }
    }
}

/// Drains one HID device's report stream until it disconnects, decoding
/// each report through the single driver bound to this device at mount
/// time and forwarding the resulting event to the console wire task.
/// Concurrently, polls that same driver's `task()` every [`OUTPUT_TICK`]
/// for rumble/LED output, feeding it whatever rumble state the console
/// wire task last published (GameCube's Joybus poll carries a
/// console-requested motor bit; every other target leaves it at rest).
async fn spawn_report_pump(
    hid: &mut Hid<'_, impl cotton_usb_host::usb_bus::Bus>,
    dev_addr: u8,
    driver: &dyn DeviceDriver,
    events: &'static Signal<CriticalSectionRawMutex, InputEvent>,
    rumble: &'static Signal<CriticalSectionRawMutex, bool>,
) {
    use futures_util::StreamExt;
    let mut reports = core::pin::pin!(hid.handle());
    let mut ticker = Ticker::every(OUTPUT_TICK);
    let mut last_rumble = false;

    loop {
        match embassy_futures::select::select(reports.next(), ticker.next()).await {
            embassy_futures::select::Either::First(Some(report)) => {
                // instance 0 until multi-instance HID (e.g. GameCube
                // adapter's four logical ports) is plumbed through
                // cotton-usb-host's report ID.
                if let Some(event) = driver.process(dev_addr, 0, &report.bytes) {
                    events.signal(event);
                }
            }
            embassy_futures::select::Either::First(None) => return,
            embassy_futures::select::Either::Second(()) => {
                if let Some(new_state) = rumble.try_take() {
                    last_rumble = new_state;
                }
                let request = DriverOutputRequest {
                    player_index: 0,
                    rumble: u8::from(last_rumble),
                    ..Default::default()
                };
                if let Some(report) = driver.task(dev_addr, 0, request) {
                    // cotton-usb-host has no demonstrated output-transfer
                    // API in this codebase's reference material (only
                    // read-side HID reports); actually issuing this as a
                    // SET_REPORT/interrupt-OUT transfer needs that API.
                    defmt::trace!(
                        "output report for dev {}: id={:x} len={}",
                        dev_addr,
                        report.report_id,
                        report.as_slice().len()
                    );
                }
            }
        }
    }
}

fn async_delay(ms: usize) -> impl core::future::Future<Output = ()> {
    Timer::after_millis(ms as u64)
}
