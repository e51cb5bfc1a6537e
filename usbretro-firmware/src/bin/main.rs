#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::PIO0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
#[cfg(any(feature = "console-pce", feature = "console-loopy", feature = "console-nuon", feature = "console-3do", feature = "console-xboxone"))]
use embassy_futures::select::{select, Either};
#[cfg(any(feature = "console-pce", feature = "console-loopy", feature = "console-nuon", feature = "console-3do"))]
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use usbretro_core::event::InputEvent;
use usbretro_console::Profile;
#[cfg(not(feature = "console-xboxone"))]
use usbretro_firmware::host::usb_host_task;
#[cfg(any(feature = "console-pce", feature = "console-loopy", feature = "console-nuon", feature = "console-3do"))]
use usbretro_core::router::Router;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    #[cfg(feature = "console-xboxone")]
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<embassy_rp::peripherals::USB>;
    #[cfg(feature = "uart-mirror")]
    UART1_IRQ => embassy_rp::uart::InterruptHandler<embassy_rp::peripherals::UART1>;
});

/// Latest canonical event from the USB host task, consumed by core0's
/// composition step every wire tick.
static LATEST_INPUT: Signal<CriticalSectionRawMutex, InputEvent> = Signal::new();

/// Latest rumble/motor bit requested by the console side, published by
/// whichever console wire task can observe it (currently only
/// GameCube's Joybus Poll command carries one) and consumed by the host
/// task's output-report pump.
#[cfg(not(feature = "console-xboxone"))]
static RUMBLE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

static mut CORE1_STACK: Stack<8192> = Stack::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("USBRetro firmware starting");
    let p = embassy_rp::init(embassy_rp::config::Config::default());
    let profile = Profile::DEFAULT;

    #[cfg(not(feature = "console-xboxone"))]
    {
        spawner.spawn(usb_host_task(&LATEST_INPUT, &RUMBLE)).unwrap();
    }

    #[cfg(feature = "uart-mirror")]
    {
        let mut uart_config = embassy_rp::uart::Config::default();
        uart_config.baudrate = 115_200;
        let uart = embassy_rp::uart::Uart::new(
            p.UART1, p.PIN_8, p.PIN_9, Irqs, p.DMA_CH2, p.DMA_CH3, uart_config,
        );
        let (tx, _rx) = uart.split();
        spawner
            .spawn(usbretro_firmware::uart_mirror::mirror_task(tx, &LATEST_INPUT))
            .unwrap();
    }

    #[cfg(feature = "console-ngc")]
    {
        static GC_REPORT: Signal<CriticalSectionRawMutex, usbretro_console::gamecube::GcReport> =
            Signal::new();

        let pio0 = p.PIO0;
        let data_pin = p.PIN_28;
        let sys_clock_hz = embassy_rp::clocks::clk_sys_freq();

        spawn_core1(
            p.CORE1,
            unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
            move || {
                let mut pio = embassy_rp::pio::Pio::new(pio0, Irqs);
                let joybus = usbretro_firmware::joybus::JoybusPio::new(
                    &mut pio.common,
                    pio.sm0,
                    data_pin,
                    sys_clock_hz,
                );
                static EXECUTOR1: StaticCell<embassy_executor::Executor> = StaticCell::new();
                let executor1 = EXECUTOR1.init(embassy_executor::Executor::new());
                executor1.run(|spawner| {
                    spawner
                        .spawn(gamecube_wire_task(joybus, &GC_REPORT, &RUMBLE))
                        .unwrap();
                });
            },
        );

        loop {
            let event = LATEST_INPUT.wait().await;
            let report = usbretro_console::gamecube::compose(
                &event,
                profile.gc_stick_scale,
                profile.gc_trigger_threshold,
            );
            GC_REPORT.signal(report);
        }
    }

    #[cfg(feature = "console-xboxone")]
    {
        let driver = embassy_rp::usb::Driver::new(p.USB, Irqs);
        let usb_config = usbretro_firmware::gip_output::usb_config();

        static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
        static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
        static MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
        static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

        let mut builder = embassy_usb::Builder::new(
            driver,
            usb_config,
            CONFIG_DESC.init([0; 256]),
            BOS_DESC.init([0; 256]),
            MSOS_DESC.init([0; 256]),
            CONTROL_BUF.init([0; 64]),
        );

        let mut gip = usbretro_firmware::gip_output::GipClass::new(&mut builder);
        let usb_device = builder.build();

        spawner.spawn(usb_device_task(usb_device)).unwrap();

        gip.wait_ready().await;
        gip.announce().await;
        let mut relay = usbretro_console::xboxone::NoAuthRelay;

        loop {
            match select(LATEST_INPUT.wait(), gip.read_command()).await {
                Either::First(event) => {
                    let report = usbretro_console::xboxone::compose_input_report(&event);
                    let mut payload = [0u8; 16];
                    payload[0..2].copy_from_slice(&report.buttons.to_le_bytes());
                    payload[2..4].copy_from_slice(&report.left_trigger.to_le_bytes());
                    payload[4..6].copy_from_slice(&report.right_trigger.to_le_bytes());
                    payload[6..8].copy_from_slice(&report.left_x.to_le_bytes());
                    payload[8..10].copy_from_slice(&report.left_y.to_le_bytes());
                    payload[10..12].copy_from_slice(&report.right_x.to_le_bytes());
                    payload[12..14].copy_from_slice(&report.right_y.to_le_bytes());
                    gip.send_input_report(&payload).await;
                }
                Either::Second(Some((command, payload))) => match command {
                    usbretro_console::xboxone::GipCommand::DeviceDescriptor => {
                        gip.send_device_descriptor().await;
                    }
                    usbretro_console::xboxone::GipCommand::Authenticate
                    | usbretro_console::xboxone::GipCommand::AuthenticateFinal => {
                        gip.relay_auth(command, &payload, &mut relay).await;
                    }
                    usbretro_console::xboxone::GipCommand::Announce
                    | usbretro_console::xboxone::GipCommand::InputReport => {}
                },
                Either::Second(None) => {}
            }
        }
    }

    #[cfg(any(feature = "console-pce", feature = "console-loopy", feature = "console-nuon", feature = "console-3do"))]
    {
        // PC-Engine / Loopy / Nuon / 3DO share the request-reply WireBusPio
        // shape; each only differs in pin assignment, player count, and
        // which usbretro_console composer produces the frame to push.
        let pio0 = p.PIO0;
        let select_pin = p.PIN_27;
        let data_pin = p.PIN_28;
        let sys_clock_hz = embassy_rp::clocks::clk_sys_freq();

        static WIRE_FRAME: Signal<CriticalSectionRawMutex, heapless::Vec<u8, 18>> = Signal::new();

        spawn_core1(
            p.CORE1,
            unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
            move || {
                let mut pio = embassy_rp::pio::Pio::new(pio0, Irqs);
                let bus = usbretro_firmware::wire_pio::WireBusPio::new(
                    &mut pio.common,
                    pio.sm0,
                    select_pin,
                    data_pin,
                    sys_clock_hz,
                );
                static EXECUTOR1: StaticCell<embassy_executor::Executor> = StaticCell::new();
                let executor1 = EXECUTOR1.init(embassy_executor::Executor::new());
                executor1.run(|spawner| {
                    spawner.spawn(generic_wire_task(bus, &WIRE_FRAME)).unwrap();
                });
            },
        );

        // One router instance per target, sized to how many player slots
        // that console's bus actually multiplexes; events arrive on the
        // single LATEST_INPUT mailbox tagged with the originating
        // device's (dev_addr, instance), which the router resolves into
        // a stable player slot.
        #[cfg(feature = "console-pce")]
        let mut router: Router<1, 5> = Router::new();
        #[cfg(feature = "console-loopy")]
        let mut router: Router<1, 4> = Router::new();
        #[cfg(feature = "console-nuon")]
        let mut router: Router<1, 4> = Router::new();
        #[cfg(feature = "console-3do")]
        let mut router: Router<1, 2> = Router::new();

        #[cfg(feature = "console-pce")]
        let mut scan_state = usbretro_console::pce::ScanState::S3;
        #[cfg(feature = "console-loopy")]
        let mut row = usbretro_console::loopy::Row::Row0;

        // Drives each console's request/reply cycle in the absence of a
        // readable select/clock line on WireBusPio (it only exposes the
        // TX side): pushing a fresh frame at a fixed rate relies on the
        // same stale-tolerant model WireBusPio::push already documents.
        let mut ticker = Ticker::every(Duration::from_micros(50));

        loop {
            match select(LATEST_INPUT.wait(), ticker.next()).await {
                Either::First(event) => {
                    router.submit_input(event);
                }
                Either::Second(()) => {
                    let mut frame: heapless::Vec<u8, 18> = heapless::Vec::new();

                    #[cfg(feature = "console-pce")]
                    {
                        // Turbo autofire and per-player button-mode
                        // switching aren't modeled on this path yet;
                        // every player presents in TwoButton mode with
                        // both turbo lines held off.
                        let buttons = router
                            .get_output(0, 0)
                            .map_or(usbretro_core::Buttons::NONE, |e| e.buttons);
                        let byte = usbretro_console::pce::byte_for_state(
                            scan_state,
                            usbretro_console::pce::ButtonMode::TwoButton,
                            buttons,
                            false,
                            false,
                        );
                        let _ = frame.push(byte);
                        scan_state = scan_state.next();
                    }

                    #[cfg(feature = "console-loopy")]
                    {
                        let (first_idx, second_idx) = row.player_pair();
                        let first = router
                            .get_output(0, first_idx as u8)
                            .map_or(usbretro_core::Buttons::NONE, |e| e.buttons);
                        let second = router
                            .get_output(0, second_idx as u8)
                            .map_or(usbretro_core::Buttons::NONE, |e| e.buttons);
                        let byte = usbretro_console::loopy::compose_row_byte(row, first, second);
                        let _ = frame.push(byte);
                        row = row.next();
                    }

                    #[cfg(feature = "console-nuon")]
                    {
                        let event = router.get_output(0, 0);
                        let buttons = event.map_or(usbretro_core::Buttons::NONE, |e| e.buttons);
                        let analog_byte = event.map_or(0x80, |e| {
                            e.analog[usbretro_core::event::axis::LEFT_X]
                        });
                        frame = usbretro_console::nuon::compose_reply_packet(buttons, analog_byte);
                    }

                    #[cfg(feature = "console-3do")]
                    {
                        let player = |slot: u8| {
                            router
                                .get_output(0, slot)
                                .map_or(usbretro_core::Buttons::NONE, |e| e.buttons)
                        };
                        let reports = [
                            usbretro_console::threedo::compose_joypad(player(0)),
                            usbretro_console::threedo::compose_joypad(player(1)),
                        ];
                        frame = usbretro_console::threedo::compose_chain(reports);
                    }

                    WIRE_FRAME.signal(frame);
                }
            }
        }
    }
}

#[cfg(feature = "console-ngc")]
#[embassy_executor::task]
async fn gamecube_wire_task(
    pio: usbretro_firmware::joybus::JoybusPio<'static, PIO0, 0>,
    latest: &'static Signal<CriticalSectionRawMutex, usbretro_console::gamecube::GcReport>,
    rumble: &'static Signal<CriticalSectionRawMutex, bool>,
) {
    usbretro_firmware::joybus::run(pio, latest, rumble).await;
}

#[cfg(any(feature = "console-pce", feature = "console-loopy", feature = "console-nuon", feature = "console-3do"))]
#[embassy_executor::task]
async fn generic_wire_task(
    mut bus: usbretro_firmware::wire_pio::WireBusPio<'static, PIO0, 0>,
    latest: &'static Signal<CriticalSectionRawMutex, heapless::Vec<u8, 18>>,
) {
    loop {
        let frame = latest.wait().await;
        bus.push_many(&frame);
    }
}

#[cfg(feature = "console-xboxone")]
#[embassy_executor::task]
async fn usb_device_task(
    mut device: embassy_usb::UsbDevice<'static, embassy_rp::usb::Driver<'static, embassy_rp::peripherals::USB>>,
) {
    device.run().await;
}
