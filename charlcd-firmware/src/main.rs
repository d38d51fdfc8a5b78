//! charlcd Backpack Firmware
//!
//! Firmware for the STM32F042F6 character LCD backpack. Drives one
//! HD44780-class controller, or two stitched into a 40x4 display, as an
//! I2C slave commanded byte by byte.
//!
//! # Pinout (TSSOP20)
//!
//! | Signal            | Pin       |
//! |-------------------|-----------|
//! | LCD D4..D7        | PA0..PA3  |
//! | LCD RS / RW       | PA4 / PA5 |
//! | LCD E1 / E2       | PA6 / PA7 |
//! | MCP4013 CS / U/D  | PA9 / PA10|
//! | Backlight (TIM3_CH4) | PB1    |
//! | I2C1 SDA / SCL    | PF0 / PF1 |

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::bind_interrupts;
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Flex, Level, Output, OutputType, Speed};
use embassy_stm32::i2c::{
    self, Address, I2c, OwnAddresses, SendStatus, SlaveAddrConfig, SlaveCommand, SlaveCommandKind,
};
use embassy_stm32::mode::Async;
use embassy_stm32::peripherals::{DMA1_CH2, DMA1_CH3, I2C1, PF0, PF1};
use embassy_stm32::time::khz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::Peri;
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use charlcd_core::config::Settings;
use charlcd_core::display::DisplaySession;
use charlcd_core::dispatch::Dispatcher;
use charlcd_drivers::backlight::PwmBacklight;
use charlcd_drivers::contrast::Mcp4013;
use charlcd_drivers::lcd::{Hd44780, Hd44780Bus};
use charlcd_hal_stm32f0::flash::Stm32FlashStorage;
use charlcd_hal_stm32f0::gpio::{Stm32Flex, Stm32Output};
use charlcd_hal_stm32f0::i2c::{PendingReply, SlaveLink, SlaveTransport, RX_QUEUE, TX_QUEUE};

bind_interrupts!(struct Irqs {
    I2C1 => i2c::EventInterruptHandler<I2C1>, i2c::ErrorInterruptHandler<I2C1>;
});

/// Byte queues between the bus task and the dispatcher
static LINK: SlaveLink = SlaveLink::new();

/// Backlight PWM frequency, above the audible range
const BACKLIGHT_PWM_KHZ: u32 = 20;

/// Bus silence after boot before the address banner is shown
#[cfg(feature = "show-address")]
const SHOW_ADDRESS_AFTER: Duration = Duration::from_secs(2);

/// Poll interval while waiting for the first bus byte
#[cfg(feature = "show-address")]
const SHOW_ADDRESS_POLL: Duration = Duration::from_millis(10);

/// I2C peripheral and pins, kept so the slave can be re-created on a new
/// own address
struct BusResources {
    i2c: Peri<'static, I2C1>,
    scl: Peri<'static, PF1>,
    sda: Peri<'static, PF0>,
    tx_dma: Peri<'static, DMA1_CH2>,
    rx_dma: Peri<'static, DMA1_CH3>,
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("charlcd firmware starting...");

    let p = embassy_stm32::init(Default::default());

    // Settings first: the bus address depends on them
    let mut store = Stm32FlashStorage::new(Flash::new_blocking(p.FLASH));
    let settings = Settings::load(&mut store).await;
    info!(
        "Settings: address={}, brightness={}, contrast={}, safe_mode={}",
        settings.slave_address, settings.brightness, settings.contrast, settings.safe_mode
    );

    let bus = BusResources {
        i2c: p.I2C1,
        scl: p.PF1,
        sda: p.PF0,
        tx_dma: p.DMA1_CH2,
        rx_dma: p.DMA1_CH3,
    };
    spawner.spawn(bus_task(bus, settings.slave_address)).unwrap();

    // Shared LCD bus, one enable line per controller
    let lcd_bus = RefCell::new(Hd44780Bus::new(
        Stm32Output::new(Output::new(p.PA4, Level::Low, Speed::Low)),
        Stm32Output::new(Output::new(p.PA5, Level::Low, Speed::Low)),
        [
            Stm32Flex::new(Flex::new(p.PA0)),
            Stm32Flex::new(Flex::new(p.PA1)),
            Stm32Flex::new(Flex::new(p.PA2)),
            Stm32Flex::new(Flex::new(p.PA3)),
        ],
        Delay,
    ));
    let mut primary = Hd44780::new(
        &lcd_bus,
        Stm32Output::new(Output::new(p.PA6, Level::Low, Speed::Low)),
    );
    let mut secondary = Hd44780::new(
        &lcd_bus,
        Stm32Output::new(Output::new(p.PA7, Level::Low, Speed::Low)),
    );
    primary.init();
    secondary.init();
    info!("LCD controllers in 4-bit mode");

    let pwm = SimplePwm::new(
        p.TIM3,
        None,
        None,
        None,
        Some(PwmPin::new(p.PB1, OutputType::PushPull)),
        khz(BACKLIGHT_PWM_KHZ),
        CountingMode::EdgeAlignedUp,
    );
    let mut channel = pwm.split().ch4;
    channel.enable();
    let backlight = PwmBacklight::mono(channel);

    let contrast = Mcp4013::new(
        Stm32Output::new(Output::new(p.PA9, Level::High, Speed::Low)),
        Stm32Output::new(Output::new(p.PA10, Level::High, Speed::Low)),
        Delay,
    );

    let mut dispatcher = Dispatcher::new(
        SlaveTransport::new(&LINK),
        DisplaySession::new(primary, Some(secondary)),
        backlight,
        contrast,
        store,
        settings,
    );
    dispatcher.boot();

    #[cfg(feature = "copyright-glyphs")]
    load_copyright_glyphs(&mut dispatcher);

    #[cfg(feature = "show-address")]
    {
        let mut waited = Duration::from_ticks(0);
        while !dispatcher.has_pending() && waited < SHOW_ADDRESS_AFTER {
            Timer::after(SHOW_ADDRESS_POLL).await;
            waited += SHOW_ADDRESS_POLL;
        }
        if !dispatcher.has_pending() {
            dispatcher.show_address();
        }
    }

    info!("Ready for commands");
    dispatcher.run().await
}

#[cfg(feature = "copyright-glyphs")]
fn load_copyright_glyphs<T, C, B, K, S>(dispatcher: &mut Dispatcher<T, C, B, K, S>)
where
    T: charlcd_hal::I2cSlave,
    C: charlcd_core::traits::TextController,
    B: charlcd_core::traits::BacklightOutput,
    K: charlcd_core::traits::ContrastOutput,
    S: charlcd_hal::FlashStorage,
{
    for (slot, pattern) in charlcd_protocol::COPYRIGHT_GLYPHS.iter().enumerate() {
        dispatcher.session_mut().define_glyph(slot as u8, pattern);
    }
}

/// I2C slave task
///
/// Forwards master writes into the receive queue and answers master reads
/// from the reply queue. A new own address re-creates the peripheral.
#[embassy_executor::task]
async fn bus_task(mut bus: BusResources, mut address: u8) -> ! {
    let mut pending = PendingReply::new();

    loop {
        let addr_config = SlaveAddrConfig {
            addr: OwnAddresses::OA1(Address::SevenBit(address)),
            general_call: false,
        };
        let mut device = I2c::new(
            bus.i2c.reborrow(),
            bus.scl.reborrow(),
            bus.sda.reborrow(),
            Irqs,
            bus.tx_dma.reborrow(),
            bus.rx_dma.reborrow(),
            i2c::Config::default(),
        )
        .into_slave_multimaster(addr_config);
        info!("I2C slave listening on {}", address);

        address = serve(&mut device, &mut pending).await;
        info!("I2C slave address changed to {}", address);
    }
}

/// Serve transactions until the dispatcher requests a new address
async fn serve(device: &mut I2c<'_, Async, i2c::MultiMaster>, pending: &mut PendingReply) -> u8 {
    let mut rx = [0u8; RX_QUEUE];
    let mut frame = [0u8; TX_QUEUE];

    loop {
        let command = match select(device.listen(), LINK.address_changed()).await {
            Either::First(Ok(command)) => command,
            Either::First(Err(e)) => {
                warn!("I2C listen error: {:?}", e);
                continue;
            }
            Either::Second(address) => return address,
        };

        match command {
            SlaveCommand {
                kind: SlaveCommandKind::Write,
                ..
            } => match device.respond_to_write(&mut rx).await {
                Ok(len) => {
                    LINK.deliver(&rx[..len]);
                }
                Err(e) => warn!("I2C write error: {:?}", e),
            },
            SlaveCommand {
                kind: SlaveCommandKind::Read,
                ..
            } => {
                LINK.take_replies(pending);
                let offered = pending.frame(&mut frame);
                let len = offered.len();
                match device.respond_to_read(offered).await {
                    Ok(SendStatus::Done) => pending.consumed(len),
                    Ok(SendStatus::LeftoverBytes(left)) => {
                        pending.consumed(len.saturating_sub(left))
                    }
                    Err(e) => warn!("I2C read error: {:?}", e),
                }
            }
        }
    }
}
