#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![allow(dead_code)]

#[cfg(target_os = "none")]
mod firmware {
    use cortex_m_rt::entry;
    use panic_halt as _;

    use hal::{
        pac,
        prelude::*,
        serial::{Config, Serial},
        spi::{Mode, Phase, Polarity, Spi},
    };
    use stm32f7xx_hal as hal;

    use taparray::board;
    use taparray::control::{Controller, Scheduler};
    use taparray::drivers::SpiChainPort;
    use taparray::hw::{ChipSelect, Led, SpiBus, TickClock, Usart};
    use taparray::protocol::{CommitPolicy, DecoderConfig, DecoderEvent, StateLayout};

    #[cfg(not(feature = "register-chain"))]
    use taparray::drivers::DirectChain as Chain;
    #[cfg(feature = "register-chain")]
    use taparray::drivers::RegisterChain as Chain;

    /// State-frame byte mapping for the selected topology: 9 bridges per
    /// board with the direct chips, 6 bits per byte with the register chips.
    #[cfg(not(feature = "register-chain"))]
    const STATE_LAYOUT: StateLayout = StateLayout::SplitNine;
    #[cfg(feature = "register-chain")]
    const STATE_LAYOUT: StateLayout = StateLayout::Flat { bits_per_byte: 6 };

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();
        let mut cp = cortex_m::Peripherals::take().unwrap();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze();
        let mut apb2 = rcc.apb2;

        // GPIO
        let gpioa = dp.GPIOA.split();
        let gpiod = dp.GPIOD.split();
        let gpioe = dp.GPIOE.split();

        // LEDs
        let mut led_ready = Led::active_low(gpiod.pd9);
        let mut led_state = Led::active_low(gpiod.pd10);

        // USART1: host protocol stream in, diagnostics out
        let tx = gpioa.pa9.into_alternate::<7>();
        let rx = gpioa.pa10.into_alternate::<7>();
        let usart_cfg = Config {
            baud_rate: 115_200.bps(),
            ..Default::default()
        };
        let serial = Serial::new(dp.USART1, (tx, rx), &clocks, usart_cfg);
        let mut usart = Usart::new(serial);

        // SPI4 to the driver chain, mode 1 (CPOL=0, CPHA=1) per datasheet
        let sck = gpioe.pe12.into_alternate::<5>();
        let miso = gpioe.pe13.into_alternate::<5>();
        let mosi = gpioe.pe14.into_alternate::<5>();
        let spi_mode = Mode {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnSecondTransition,
        };
        let spi4_raw = Spi::new(dp.SPI4, (sck, miso, mosi));
        let spi4_enabled = spi4_raw.enable::<u8>(spi_mode, 1.MHz(), &clocks, &mut apb2);
        let spi_bus = SpiBus::new(spi4_enabled);

        // One chip-select line brackets the whole daisy chain
        let cs = ChipSelect::active_low(gpioe.pe4);
        let mut port = SpiChainPort::new(spi_bus, cs);

        // Driver enable, active high, held for the device lifetime
        let mut ncv_enable = gpioe.pe10.into_push_pull_output();
        ncv_enable.set_high();

        let encoder = Chain::new(board::TOTAL_CHIPS);
        let mut clock = TickClock::new(
            &mut cp.DCB,
            &mut cp.DWT,
            clocks.sysclk().raw(),
            board::TICKS_PER_SEC,
        );
        let mut controller: Controller<{ board::TOTAL_BRIDGES }> = Controller::new(
            DecoderConfig {
                layout: STATE_LAYOUT,
                commit: CommitPolicy::Incremental,
                clear_on_start: false,
            },
            Scheduler::new(),
        );

        led_ready.on();
        usart.println("ready");

        loop {
            let byte = usart.try_read();
            let now = clock.now();
            // The SPI transfer cannot fail in master mode with CS held by us;
            // if it ever does, drop the frame and keep the loop alive.
            let event = controller.poll(byte, now, &encoder, &mut port).ok().flatten();

            match event {
                Some(DecoderEvent::StateReady) => led_state.toggle(),
                Some(DecoderEvent::FrameOverrun) => {
                    usart.println("error: state frame exceeds configured board count");
                }
                Some(DecoderEvent::ConfigReady(_cfg)) => {
                    #[cfg(feature = "debug")]
                    {
                        usart.write_str("conf: ");
                        usart.print_u32(_cfg.up_pulse as u32);
                        usart.write_str(" ");
                        usart.print_u32(_cfg.inter_pulse as u32);
                        usart.write_str(" ");
                        usart.print_u32(_cfg.down_pulse as u32);
                        usart.write_str(" ");
                        usart.print_u32(_cfg.pause as u32);
                        usart.println("");
                    }
                }
                None => {}
            }
        }
    }
}

// Host builds compile an empty main so `cargo test` can link this binary.
#[cfg(not(target_os = "none"))]
fn main() {}
