// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use cortex_m_rt::{entry, exception};
use panic_halt as _;

use hal::{
    can::Can,
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use can_dict::{Dictionary, Dispatcher, Outcome, Publisher, PublisherConfig};
use ebike_control::{
    config::{AppConfig, ASSIST_PERIOD_MS, LIGHTS_PERIOD_MS},
    register_all,
    terminal::{self, LineBuffer},
    Assist, Interval, Lights, VescMotor, Vars,
};
use log::{info, warn, LevelFilter};

use ebike::hw::{
    self,
    can::BTR_500K_16MHZ,
    logger::{self, with_console},
    Adc, BoardPins, CanBus, IndependentWatchdog, SysTickClock, Throttle, Usart,
};

const CONFIG: AppConfig = AppConfig::DEFAULT;
const WATCHDOG_TIMEOUT_MS: u32 = 100;
const HEARTBEAT_MS: u32 = 500;
/// ADC1 channel of the throttle input (PA3).
const THROTTLE_CHANNEL: u8 = 3;

static VARS: Vars = Vars::new(&CONFIG);

#[exception]
fn SysTick() {
    hw::clock::tick();
}

#[entry]
fn main() -> ! {
    // Peripherals
    let (Some(dp), Some(cp)) = (pac::Peripherals::take(), cortex_m::Peripherals::take()) else {
        loop {
            cortex_m::asm::nop();
        }
    };

    // Clocks
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let clock = SysTickClock::start(cp.SYST, clocks.sysclk().raw());

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);
    let mut heartbeat_led = pins.leds.blue;
    let mut status_led = pins.leds.green;

    // USART3 (ST-LINK VCP) carries both the log and the terminal
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART3, (pins.usart3.tx, pins.usart3.rx), &clocks, usart_cfg);
    logger::init(Usart::new(serial), LevelFilter::Info);
    info!("ebike: booting, node 0x{:02X}", CONFIG.controller_id);

    // CAN1
    let can1 = Can::new(dp.CAN1, &mut rcc.apb1, (pins.can1.tx, pins.can1.rx));
    let mut can = CanBus::new(can1, BTR_500K_16MHZ, false, false);
    can.accept_all();

    // Dictionary
    let mut dict = Dictionary::new(clock);
    let report = register_all(&mut dict, &VARS);
    if report.all_ok() {
        status_led.set_high();
    }
    let dict = dict;

    let mut publisher = Publisher::new(PublisherConfig::new(CONFIG.controller_id));
    let dispatcher = Dispatcher::new(CONFIG.controller_id);

    // Apps
    let mut motor = VescMotor::new(CONFIG.motor_id, &CONFIG.bike, &VARS.bike);
    let mut assist = Assist::new(CONFIG.adc, &VARS.assist, &VARS.pedal, &VARS.bike);
    let lights = Lights::new(&VARS.lights);
    let _throttle_pin = pins.bike.throttle;
    let mut throttle = Throttle::new(Adc::adc1(dp.ADC1), THROTTLE_CHANNEL);
    let mut light_out = pins.bike.light;
    let pas = pins.bike.pas;
    let mut plot = ();
    assist.start(&mut plot);

    let mut assist_every = Interval::new(ASSIST_PERIOD_MS);
    let mut lights_every = Interval::new(LIGHTS_PERIOD_MS);
    let mut heartbeat_every = Interval::new(HEARTBEAT_MS);
    let mut lines = LineBuffer::new();

    let mut wdt = IndependentWatchdog::start(dp.IWDG, WATCHDOG_TIMEOUT_MS);

    loop {
        let now = dict.now_ms();

        // Receive path: dictionary requests and VESC status
        while let Some(rx) = can.try_receive() {
            let frame = match rx {
                Ok(frame) => frame,
                Err(_overrun) => {
                    warn!("can: receive overrun");
                    continue;
                }
            };
            if dispatcher.handle(&dict, &frame, &mut can) != Outcome::Ignored {
                continue;
            }
            if let Err(e) = motor.handle_frame(&frame) {
                warn!("vesc: bad status frame: {:?}", e);
            }
        }

        if assist_every.due(now) {
            assist.step(now, &pas, &mut throttle, &mut motor, &mut wdt, &mut plot);
            VARS.telemetry.update(&motor);
            if let Err(e) = motor.flush(&mut can) {
                warn!("vesc: command not sent: {:?}", e);
            }
        }

        if lights_every.due(now) {
            lights.step(&mut light_out, &mut wdt);
        }

        publisher.poll(&dict, &mut can);

        // Terminal
        while let Some(Some(byte)) = with_console(|c| c.try_read_byte()) {
            if let Some(line) = lines.push(byte) {
                with_console(|c| terminal::execute(&line, &lights, &dict, c));
            }
        }

        if heartbeat_every.due(now) {
            let _ = heartbeat_led.toggle();
        }
    }
}
