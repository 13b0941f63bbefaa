//! Basic ADC support for STM32F7 using direct PAC register access.
//!
//! Thin wrapper around ADC1 with blocking single-channel reads, plus the throttle input built on
//! top of it.
//!
//! Example:
//! ```no_run
//! let adc1 = Adc::adc1(dp.ADC1);
//! let mut throttle = Throttle::new(adc1, 3);
//! let volts = throttle.read_volts();
//! ```

use ebike_control::AnalogInput;
use stm32f7xx_hal::pac;

/// ADC reference voltage.
pub const VREF: f32 = 3.3;
/// Full-scale count of a 12-bit conversion.
pub const FULL_SCALE: f32 = 4095.0;

/// Generic ADC wrapper over a PAC ADCx peripheral.
pub struct Adc<ADC> {
    adc: ADC,
}

/// Trait for reading a single channel from an ADC peripheral.
pub trait AdcRead {
    fn read_channel(&mut self, ch: u8) -> u16;
}

fn configure_common() {
    let common = unsafe { &*pac::ADC_COMMON::ptr() };

    // ADC prescaler: PCLK2 / 4
    common.ccr.modify(|_, w| w.adcpre().div4());
}

fn init_basic_adc(adc: &pac::adc1::RegisterBlock) {
    // Power off to configure
    adc.cr2.modify(|_, w| w.adon().clear_bit());

    // 12-bit, right-aligned, software trigger
    adc.cr1.modify(|_, w| w.res().bits(0b00));
    adc.cr2.modify(|_, w| {
        w.cont().clear_bit();
        w.align().right();
        w.exten().disabled();
        w
    });

    adc.smpr2.modify(|_, w| unsafe { w.bits(0) });

    // Power on
    adc.cr2.modify(|_, w| w.adon().set_bit());
}

impl Adc<pac::ADC1> {
    /// Create and initialize ADC1.
    pub fn adc1(adc1: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        configure_common();
        init_basic_adc(&adc1);

        Self { adc: adc1 }
    }

    /// Read a single channel.
    pub fn read(&self, channel: u8) -> u16 {
        let adc = &self.adc;

        // Longest sample time on the low channels; the throttle has a high source impedance
        if channel <= 9 {
            let shift = 3 * channel as u32;
            adc.smpr2
                .modify(|r, w| unsafe { w.bits(r.bits() | (0b111 << shift)) });
        }

        // Sequence length = 1 conversion
        adc.sqr1.modify(|_, w| w.l().bits(0));
        adc.sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });

        adc.cr2.modify(|_, w| w.swstart().set_bit());
        while adc.sr.read().eoc().bit_is_clear() {}

        adc.dr.read().data().bits()
    }
}

impl AdcRead for Adc<pac::ADC1> {
    fn read_channel(&mut self, ch: u8) -> u16 {
        self.read(ch)
    }
}

/// Throttle potentiometer on one ADC channel.
pub struct Throttle<A: AdcRead> {
    adc: A,
    channel: u8,
}

impl<A: AdcRead> Throttle<A> {
    pub fn new(adc: A, channel: u8) -> Self {
        Self { adc, channel }
    }
}

impl<A: AdcRead> AnalogInput for Throttle<A> {
    fn read_volts(&mut self) -> f32 {
        self.adc.read_channel(self.channel) as f32 * VREF / FULL_SCALE
    }
}
