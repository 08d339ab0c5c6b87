//! Standby entry and wake-cause classification for the STM32G0 target.
//!
//! The node never loops in memory: once the pipeline signals completion the
//! RTC wakeup timer is armed and the core drops into Standby, losing all
//! SRAM. The next boot re-enters through the reset vector with the PWR
//! standby flag set — that flag is the entire wake-cause contract consumed
//! by `monitor-core`.

#![cfg(target_os = "none")]

use core::ptr;
use core::time::Duration;

use monitor_core::boot::WakeCause;

// PWR register block.
const PWR_BASE: u32 = 0x4000_7000;
const PWR_CR1: *mut u32 = PWR_BASE as *mut u32;
const PWR_SR1: *const u32 = (PWR_BASE + 0x10) as *const u32;
const PWR_SCR: *mut u32 = (PWR_BASE + 0x18) as *mut u32;

/// CR1.DBP unlocks the backup domain for RTC configuration.
const CR1_DBP: u32 = 1 << 8;
/// CR1.LPMS low-power mode selection field.
const CR1_LPMS_MASK: u32 = 0b111;
/// LPMS encoding for Standby.
const CR1_LPMS_STANDBY: u32 = 0b011;
/// SR1.SBF: the previous low-power exit came out of Standby.
const SR1_SBF: u32 = 1 << 8;
/// SCR.CSBF clears the standby flag; the low bits clear the wakeup flags.
const SCR_CLEAR_ALL: u32 = (1 << 8) | 0x3F;

// RTC register block.
const RTC_BASE: u32 = 0x4000_2800;
const RTC_ICSR: *const u32 = (RTC_BASE + 0x0C) as *const u32;
const RTC_WUTR: *mut u32 = (RTC_BASE + 0x14) as *mut u32;
const RTC_CR: *mut u32 = (RTC_BASE + 0x18) as *mut u32;
const RTC_WPR: *mut u32 = (RTC_BASE + 0x24) as *mut u32;
const RTC_SCR: *mut u32 = (RTC_BASE + 0x5C) as *mut u32;

/// ICSR.WUTWF: the wakeup timer registers accept writes.
const ICSR_WUTWF: u32 = 1 << 2;
/// CR.WUTE enables the wakeup timer, CR.WUTIE its wakeup interrupt.
const CR_WUTE: u32 = 1 << 10;
const CR_WUTIE: u32 = 1 << 14;
/// CR.WUCKSEL = 0b100 clocks the timer from ck_spre (1 Hz).
const CR_WUCKSEL_MASK: u32 = 0b111;
const CR_WUCKSEL_SPRE: u32 = 0b100;
/// SCR.CWUTF clears a pending wakeup-timer event.
const SCR_CWUTF: u32 = 1 << 2;

/// Keys disabling RTC register write protection.
const WPR_KEY_1: u32 = 0xCA;
const WPR_KEY_2: u32 = 0x53;

/// Classifies the current boot from the PWR standby flag.
///
/// Must run once, early: the flags are cleared so the next boot starts from
/// a clean classification.
pub fn wake_cause() -> WakeCause {
    let standby = unsafe { ptr::read_volatile(PWR_SR1) } & SR1_SBF != 0;
    unsafe { ptr::write_volatile(PWR_SCR, SCR_CLEAR_ALL) };
    if standby {
        WakeCause::Timer
    } else {
        WakeCause::Cold
    }
}

/// Arms a one-shot timer wake after `sleep_for` and enters Standby.
///
/// Never returns: the next thing this firmware does is reset.
pub fn enter_standby(sleep_for: Duration) -> ! {
    // ck_spre ticks at 1 Hz, so the reload is whole seconds minus one.
    let seconds = sleep_for.as_secs().clamp(1, u64::from(u16::MAX));
    let reload = u32::try_from(seconds - 1).unwrap_or(u32::from(u16::MAX));

    unsafe {
        // The RTC lives in the backup domain; unlock it before touching CR.
        let cr1 = ptr::read_volatile(PWR_CR1.cast_const());
        ptr::write_volatile(PWR_CR1, cr1 | CR1_DBP);

        ptr::write_volatile(RTC_WPR, WPR_KEY_1);
        ptr::write_volatile(RTC_WPR, WPR_KEY_2);

        // Reprogramming requires the timer off and WUTWF reporting ready.
        let cr = ptr::read_volatile(RTC_CR.cast_const());
        ptr::write_volatile(RTC_CR, cr & !CR_WUTE);
        while ptr::read_volatile(RTC_ICSR) & ICSR_WUTWF == 0 {}

        ptr::write_volatile(RTC_WUTR, reload);
        ptr::write_volatile(RTC_SCR, SCR_CWUTF);

        let cr = ptr::read_volatile(RTC_CR.cast_const());
        let cr = (cr & !CR_WUCKSEL_MASK) | CR_WUCKSEL_SPRE | CR_WUTE | CR_WUTIE;
        ptr::write_volatile(RTC_CR, cr);

        // Re-lock the RTC registers.
        ptr::write_volatile(RTC_WPR, 0xFF);

        // Select Standby and commit on the next WFI.
        let cr1 = ptr::read_volatile(PWR_CR1.cast_const());
        ptr::write_volatile(PWR_CR1, (cr1 & !CR1_LPMS_MASK) | CR1_LPMS_STANDBY);

        let mut peripherals = cortex_m::Peripherals::steal();
        peripherals.SCB.set_sleepdeep();
    }

    loop {
        cortex_m::asm::wfi();
    }
}
