//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channels, the panel button inputs and the console
//! UART using raw ESP-IDF sys calls, installs the GPIO ISR service, and
//! exposes the register-level helpers the sensor drivers and the hardware
//! adapter need.  Called once from `main()` before the event loop starts.
//!
//! Output pins are not configured here; `main()` hands `esp-idf-hal` pin
//! drivers to [`SwitchedOutput`](super::switched::SwitchedOutput).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::drivers::button::{panel_isr_handler, PanelInput};
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    ConsoleInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::ConsoleInitFailed(rc) => write!(f, "console UART driver install failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_adc()?;
        init_panel_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the event loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::TEMP_ADC_CHANNEL, pins::MOISTURE_ADC_CHANNEL] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=temp, CH{}=moisture)",
        pins::TEMP_ADC_CHANNEL,
        pins::MOISTURE_ADC_CHANNEL
    );
    Ok(())
}

/// Raw 12-bit ADC1 sample.  A failed read returns 0.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── Panel inputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const PANEL_GPIOS: [i32; PanelInput::COUNT] = [
    pins::OVERRIDE_BUTTON_GPIO,
    pins::FAN_BUTTON_GPIO,
    pins::RELAY_BUTTON_GPIO,
    pins::PUMP_BUTTON_GPIO,
];

#[cfg(target_os = "espidf")]
unsafe fn init_panel_inputs() -> Result<(), HwInitError> {
    for &pin in &PANEL_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: panel inputs configured (rising edge)");
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

/// Shared ISR for all four panel pins; `arg` carries the input index.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn panel_gpio_isr(arg: *mut core::ffi::c_void) {
    if let Some(input) = PanelInput::from_index(arg as usize) {
        panel_isr_handler(input);
    }
}

/// Install the per-pin GPIO ISR service and register the panel handlers.
///
/// Only the override line starts enabled; the three actuator toggles stay
/// masked until manual mode enables them.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). The registered handler
    // only pushes into the critical-section guarded event queue.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for input in PanelInput::ALL {
            let pin = PANEL_GPIOS[input as usize];
            let ret = gpio_isr_handler_add(
                pin,
                Some(panel_gpio_isr),
                input as usize as *mut core::ffi::c_void,
            );
            if ret != ESP_OK {
                return Err(HwInitError::IsrInstallFailed(ret));
            }
            gpio_intr_disable(pin);
        }
        gpio_intr_enable(pins::OVERRIDE_BUTTON_GPIO);

        info!("hw_init: ISR service installed (override live, toggles masked)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

/// Unmask or mask the rising-edge interrupts of the three actuator
/// toggle buttons.  The override line is never touched.
#[cfg(target_os = "espidf")]
pub fn set_manual_button_interrupts(enabled: bool) {
    for input in [PanelInput::Fan, PanelInput::Relay, PanelInput::Pump] {
        let pin = PANEL_GPIOS[input as usize];
        // SAFETY: pins were configured and handlers registered in
        // init_isr_service(); enable/disable are register writes.
        unsafe {
            if enabled {
                gpio_intr_enable(pin);
            } else {
                gpio_intr_disable(pin);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn set_manual_button_interrupts(_enabled: bool) {}

// ── Console UART ──────────────────────────────────────────────

/// Route console stdin through the interrupt-driven UART driver so that
/// reads block instead of returning `WouldBlock`.
#[cfg(target_os = "espidf")]
pub fn init_console_input() -> Result<(), HwInitError> {
    let uart = CONFIG_ESP_CONSOLE_UART_NUM as i32;
    // SAFETY: called once from main() before the console thread starts.
    unsafe {
        let ret = uart_driver_install(uart, 256, 0, 0, core::ptr::null_mut(), 0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::ConsoleInitFailed(ret));
        }
        esp_vfs_dev_uart_use_driver(uart);
    }
    info!("hw_init: console UART{} in blocking mode", uart);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_console_input() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): console UART setup skipped");
    Ok(())
}
