// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # E-bike Controller Firmware
//!
//! Board support for the e-bike controller, written in Rust, targeting an STM32F767 MCU. The
//! applications themselves live in `ebike-control`; the CAN variable dictionary in `can-dict`.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around USART, CAN, ADC, SysTick, IWDG and the pin map |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run -p ebike --release
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

pub mod hw;
