//! Arthaflow - Checkout and Subscription Activation Service
//!
//! This crate orchestrates the multi-step checkout flow for the Arthaflow
//! advisory platform: plan selection, inline authentication, e-mandate
//! consent, order creation against the payment gateway, hosted-checkout
//! handoff, and post-return verification.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
