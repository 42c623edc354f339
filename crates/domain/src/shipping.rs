//! Fixed carrier rate table.
//!
//! Rates are flat per shipment, quoted in rupiah. The pickup option is free
//! and is the wizard default.

use std::str::FromStr;

use butik_core::AppError;
use serde::{Deserialize, Serialize};

/// Shipping method selected during checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShippingMethod {
    /// In-store pickup, free of charge.
    AmbilDiButik,
    /// JNE regular service.
    JneReg,
    /// JNE next-day service.
    JneYes,
    /// SiCepat regular service.
    SicepatReg,
    /// SiCepat express service.
    SicepatBest,
    /// J&T Express.
    JntExpress,
    /// AnterAja.
    AnterAja,
}

impl ShippingMethod {
    /// Returns the storefront display name, which is also the stored value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmbilDiButik => "Ambil di Butik",
            Self::JneReg => "JNE REG",
            Self::JneYes => "JNE YES",
            Self::SicepatReg => "SiCepat REG",
            Self::SicepatBest => "SiCepat BEST",
            Self::JntExpress => "J&T Express",
            Self::AnterAja => "AnterAja",
        }
    }

    /// Returns the flat shipping cost in rupiah.
    #[must_use]
    pub fn cost(&self) -> i64 {
        match self {
            Self::AmbilDiButik => 0,
            Self::JneReg => 55_000,
            Self::JneYes => 85_000,
            Self::SicepatReg => 52_000,
            Self::SicepatBest => 75_000,
            Self::JntExpress => 58_000,
            Self::AnterAja => 50_000,
        }
    }

    /// Returns the delivery estimate shown next to the option.
    #[must_use]
    pub fn estimate(&self) -> &'static str {
        match self {
            Self::AmbilDiButik => "Langsung",
            Self::JneReg => "3-5 hari",
            Self::JneYes => "1-2 hari",
            Self::SicepatReg => "3-4 hari",
            Self::SicepatBest => "1-2 hari",
            Self::JntExpress => "2-4 hari",
            Self::AnterAja => "3-5 hari",
        }
    }

    /// Returns every available method, pickup first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ShippingMethod] = &[
            ShippingMethod::AmbilDiButik,
            ShippingMethod::JneReg,
            ShippingMethod::JneYes,
            ShippingMethod::SicepatReg,
            ShippingMethod::SicepatBest,
            ShippingMethod::JntExpress,
            ShippingMethod::AnterAja,
        ];

        ALL
    }
}

impl Default for ShippingMethod {
    fn default() -> Self {
        Self::AmbilDiButik
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|method| method.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown shipping method '{value}'")))
    }
}

impl TryFrom<String> for ShippingMethod {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShippingMethod> for String {
    fn from(value: ShippingMethod) -> Self {
        value.as_str().to_owned()
    }
}
