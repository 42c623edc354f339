//! Buyer identity and address value types.
//!
//! Each type validates on construction so that an instance is always
//! well-formed. Error messages are the Indonesian storefront copy shown
//! inline next to the offending field.

use butik_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated buyer full name.
///
/// At least 6 characters, at most 100, letters and spaces only (including
/// the Latin accented range), and at least two words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerName(String);

impl CustomerName {
    /// Creates a validated customer name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.chars().count() < 6 {
            return Err(AppError::Validation(
                "Nama lengkap minimal 6 karakter".to_owned(),
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(AppError::Validation("Nama terlalu panjang".to_owned()));
        }

        if !trimmed.chars().all(is_name_char) {
            return Err(AppError::Validation(
                "Nama tidak boleh mengandung angka atau simbol".to_owned(),
            ));
        }

        if trimmed.split_whitespace().count() < 2 {
            return Err(AppError::Validation(
                "Mohon masukkan nama depan dan belakang".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch.is_whitespace() || ('\u{00C0}'..='\u{024F}').contains(&ch)
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Structural validation: exactly one `@`, non-empty local part, a domain
    /// with at least one `.`, at most 255 characters. Throwaway addresses
    /// (`test@…`, `…example.com`) are rejected because order confirmations
    /// must reach the buyer.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Alamat email tidak boleh kosong".to_owned(),
            ));
        }

        if trimmed.len() > 255 {
            return Err(AppError::Validation("Email terlalu panjang".to_owned()));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "Alamat email tidak valid".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "Alamat email tidak valid".to_owned(),
            ));
        }

        if trimmed.contains("test@") || trimmed.contains("example.com") {
            return Err(AppError::Validation(
                "Mohon gunakan alamat email aktif Anda".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated Indonesian mobile (WhatsApp) number.
///
/// Accepted shapes: `08…`, `628…`, `+628…` followed by a non-zero digit and
/// 7 to 10 further digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Creates a validated phone number. Embedded spaces are stripped.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();

        let invalid =
            || AppError::Validation("Format nomor tidak valid, contoh: 08123456789".to_owned());

        if compact.len() < 10 {
            return Err(AppError::Validation(
                "Nomor WhatsApp terlalu pendek".to_owned(),
            ));
        }
        if compact.len() > 15 {
            return Err(AppError::Validation(
                "Nomor WhatsApp terlalu panjang".to_owned(),
            ));
        }

        let rest = ["+62", "62", "0"]
            .iter()
            .find_map(|prefix| compact.strip_prefix(prefix))
            .ok_or_else(invalid)?;

        let mut digits = rest.chars();
        if digits.next() != Some('8') {
            return Err(invalid());
        }
        let second = digits.next().ok_or_else(invalid)?;
        if !('1'..='9').contains(&second) {
            return Err(invalid());
        }
        let tail: Vec<char> = digits.collect();
        if tail.len() < 7 || tail.len() > 10 || !tail.iter().all(char::is_ascii_digit) {
            return Err(invalid());
        }

        // Keyboard-mash guard: the last 8 digits must use at least 3
        // distinct digits (rejects e.g. 08111111111).
        let all_digits: Vec<char> = compact.chars().filter(char::is_ascii_digit).collect();
        let start = all_digits.len().saturating_sub(8);
        let mut seen = [false; 10];
        for ch in &all_digits[start..] {
            if let Some(digit) = ch.to_digit(10) {
                seen[digit as usize] = true;
            }
        }
        if seen.iter().filter(|present| **present).count() < 3 {
            return Err(AppError::Validation(
                "Mohon masukkan nomor WhatsApp yang valid".to_owned(),
            ));
        }

        Ok(Self(compact))
    }

    /// Returns the validated phone string as entered (minus whitespace).
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the number in international form without `+`, e.g. `628123…`,
    /// as used by WhatsApp deep links.
    #[must_use]
    pub fn international(&self) -> String {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        if let Some(rest) = digits.strip_prefix('0') {
            format!("62{rest}")
        } else if digits.starts_with("62") {
            digits
        } else {
            format!("62{digits}")
        }
    }
}

/// Validated free-text street address detail.
///
/// The wizard gate requires at least 20 characters across at least five
/// words; gibberish patterns are rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDetail(String);

impl AddressDetail {
    /// Creates a validated address detail.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.chars().count() < 20 {
            return Err(AppError::Validation(
                "Mohon lengkapi alamat pengiriman Anda".to_owned(),
            ));
        }

        if trimmed.chars().count() > 500 {
            return Err(AppError::Validation("Alamat terlalu panjang".to_owned()));
        }

        if trimmed.split_whitespace().count() < 5 {
            return Err(AppError::Validation(
                "Alamat belum lengkap, sertakan nama jalan, nomor, kota & kode pos".to_owned(),
            ));
        }

        if looks_like_gibberish(trimmed) {
            return Err(AppError::Validation(
                "Mohon masukkan alamat yang valid".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated address detail.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn looks_like_gibberish(value: &str) -> bool {
    let lowered = value.to_lowercase();

    for mash in ["asdf", "qwerty", "zxcv"] {
        if lowered.contains(mash) {
            return true;
        }
    }

    // A string made purely of one- and two-letter words.
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    if tokens.len() >= 2
        && tokens.iter().all(|token| {
            (1..=2).contains(&token.chars().count())
                && token.chars().all(|ch| ch.is_ascii_lowercase())
        })
    {
        return true;
    }

    // Five or more identical characters in a row.
    let mut run = 0usize;
    let mut previous: Option<char> = None;
    for ch in lowered.chars() {
        if Some(ch) == previous {
            run += 1;
            if run >= 5 {
                return true;
            }
        } else {
            run = 1;
            previous = Some(ch);
        }
    }

    false
}

/// Fully validated buyer details, frozen at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Buyer full name.
    pub name: CustomerName,
    /// Buyer email address.
    pub email: EmailAddress,
    /// Buyer WhatsApp number.
    pub phone: PhoneNumber,
    /// Composed shipping address (detail plus region names).
    pub address: String,
}
