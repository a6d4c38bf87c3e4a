//! PIX payment payload ("BR Code") construction, decoding and QR rendering.
//!
//! A payload is a sequence of EMV fields, each `tag (2 digits) + length (2 digits) + value`,
//! terminated by field `63` carrying a CRC-16/CCITT-FALSE checksum of everything before it
//! (the `6304` prefix of the checksum field included). Payment apps scan the QR code or
//! accept the same string pasted as "PIX copia e cola".
//!
//! Building a payload is a pure function of its inputs. Only the reference token is
//! expected to vary between two payments of the same amount to the same key.

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

use crate::core::money;

/// Globally unique identifier of the PIX arrangement inside the merchant account template.
pub const PIX_GUI: &str = "br.gov.bcb.pix";

/// ISO 4217 numeric code for the Brazilian real.
const CURRENCY_BRL: &str = "986";
const COUNTRY_CODE: &str = "BR";
const MAX_FIELD_LEN: usize = 99;
const MAX_MERCHANT_NAME: usize = 25;
const MAX_MERCHANT_CITY: usize = 15;
const MAX_REFERENCE: usize = 25;
/// Reference used when the payer is not asked to quote one.
const NO_REFERENCE: &str = "***";

mod tag {
    pub const PAYLOAD_FORMAT: &str = "00";
    pub const POINT_OF_INITIATION: &str = "01";
    pub const MERCHANT_ACCOUNT: &str = "26";
    pub const CATEGORY_CODE: &str = "52";
    pub const CURRENCY: &str = "53";
    pub const AMOUNT: &str = "54";
    pub const COUNTRY: &str = "58";
    pub const MERCHANT_NAME: &str = "59";
    pub const MERCHANT_CITY: &str = "60";
    pub const ADDITIONAL_DATA: &str = "62";
    pub const CRC: &str = "63";

    // Sub-fields of MERCHANT_ACCOUNT
    pub const GUI: &str = "00";
    pub const KEY: &str = "01";
    pub const DESCRIPTION: &str = "02";

    // Sub-field of ADDITIONAL_DATA
    pub const REFERENCE: &str = "05";
}

/// Failures while building, decoding or rendering a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PixError {
    #[error("PIX key is not configured")]
    MissingKey,

    #[error("PIX key must be printable ASCII")]
    InvalidKey,

    #[error("merchant city is not configured")]
    MissingCity,

    #[error("amount must be positive, got {cents} cents")]
    NonPositiveAmount { cents: i64 },

    #[error("field {tag} is {len} characters long, limit is {max}")]
    FieldTooLong { tag: String, len: usize, max: usize },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("checksum mismatch: payload says {found}, computed {expected}")]
    ChecksumMismatch { expected: String, found: String },

    #[error("could not render QR code: {0}")]
    Render(String),
}

/// Everything needed to build one payment payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentRequest<'a> {
    /// Payee PIX key (e-mail, phone, tax id or random key), embedded verbatim
    pub key: &'a str,
    /// Amount to transfer, in cents
    pub amount_cents: i64,
    /// Free text shown to the payer, usually the product name
    pub description: &'a str,
    pub merchant_name: &'a str,
    pub merchant_city: &'a str,
    /// Per-transaction token, alphanumeric; unique per sale
    pub reference: &'a str,
}

/// A built payload plus its rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixCharge {
    /// Text payload ("copia e cola")
    pub payload: String,
    /// PNG bytes of the QR code, absent when rendering failed
    pub qr_png: Option<Vec<u8>>,
    /// Why `qr_png` is missing; the text payload is still usable
    pub render_warning: Option<PixError>,
}

/// Builds the payload and renders its QR code.
///
/// Rendering problems are not fatal: they are reported in
/// [`PixCharge::render_warning`] and the text payload is returned regardless.
///
/// # Errors
/// Returns an error when the payload itself cannot be built (see [`build_payload`]).
pub fn generate_charge(request: &PaymentRequest<'_>) -> Result<PixCharge, PixError> {
    let payload = build_payload(request)?;
    let (qr_png, render_warning) = match render_qr_png(&payload) {
        Ok(png) => (Some(png), None),
        Err(e) => {
            tracing::warn!("QR rendering failed, offering text payload only: {e}");
            (None, Some(e))
        }
    };

    Ok(PixCharge {
        payload,
        qr_png,
        render_warning,
    })
}

/// Builds the BR Code text for a payment request.
///
/// Merchant name, city and description are folded to ASCII and truncated to the
/// lengths the format allows. The key is never altered.
///
/// # Errors
/// - `MissingKey` if the key is blank, `InvalidKey` if it is not printable ASCII
/// - `NonPositiveAmount` if the amount is zero or negative
/// - `MissingCity` if the city is blank after normalisation
/// - `FieldTooLong` if the key does not fit in the merchant account template
pub fn build_payload(request: &PaymentRequest<'_>) -> Result<String, PixError> {
    let key = request.key.trim();
    if key.is_empty() {
        return Err(PixError::MissingKey);
    }
    if !key.chars().all(|c| c.is_ascii_graphic()) {
        return Err(PixError::InvalidKey);
    }
    if request.amount_cents <= 0 {
        return Err(PixError::NonPositiveAmount {
            cents: request.amount_cents,
        });
    }

    let city = normalize_text(request.merchant_city, MAX_MERCHANT_CITY);
    if city.is_empty() {
        return Err(PixError::MissingCity);
    }
    let mut name = normalize_text(request.merchant_name, MAX_MERCHANT_NAME);
    if name.is_empty() {
        name = "N/A".to_string();
    }

    let mut account = String::new();
    push_field(&mut account, tag::GUI, PIX_GUI)?;
    push_field(&mut account, tag::KEY, key)?;
    // Description gets whatever room the template has left.
    let room = MAX_FIELD_LEN.saturating_sub(account.len() + 4);
    let description = normalize_text(request.description, room);
    if !description.is_empty() {
        push_field(&mut account, tag::DESCRIPTION, &description)?;
    }

    let mut additional = String::new();
    push_field(&mut additional, tag::REFERENCE, &normalize_reference(request.reference))?;

    let mut payload = String::with_capacity(160);
    push_field(&mut payload, tag::PAYLOAD_FORMAT, "01")?;
    push_field(&mut payload, tag::POINT_OF_INITIATION, "12")?;
    push_field(&mut payload, tag::MERCHANT_ACCOUNT, &account)?;
    push_field(&mut payload, tag::CATEGORY_CODE, "0000")?;
    push_field(&mut payload, tag::CURRENCY, CURRENCY_BRL)?;
    push_field(&mut payload, tag::AMOUNT, &money::format_decimal(request.amount_cents))?;
    push_field(&mut payload, tag::COUNTRY, COUNTRY_CODE)?;
    push_field(&mut payload, tag::MERCHANT_NAME, &name)?;
    push_field(&mut payload, tag::MERCHANT_CITY, &city)?;
    push_field(&mut payload, tag::ADDITIONAL_DATA, &additional)?;

    payload.push_str(tag::CRC);
    payload.push_str("04");
    let checksum = crc16(payload.as_bytes());
    payload.push_str(&format!("{checksum:04X}"));

    Ok(payload)
}

fn push_field(out: &mut String, tag: &str, value: &str) -> Result<(), PixError> {
    let len = value.len();
    if len > MAX_FIELD_LEN {
        return Err(PixError::FieldTooLong {
            tag: tag.to_string(),
            len,
            max: MAX_FIELD_LEN,
        });
    }
    out.push_str(tag);
    out.push_str(&format!("{len:02}"));
    out.push_str(value);
    Ok(())
}

/// CRC-16/CCITT-FALSE: polynomial `0x1021`, initial value `0xFFFF`, no reflection.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 == 0 {
                crc << 1
            } else {
                (crc << 1) ^ 0x1021
            };
        }
    }
    crc
}

/// Folds accented Latin letters to ASCII, drops anything else outside printable
/// ASCII, trims and truncates to `max` characters.
#[must_use]
pub fn normalize_text(text: &str, max: usize) -> String {
    let folded: String = text.trim().chars().filter_map(fold_char).take(max).collect();
    folded.trim_end().to_string()
}

fn fold_char(c: char) -> Option<char> {
    if c.is_ascii() {
        return (!c.is_ascii_control()).then_some(c);
    }
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        _ => return None,
    };
    Some(folded)
}

fn normalize_reference(reference: &str) -> String {
    let token: String = reference
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_REFERENCE)
        .collect();
    if token.is_empty() {
        NO_REFERENCE.to_string()
    } else {
        token
    }
}

/// Fields recovered from a payload by [`decode_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedPayload {
    pub key: String,
    /// Amount exactly as written in the payload, e.g. `19.90`
    pub amount: Option<String>,
    pub description: Option<String>,
    pub merchant_name: String,
    pub merchant_city: String,
    pub reference: Option<String>,
}

impl DecodedPayload {
    /// Amount in cents, if present and well formed.
    #[must_use]
    pub fn amount_cents(&self) -> Option<i64> {
        let amount = self.amount.as_deref()?;
        let (units, fraction) = amount.split_once('.').unwrap_or((amount, "0"));
        let units: i64 = units.parse().ok()?;
        let fraction: i64 = match fraction.len() {
            1 => fraction.parse::<i64>().ok()? * 10,
            2 => fraction.parse().ok()?,
            _ => return None,
        };
        units.checked_mul(100)?.checked_add(fraction)
    }
}

/// Parses a BR Code payload after verifying its checksum.
///
/// # Errors
/// `ChecksumMismatch` if field `63` does not match the content, `Malformed` if the
/// tag-length-value structure is broken or a mandatory field is missing.
pub fn decode_payload(payload: &str) -> Result<DecodedPayload, PixError> {
    verify_checksum(payload)?;

    let mut decoded = DecodedPayload::default();
    let mut saw_pix_account = false;

    for (field_tag, value) in parse_fields(payload)? {
        match field_tag {
            tag::MERCHANT_ACCOUNT => {
                let account = parse_fields(value)?;
                if !account
                    .iter()
                    .any(|&(t, v)| t == tag::GUI && v.eq_ignore_ascii_case(PIX_GUI))
                {
                    continue;
                }
                saw_pix_account = true;
                for (sub, sub_value) in account {
                    match sub {
                        tag::KEY => decoded.key = sub_value.to_string(),
                        tag::DESCRIPTION => decoded.description = Some(sub_value.to_string()),
                        _ => {}
                    }
                }
            }
            tag::AMOUNT => decoded.amount = Some(value.to_string()),
            tag::MERCHANT_NAME => decoded.merchant_name = value.to_string(),
            tag::MERCHANT_CITY => decoded.merchant_city = value.to_string(),
            tag::ADDITIONAL_DATA => {
                decoded.reference = parse_fields(value)?
                    .into_iter()
                    .find(|&(t, _)| t == tag::REFERENCE)
                    .map(|(_, v)| v.to_string());
            }
            _ => {}
        }
    }

    if !saw_pix_account || decoded.key.is_empty() {
        return Err(PixError::Malformed("no PIX merchant account".to_string()));
    }
    Ok(decoded)
}

/// Checks that the trailing `6304XXXX` field matches the CRC of the preceding bytes.
///
/// # Errors
/// `Malformed` when the payload does not end in a checksum field,
/// `ChecksumMismatch` when the value is wrong.
pub fn verify_checksum(payload: &str) -> Result<(), PixError> {
    let split = payload
        .len()
        .checked_sub(4)
        .ok_or_else(|| PixError::Malformed("payload too short".to_string()))?;
    let (body, found) = match (payload.get(..split), payload.get(split..)) {
        (Some(body), Some(found)) => (body, found),
        _ => return Err(PixError::Malformed("payload is not ASCII".to_string())),
    };
    if !body.ends_with("6304") {
        return Err(PixError::Malformed("missing checksum field".to_string()));
    }

    let expected = format!("{:04X}", crc16(body.as_bytes()));
    if expected.eq_ignore_ascii_case(found) {
        Ok(())
    } else {
        Err(PixError::ChecksumMismatch {
            expected,
            found: found.to_string(),
        })
    }
}

/// Splits a run of TLV fields into `(tag, value)` pairs.
fn parse_fields(data: &str) -> Result<Vec<(&str, &str)>, PixError> {
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let header = data
            .get(pos..pos + 4)
            .ok_or_else(|| PixError::Malformed(format!("truncated header at offset {pos}")))?;
        let (tag, len) = header.split_at(2);
        if !tag.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PixError::Malformed(format!("bad tag {tag:?} at offset {pos}")));
        }
        let len: usize = len
            .parse()
            .map_err(|_| PixError::Malformed(format!("bad length {len:?} at offset {pos}")))?;
        let start = pos + 4;
        let value = data
            .get(start..start + len)
            .ok_or_else(|| PixError::Malformed(format!("field {tag} runs past the end")))?;
        fields.push((tag, value));
        pos = start + len;
    }

    Ok(fields)
}

/// Renders the payload as a PNG QR code.
///
/// # Errors
/// `Render` if the data does not fit in a QR symbol or PNG encoding fails.
pub fn render_qr_png(payload: &str) -> Result<Vec<u8>, PixError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map_err(|e| PixError::Render(e.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(320, 320)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| PixError::Render(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn widget_request(reference: &str) -> PaymentRequest<'_> {
        PaymentRequest {
            key: "merchant@example.com",
            amount_cents: 1990,
            description: "Widget",
            merchant_name: "Minha Loja",
            merchant_city: "Sao Paulo",
            reference,
        }
    }

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_crc16_matches_published_static_example() {
        let body = "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000\
                    5204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***6304";
        assert_eq!(crc16(body.as_bytes()), 0x1D3D);
    }

    #[test]
    fn test_build_widget_payload() {
        let payload = build_payload(&widget_request("PED1")).unwrap();
        assert_eq!(
            payload,
            "00020101021226520014br.gov.bcb.pix0120merchant@example.com0206Widget\
             520400005303986540519.905802BR5910Minha Loja6009Sao Paulo62080504PED16304C702"
        );
    }

    #[test]
    fn test_widget_payload_decodes_back() {
        let payload = build_payload(&widget_request("PED1")).unwrap();
        assert!(payload.contains("540519.90"));
        assert!(payload.contains("0120merchant@example.com"));

        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.key, "merchant@example.com");
        assert_eq!(decoded.amount.as_deref(), Some("19.90"));
        assert_eq!(decoded.amount_cents(), Some(1990));
        assert_eq!(decoded.description.as_deref(), Some("Widget"));
        assert_eq!(decoded.merchant_name, "Minha Loja");
        assert_eq!(decoded.merchant_city, "Sao Paulo");
        assert_eq!(decoded.reference.as_deref(), Some("PED1"));
    }

    #[test]
    fn test_payload_is_deterministic_except_reference() {
        let a = build_payload(&widget_request("PED1")).unwrap();
        let b = build_payload(&widget_request("PED1")).unwrap();
        let c = build_payload(&widget_request("PED2")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        // Everything up to the additional data field is identical.
        let prefix_len = a.find("6208").unwrap();
        assert_eq!(a.get(..prefix_len), c.get(..prefix_len));
    }

    #[test]
    fn test_checksum_validates_and_detects_tampering() {
        let payload = build_payload(&widget_request("PED1")).unwrap();
        assert!(verify_checksum(&payload).is_ok());

        let tampered = payload.replace("19.90", "99.90");
        assert!(matches!(
            verify_checksum(&tampered),
            Err(PixError::ChecksumMismatch { .. })
        ));
        assert!(matches!(
            decode_payload(&tampered),
            Err(PixError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut request = widget_request("PED1");
        request.key = "   ";
        assert_eq!(build_payload(&request), Err(PixError::MissingKey));
    }

    #[test]
    fn test_non_ascii_key_rejected() {
        let mut request = widget_request("PED1");
        request.key = "joão@example.com";
        assert_eq!(build_payload(&request), Err(PixError::InvalidKey));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let mut request = widget_request("PED1");
        request.amount_cents = 0;
        assert_eq!(
            build_payload(&request),
            Err(PixError::NonPositiveAmount { cents: 0 })
        );
        request.amount_cents = -500;
        assert!(matches!(
            build_payload(&request),
            Err(PixError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn test_missing_city_rejected() {
        let mut request = widget_request("PED1");
        request.merchant_city = "";
        assert_eq!(build_payload(&request), Err(PixError::MissingCity));
    }

    #[test]
    fn test_merchant_fields_are_folded_and_truncated() {
        let request = PaymentRequest {
            merchant_name: "Confeitaria São João das Flores Ltda",
            merchant_city: "São José dos Campos",
            description: "Pão de açúcar",
            ..widget_request("PED1")
        };
        let decoded = decode_payload(&build_payload(&request).unwrap()).unwrap();
        assert_eq!(decoded.merchant_name, "Confeitaria Sao Joao das");
        assert_eq!(decoded.merchant_city, "Sao Jose dos Ca");
        assert_eq!(decoded.description.as_deref(), Some("Pao de acucar"));
    }

    #[test]
    fn test_long_description_fits_account_template() {
        let long = "x".repeat(200);
        let request = PaymentRequest {
            description: &long,
            ..widget_request("PED1")
        };
        let payload = build_payload(&request).unwrap();
        let decoded = decode_payload(&payload).unwrap();
        // 18 (gui) + 24 (key) + 4 (description header) leaves 53 characters
        assert_eq!(decoded.description.map(|d| d.len()), Some(53));
        assert!(payload.starts_with("0002010102122699"));
    }

    #[test]
    fn test_reference_is_sanitized() {
        let payload = build_payload(&widget_request("PED-42 / x")).unwrap();
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.reference.as_deref(), Some("PED42x"));

        let payload = build_payload(&widget_request("")).unwrap();
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.reference.as_deref(), Some("***"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_payload("abc"), Err(PixError::Malformed(_))));
        assert!(matches!(
            decode_payload("merchant@example.com"),
            Err(PixError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_field() {
        // A field claiming 50 bytes followed by a valid checksum over the broken body.
        let body = "00020126500014br.gov.bcb.pix6304";
        let payload = format!("{body}{:04X}", crc16(body.as_bytes()));
        assert!(matches!(decode_payload(&payload), Err(PixError::Malformed(_))));
    }

    #[test]
    fn test_generate_charge_renders_png() {
        let charge = generate_charge(&widget_request("PED1")).unwrap();
        assert!(charge.render_warning.is_none());
        let png = charge.qr_png.unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(charge.payload, build_payload(&widget_request("PED1")).unwrap());
    }

    #[test]
    fn test_render_failure_is_reported() {
        // Far beyond the capacity of the largest QR symbol.
        let huge = "9".repeat(10_000);
        assert!(matches!(render_qr_png(&huge), Err(PixError::Render(_))));
    }
}
