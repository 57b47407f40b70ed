//! Request validation.
//!
//! Turns the current slots, device classifier, and form configuration
//! into a [`CertificateRequest`] or a full set of [`ValidationErrors`].
//! Every active slot is checked; one bad input never hides another.

use std::sync::LazyLock;

use certgate_core::models::identifier::IdentifierKind;
use certgate_core::models::request::CertificateRequest;
use certgate_core::models::validation::{FieldError, FieldId, TopLevelError, ValidationErrors};
use regex::Regex;
use tracing::debug;

use crate::config::{FormConfig, FqdnCheck};
use crate::form::{IdentifierSlot, PurposeClassifier};

static FQDN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]{1,63}\.)+[A-Za-z]{2,6}$").expect("FQDN pattern compiles")
});

static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let octet = r"(25[0-5]|2[0-4][0-9]|1?[0-9][0-9]?)";
    Regex::new(&format!(r"^{octet}\.{octet}\.{octet}\.{octet}$")).expect("IPv4 pattern compiles")
});

/// Dot-separated labels of 1–63 letters, digits, `-` or `_`, ending in a
/// 2–6 letter top-level label. Anything starting with `://` is rejected.
pub fn is_valid_fqdn(value: &str) -> bool {
    !value.starts_with("://") && FQDN_PATTERN.is_match(value)
}

/// Strict dotted-quad IPv4, each octet in `0..=255`.
pub fn is_valid_ipv4(value: &str) -> bool {
    IPV4_PATTERN.is_match(value)
}

fn check_fqdn(value: &str, check: FqdnCheck) -> Result<(), FieldError> {
    match check {
        FqdnCheck::NonEmpty if value.is_empty() => Err(FieldError::EmptyFqdn),
        FqdnCheck::NonEmpty => Ok(()),
        FqdnCheck::Grammar if is_valid_fqdn(value) => Ok(()),
        FqdnCheck::Grammar => Err(FieldError::InvalidFqdn),
    }
}

fn check_ip(value: &str) -> Result<(), FieldError> {
    if is_valid_ipv4(value) {
        Ok(())
    } else {
        Err(FieldError::InvalidIp)
    }
}

/// Validate a form.
///
/// When several slots hold valid identifiers, FQDN slots are resolved
/// before IP slots, each in slot order, and the last valid one becomes the
/// request's common name; the backend accepts only one.
pub fn validate(
    slots: &[IdentifierSlot],
    classifier: Option<&PurposeClassifier>,
    config: &FormConfig,
) -> Result<CertificateRequest, ValidationErrors> {
    debug!(
        purpose = %config.purpose,
        slots = slots.len(),
        "validating certificate request"
    );

    // 1. Code-signing needs no identifier.
    if !config.purpose.requires_identifier() {
        return Ok(CertificateRequest::code_signing(config.algorithm.clone()));
    }

    let mut errors = ValidationErrors::default();
    let mut resolved: Option<(IdentifierKind, String)> = None;

    // 2./3. Check every active input: all FQDN slots, then all IP slots.
    // A valid IP therefore outranks a valid FQDN in any slot.
    for kind in [IdentifierKind::Fqdn, IdentifierKind::Ip] {
        for (index, slot) in slots.iter().enumerate() {
            if slot.mode().kind() != Some(kind) {
                continue;
            }
            let value = slot.input_value(kind).trim();
            let outcome = match kind {
                IdentifierKind::Fqdn => check_fqdn(value, config.fqdn_check),
                IdentifierKind::Ip => check_ip(value),
            };
            match outcome {
                Ok(()) => resolved = Some((kind, value.to_string())),
                Err(error) => {
                    errors.field_errors.insert(FieldId::new(index, kind), error);
                }
            }
        }
    }

    // 4. At least one identifier must have resolved.
    if resolved.is_none() {
        errors.top_level.push(TopLevelError::NoIdentifier);
    }

    // 5. Device-oriented forms need exactly one device class.
    let device_purpose = if config.purpose.requires_device_purpose() {
        let selected = classifier.and_then(PurposeClassifier::selected);
        if selected.is_none() {
            errors.top_level.push(TopLevelError::NoDevicePurpose);
        }
        selected
    } else {
        None
    };

    match resolved {
        Some((kind, common_name)) if errors.is_empty() => Ok(CertificateRequest {
            common_name_type: Some(kind),
            common_name,
            algorithm: config.algorithm.clone(),
            purpose: config.purpose,
            device_purpose,
        }),
        _ => {
            debug!(%errors, "certificate request rejected");
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_quads_in_range() {
        for ip in ["0.0.0.0", "10.0.0.1", "192.168.1.254", "255.255.255.255", "1.22.199.249"] {
            assert!(is_valid_ipv4(ip), "{ip} should be valid");
        }
    }

    #[test]
    fn rejects_out_of_range_or_malformed_ips() {
        for ip in [
            "256.0.0.1",
            "10.0.0.999",
            "10.0.0",
            "10.0.0.1.5",
            "a.b.c.d",
            "10.0.0.-1",
            "10.0.0.1 ",
            "",
            "300.300.300.300",
        ] {
            assert!(!is_valid_ipv4(ip), "{ip} should be invalid");
        }
    }

    #[test]
    fn every_octet_value_is_accepted() {
        for octet in 0..=255u16 {
            let ip = format!("{octet}.{octet}.{octet}.{octet}");
            assert!(is_valid_ipv4(&ip), "{ip} should be valid");
        }
        for octet in 256..=999u16 {
            assert!(!is_valid_ipv4(&format!("10.0.0.{octet}")));
        }
    }

    #[test]
    fn accepts_common_fqdns() {
        for name in ["example.com", "device1.local", "a-b_c.sub.example.co", "x.io"] {
            assert!(is_valid_fqdn(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_bad_fqdns() {
        for name in [
            "localhost",
            "example.c",
            "example.toolongtld",
            "example..com",
            ".example.com",
            "exa mple.com",
            "example.com1",
            "",
        ] {
            assert!(!is_valid_fqdn(name), "{name} should be invalid");
        }
        let long_label = format!("{}.com", "a".repeat(64));
        assert!(!is_valid_fqdn(&long_label));
        let max_label = format!("{}.com", "a".repeat(63));
        assert!(is_valid_fqdn(&max_label));
    }

    #[test]
    fn scheme_separator_prefix_is_always_rejected() {
        for name in ["://example.com", "://a.b.example.org", "://"] {
            assert!(!is_valid_fqdn(name), "{name} should be invalid");
        }
    }

    #[test]
    fn non_empty_check_accepts_any_text() {
        assert_eq!(check_fqdn("not a hostname", FqdnCheck::NonEmpty), Ok(()));
        assert_eq!(check_fqdn("", FqdnCheck::NonEmpty), Err(FieldError::EmptyFqdn));
        assert_eq!(check_fqdn("not a hostname", FqdnCheck::Grammar), Err(FieldError::InvalidFqdn));
    }
}
