//! Discriminator normalization shared by the entity and error registries.

/// Normalizes a gateway discriminator into a type-name candidate.
///
/// The input is lower-cased, split on `_`, and each segment is capitalized
/// before the segments are joined back together. Empty segments are dropped.
///
/// ```rust
/// use razorpay::naming::type_name;
///
/// assert_eq!(type_name("virtual_account"), "VirtualAccount");
/// assert_eq!(type_name("BAD_REQUEST_ERROR"), "BadRequestError");
/// ```
#[must_use]
pub fn type_name(discriminator: &str) -> String {
    discriminator
        .to_ascii_lowercase()
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_single_segment() {
        assert_eq!(type_name("payment"), "Payment");
        assert_eq!(type_name("PAYMENT"), "Payment");
    }

    #[test]
    fn test_type_name_multi_segment() {
        assert_eq!(type_name("payment_link"), "PaymentLink");
        assert_eq!(type_name("SERVER_ERROR"), "ServerError");
    }

    #[test]
    fn test_type_name_drops_empty_segments() {
        assert_eq!(type_name("__qr__code_"), "QrCode");
        assert_eq!(type_name(""), "");
    }
}
