//! Display masking for configured credentials.

const MASK: &str = "****";

/// Masks a credential for display, keeping only its last four characters.
///
/// Values of four characters or fewer are fully masked. Only for showing an
/// administrator which key is configured; never for storage or comparison.
pub fn mask_credential(value: &str) -> String {
    let len = value.chars().count();
    if len <= 4 {
        return MASK.to_string();
    }
    let tail: String = value.chars().skip(len - 4).collect();
    format!("{MASK}{tail}")
}
