//! Field-level checks for payment requests.
//!
//! These mirror the constraints the mandate gateway enforces on its side;
//! rejecting early keeps garbage out of payment records.

/// A Bank Verification Number is exactly 11 digits.
pub fn is_valid_bvn(bvn: &str) -> bool {
    bvn.len() == 11 && bvn.chars().all(|c| c.is_ascii_digit())
}

/// A NUBAN account number is exactly 10 digits.
pub fn is_valid_account_number(account_number: &str) -> bool {
    account_number.len() == 10 && account_number.chars().all(|c| c.is_ascii_digit())
}

/// Nigerian mobile number: `+234` followed by 7/8/9 and 9 digits, or a local
/// `0` prefix followed by 7/8/9 and 9 digits.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let rest = if let Some(rest) = phone.strip_prefix("+234") {
        rest
    } else if let Some(rest) = phone.strip_prefix('0') {
        rest
    } else {
        return false;
    };

    if rest.len() != 10 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    matches!(rest.as_bytes()[0], b'7' | b'8' | b'9')
}

pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}
