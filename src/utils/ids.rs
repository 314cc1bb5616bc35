use chrono::Utc;
use uuid::Uuid;

/// `ORD-<millis>-<0..9999>` order identifier.
pub fn generate_order_id() -> String {
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), random_below(10_000))
}

/// `REF-<millis>-<4-digit>` refund identifier.
pub fn generate_refund_id() -> String {
    format!(
        "REF-{}-{:04}",
        Utc::now().timestamp_millis(),
        random_below(10_000)
    )
}

/// Six digit code handed to the delivery man for order verification.
pub fn generate_verification_code() -> String {
    format!("{:06}", random_below(1_000_000))
}

fn random_below(bound: u128) -> u128 {
    Uuid::new_v4().as_u128() % bound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_has_prefix_and_three_parts() {
        let id = generate_order_id();
        assert!(id.starts_with("ORD-"));
        assert_eq!(id.split('-').count(), 3);
        let suffix: u32 = id.rsplit('-').next().unwrap().parse().unwrap();
        assert!(suffix < 10_000);
    }

    #[test]
    fn refund_id_suffix_is_four_digits() {
        let id = generate_refund_id();
        assert!(id.starts_with("REF-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn verification_code_is_six_digits() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
