//! Order and payment status names as stored on `orders`.

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_PENDING_VERIFICATION: &str = "PENDING_VERIFICATION";
pub const STATUS_PROCESSING: &str = "PROCESSING";
pub const STATUS_OUT_FOR_DELIVERY: &str = "OUT_FOR_DELIVERY";
pub const STATUS_DELIVERED: &str = "DELIVERED";
pub const STATUS_CANCELLED: &str = "CANCELLED";
pub const STATUS_REJECTED: &str = "REJECTED";

pub const ORDER_STATUSES: [&str; 7] = [
    STATUS_PENDING,
    STATUS_PENDING_VERIFICATION,
    STATUS_PROCESSING,
    STATUS_OUT_FOR_DELIVERY,
    STATUS_DELIVERED,
    STATUS_CANCELLED,
    STATUS_REJECTED,
];

pub const PAYMENT_PENDING: &str = "PENDING";
pub const PAYMENT_FOR_VERIFICATION: &str = "FOR_VERIFICATION";
pub const PAYMENT_PAID: &str = "PAID";
pub const PAYMENT_REJECTED: &str = "REJECTED";

pub const PAYMENT_METHOD_COD: &str = "COD";
pub const PAYMENT_METHOD_GCASH: &str = "GCASH";

pub fn is_valid_status(status: &str) -> bool {
    ORDER_STATUSES.contains(&status)
}

/// Customer-facing wording used in status update emails.
pub fn status_label(status: &str) -> &'static str {
    match status {
        STATUS_PENDING => "Pending",
        STATUS_PENDING_VERIFICATION => "Awaiting payment verification",
        STATUS_PROCESSING => "Being prepared",
        STATUS_OUT_FOR_DELIVERY => "Out for delivery",
        STATUS_DELIVERED => "Delivered",
        STATUS_CANCELLED => "Cancelled",
        STATUS_REJECTED => "Rejected",
        _ => "Updated",
    }
}

/// Payment state implied by moving an order into `status`, if any.
///
/// Cash on delivery is only paid once delivered.
pub fn payment_status_for(status: &str, payment_method: &str) -> Option<&'static str> {
    match (status, payment_method) {
        (STATUS_REJECTED, _) => Some(PAYMENT_REJECTED),
        (STATUS_DELIVERED, _) => Some(PAYMENT_PAID),
        (STATUS_PROCESSING | STATUS_OUT_FOR_DELIVERY, PAYMENT_METHOD_COD) => None,
        (STATUS_PROCESSING | STATUS_OUT_FOR_DELIVERY, _) => Some(PAYMENT_PAID),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DELIVERED", true)]
    #[case("PENDING_VERIFICATION", true)]
    #[case("delivered", false)]
    #[case("SHIPPED", false)]
    #[case("", false)]
    fn validates_status_names(#[case] status: &str, #[case] expected: bool) {
        assert_eq!(is_valid_status(status), expected);
    }

    #[rstest]
    #[case(STATUS_PROCESSING, PAYMENT_METHOD_GCASH, Some(PAYMENT_PAID))]
    #[case(STATUS_OUT_FOR_DELIVERY, PAYMENT_METHOD_GCASH, Some(PAYMENT_PAID))]
    #[case(STATUS_PROCESSING, PAYMENT_METHOD_COD, None)]
    #[case(STATUS_OUT_FOR_DELIVERY, PAYMENT_METHOD_COD, None)]
    #[case(STATUS_DELIVERED, PAYMENT_METHOD_COD, Some(PAYMENT_PAID))]
    #[case(STATUS_REJECTED, PAYMENT_METHOD_GCASH, Some(PAYMENT_REJECTED))]
    #[case(STATUS_CANCELLED, PAYMENT_METHOD_COD, None)]
    fn maps_status_to_payment(
        #[case] status: &str,
        #[case] method: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(payment_status_for(status, method), expected);
    }
}
