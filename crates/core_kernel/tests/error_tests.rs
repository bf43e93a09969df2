//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::Currency;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = "ZZZ".parse::<Currency>().unwrap_err();
    let core_error: CoreError = money_error.into();

    assert!(matches!(
        core_error,
        CoreError::Money(MoneyError::UnsupportedCurrency(_))
    ));
}

#[test]
fn test_money_error_message_is_preserved() {
    let core_error: CoreError = MoneyError::InvalidAmount("amount must not be negative".into()).into();

    assert_eq!(
        core_error.to_string(),
        "Money error: Invalid amount: amount must not be negative"
    );
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}
