mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn run(registrations: &[&str], callbacks: &[&str]) -> assert_cmd::assert::Assert {
    let registrations = common::registrations(registrations);
    let callbacks = common::callbacks(callbacks);

    let mut cmd = Command::new(cargo_bin!("regpay"));
    cmd.arg(registrations.path()).arg(callbacks.path());
    cmd.assert()
}

#[test]
fn test_manual_cancel_after_payment() {
    run(
        &["1, 1, ada@example.org, 20, EUR"],
        &["1,1,complete,paypal,,,,", "1,1,cancel,_manual,,,,"],
    )
    .success()
    .stdout(predicate::str::contains("1,1,20,EUR,false,cancelled"));
}

#[test]
fn test_payment_after_cancellation() {
    run(
        &["1, 1, ada@example.org, 20, EUR"],
        &[
            "1,1,complete,_manual,,,,",
            "1,1,cancel,_manual,,,,",
            "1,1,complete,paypal,,,,",
        ],
    )
    .success()
    .stdout(predicate::str::contains("1,1,20,EUR,true,successful"))
    .stderr(predicate::str::contains("already paid").not());
}

#[test]
fn test_ignored_action_is_logged() {
    // Nothing to cancel yet
    run(
        &["1, 1, ada@example.org, 20, EUR"],
        &["1,1,cancel,_manual,,,,"],
    )
    .success()
    .stdout(predicate::str::contains("1,1,20,EUR,false,\n"))
    .stderr(predicate::str::contains(
        "Ignored action 'cancel' on initial status",
    ));
}

#[test]
fn test_invalid_manual_action_is_logged() {
    run(
        &["1, 1, ada@example.org, 20, EUR"],
        &["1,1,complete,_manual,,,,", "1,1,pending,_manual,,,,"],
    )
    .success()
    .stdout(predicate::str::contains("1,1,20,EUR,true,successful"))
    .stderr(predicate::str::contains(
        "Invalid manual action 'pending' on successful status",
    ));
}

#[test]
fn test_invalid_provider_action_is_logged() {
    run(
        &["1, 1, ada@example.org, 20, EUR"],
        &["1,1,pending,paypal,,,,", "1,1,cancel,paypal,,,,"],
    )
    .success()
    .stdout(predicate::str::contains("1,1,20,EUR,false,pending"))
    .stderr(predicate::str::contains(
        "Invalid action 'cancel' on pending status",
    ));
}

#[test]
fn test_unknown_registration() {
    run(
        &["1, 1, ada@example.org, 20, EUR"],
        &["1,999,complete,_manual,,,,", "1,1,complete,_manual,,,,"],
    )
    .success()
    .stderr(predicate::str::contains("Error processing callback"))
    .stdout(predicate::str::contains("1,1,20,EUR,true,successful"));
}
