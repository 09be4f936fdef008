use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("regpay"));
    cmd.arg("tests/fixtures/registrations.csv")
        .arg("tests/fixtures/callbacks.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "event,registrant,price,currency,paid,status",
        ))
        // Manual payment
        .stdout(predicate::str::contains("1,1,100,EUR,true,successful"))
        // Pending, then completed by the provider
        .stdout(predicate::str::contains("1,2,100,EUR,true,successful"))
        // Pending, then rejected by the provider
        .stdout(predicate::str::contains("1,3,50,EUR,false,rejected"))
        // Completed twice
        .stdout(predicate::str::contains("2,1,75.5,CHF,true,successful"))
        .stderr(predicate::str::contains(
            "Received successful payment for an already paid registration",
        ));

    Ok(())
}

#[test]
fn test_cli_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("regpay"));
    cmd.arg("tests/fixtures/registrations.csv")
        .arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
