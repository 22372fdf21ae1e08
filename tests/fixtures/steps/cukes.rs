//! Step definitions for the cucumber basket scenarios.
//!
//! This file is scanned by stepcheck's tests; it is never compiled.

use rstest_bdd_macros::{given, then, when};

#[given("I have {count:d} cukes")]
fn have_cukes(basket: &mut Basket, count: u32) {
    basket.cukes = count;
}

#[when("I eat {} cukes")]
fn eat_cukes(basket: &mut Basket, eaten: u32) {
    basket.cukes -= eaten;
}

#[then(regex = r"^I should have (?P<left>\d+) cukes left$")]
fn cukes_left(
    basket: &Basket,
    left: u32,
) {
    assert_eq!(basket.cukes, left);
}

#[then("the basket is labelled {label}")]
fn basket_labelled(basket: &Basket, label: String) {
    assert_eq!(basket.label, label);
}
